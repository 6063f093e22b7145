use crate::errors::QueryError;
use crate::prelude::Result;
use crate::value::Number;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use seeql_cypher::ElementKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRef {
    Node(NodeId),
    Edge(EdgeId),
}

impl ElementRef {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Node(_) => ElementKind::Node,
            ElementRef::Edge(_) => ElementKind::Edge,
        }
    }
}

impl From<NodeId> for ElementRef {
    fn from(id: NodeId) -> Self {
        ElementRef::Node(id)
    }
}

impl From<EdgeId> for ElementRef {
    fn from(id: EdgeId) -> Self {
        ElementRef::Edge(id)
    }
}

/// Read-only view of a typed, attributed, directed multigraph.
///
/// Enumeration order of `nodes` and `edges` must be stable for the lifetime
/// of a query; match results follow it.
pub trait PropertyGraph {
    fn nodes(&self) -> impl Iterator<Item = NodeId> + '_;
    fn edges(&self) -> impl Iterator<Item = EdgeId> + '_;
    fn source(&self, edge: EdgeId) -> Option<NodeId>;
    fn target(&self, edge: EdgeId) -> Option<NodeId>;
    fn element_type(&self, element: ElementRef) -> Option<&str>;
    fn numeric_attribute(&self, element: ElementRef, name: &str) -> Option<Number>;
    fn string_attribute(&self, element: ElementRef, name: &str) -> Option<&str>;
    /// External identifier, used when results leave the engine.
    fn element_id(&self, element: ElementRef) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribute {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Integer(value)
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Attribute::Float(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::Text(value.to_string())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::Text(value)
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    id: String,
    element_type: String,
    attributes: HashMap<String, Attribute>,
}

impl ElementData {
    fn new(id: &str, element_type: &str) -> Self {
        ElementData {
            id: id.to_string(),
            element_type: element_type.to_string(),
            attributes: HashMap::new(),
        }
    }
}

/// [`PropertyGraph`] stored in a `petgraph` stable graph. Elements enumerate
/// in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraph {
    graph: StableDiGraph<ElementData, ElementData>,
    node_ids: HashMap<String, NodeIndex>,
    edge_ids: HashMap<String, EdgeIndex>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: &str, element_type: &str) -> Result<NodeId> {
        if self.node_ids.contains_key(id) {
            return Err(QueryError::invalid_graph(format!("duplicate node id: {id}")));
        }
        let index = self.graph.add_node(ElementData::new(id, element_type));
        self.node_ids.insert(id.to_string(), index);
        Ok(NodeId(index.index()))
    }

    pub fn add_edge(
        &mut self,
        id: &str,
        element_type: &str,
        source: &str,
        target: &str,
    ) -> Result<EdgeId> {
        if self.edge_ids.contains_key(id) {
            return Err(QueryError::invalid_graph(format!("duplicate edge id: {id}")));
        }
        let (from, to) = match (self.node_ids.get(source), self.node_ids.get(target)) {
            (Some(from), Some(to)) => (*from, *to),
            (from, to) => {
                return Err(QueryError::invalid_graph(format!(
                    "edge {id} references missing node(s), source: {source} ({}), target: {target} ({})",
                    if from.is_some() { "found" } else { "missing" },
                    if to.is_some() { "found" } else { "missing" },
                )));
            }
        };
        let index = self
            .graph
            .add_edge(from, to, ElementData::new(id, element_type));
        self.edge_ids.insert(id.to_string(), index);
        Ok(EdgeId(index.index()))
    }

    pub fn set_attribute(
        &mut self,
        element: impl Into<ElementRef>,
        name: &str,
        value: impl Into<Attribute>,
    ) -> Result<()> {
        let element = element.into();
        let data = match element {
            ElementRef::Node(id) => self.graph.node_weight_mut(NodeIndex::new(id.0)),
            ElementRef::Edge(id) => self.graph.edge_weight_mut(EdgeIndex::new(id.0)),
        }
        .ok_or_else(|| QueryError::invalid_graph(format!("unknown element: {element:?}")))?;
        data.attributes.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.node_ids.get(id).map(|index| NodeId(index.index()))
    }

    pub fn edge_by_id(&self, id: &str) -> Option<EdgeId> {
        self.edge_ids.get(id).map(|index| EdgeId(index.index()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn from_document(document: GraphDocument) -> Result<Self> {
        let mut graph = InMemoryGraph::new();
        for node in document.nodes {
            let id = graph.add_node(&node.id, &node.element_type)?;
            for (name, value) in node.attributes {
                graph.set_attribute(id, &name, value)?;
            }
        }
        for edge in document.edges {
            let id = graph.add_edge(&edge.id, &edge.element_type, &edge.source, &edge.target)?;
            for (name, value) in edge.attributes {
                graph.set_attribute(id, &name, value)?;
            }
        }
        debug!(
            "in_memory: loaded graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: GraphDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    fn data(&self, element: ElementRef) -> Option<&ElementData> {
        match element {
            ElementRef::Node(id) => self.graph.node_weight(NodeIndex::new(id.0)),
            ElementRef::Edge(id) => self.graph.edge_weight(EdgeIndex::new(id.0)),
        }
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Option<&Attribute> {
        self.data(element)?.attributes.get(name)
    }
}

impl PropertyGraph for InMemoryGraph {
    fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices().map(|index| NodeId(index.index()))
    }

    fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices().map(|index| EdgeId(index.index()))
    }

    fn source(&self, edge: EdgeId) -> Option<NodeId> {
        self.graph
            .edge_endpoints(EdgeIndex::new(edge.0))
            .map(|(from, _)| NodeId(from.index()))
    }

    fn target(&self, edge: EdgeId) -> Option<NodeId> {
        self.graph
            .edge_endpoints(EdgeIndex::new(edge.0))
            .map(|(_, to)| NodeId(to.index()))
    }

    fn element_type(&self, element: ElementRef) -> Option<&str> {
        self.data(element).map(|data| data.element_type.as_str())
    }

    fn numeric_attribute(&self, element: ElementRef, name: &str) -> Option<Number> {
        match self.attribute(element, name)? {
            Attribute::Integer(value) => Some(Number::Integer(*value)),
            Attribute::Float(value) => Some(Number::Float(*value)),
            Attribute::Text(_) => None,
        }
    }

    fn string_attribute(&self, element: ElementRef, name: &str) -> Option<&str> {
        match self.attribute(element, name)? {
            Attribute::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    fn element_id(&self, element: ElementRef) -> Option<&str> {
        self.data(element).map(|data| data.id.as_str())
    }
}

/// JSON interchange form of a graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}
