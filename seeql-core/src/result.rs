use crate::graph::{EdgeId, NodeId};
use crate::value::Value;
use serde::Serialize;
use strum_macros::IntoStaticStr;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row)?.get(self.column(column)?)
    }
}

/// Shape of a query answer, decided by the projected items and the number
/// of rows left after SKIP/LIMIT.
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryResult {
    Integer(i64),
    Double(f64),
    Single(Value),
    Table(Table),
    Nodes(Vec<NodeId>),
    Edges(Vec<EdgeId>),
    Graph {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
}

impl QueryResult {
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            QueryResult::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            QueryResult::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_single(&self) -> Option<&Value> {
        match self {
            QueryResult::Single(value) => Some(value),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            QueryResult::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Nodes of a `Nodes` or `Graph` result.
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            QueryResult::Nodes(nodes) | QueryResult::Graph { nodes, .. } => nodes,
            _ => &[],
        }
    }

    /// Edges of an `Edges` or `Graph` result.
    pub fn edges(&self) -> &[EdgeId] {
        match self {
            QueryResult::Edges(edges) | QueryResult::Graph { edges, .. } => edges,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryResult::Integer(_) | QueryResult::Double(_) | QueryResult::Single(_) => 1,
            QueryResult::Table(table) => table.rows.len(),
            QueryResult::Nodes(nodes) => nodes.len(),
            QueryResult::Edges(edges) => edges.len(),
            QueryResult::Graph { nodes, edges } => nodes.len() + edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
