use crate::ast::{ElementKind, Expression, Span};
use crate::CypherError;

/// Fields shared by node and edge pattern elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    pub variable: Option<String>,
    pub label: Option<String>,
    /// Equality pre-filter, e.g. `{name: 'x'}`.
    pub properties: Vec<(String, Expression)>,
}

impl Attributes {
    pub fn named(variable: impl Into<String>) -> Self {
        Attributes {
            variable: Some(variable.into()),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Expression) -> Self {
        self.properties.push((key.into(), value));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeElement {
    pub attributes: Attributes,
}

impl NodeElement {
    pub fn new(attributes: Attributes) -> Self {
        NodeElement { attributes }
    }
}

/// Edge between two node elements of the same pattern, addressed by their
/// index in [`Pattern::elements`].
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeElement {
    pub attributes: Attributes,
    pub from: usize,
    pub to: usize,
    pub undirected: bool,
}

/// Relationship as written in the query, before its arrows are resolved
/// into an [`EdgeElement`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationshipElement {
    pub attributes: Attributes,
    pub left_arrow: bool,
    pub right_arrow: bool,
}

impl RelationshipElement {
    pub fn new(attributes: Attributes, left_arrow: bool, right_arrow: bool) -> Self {
        RelationshipElement {
            attributes,
            left_arrow,
            right_arrow,
        }
    }

    /// `left` and `right` are the element indices of the nodes written to the
    /// left and right of the relationship.
    pub fn into_edge(self, left: usize, right: usize) -> EdgeElement {
        let (from, to, undirected) = match (self.left_arrow, self.right_arrow) {
            (true, false) => (right, left, false),
            (false, true) => (left, right, false),
            _ => (left, right, true),
        };
        EdgeElement {
            attributes: self.attributes,
            from,
            to,
            undirected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    Node(NodeElement),
    Edge(EdgeElement),
}

impl PatternElement {
    pub fn attributes(&self) -> &Attributes {
        match self {
            PatternElement::Node(node) => &node.attributes,
            PatternElement::Edge(edge) => &edge.attributes,
        }
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            PatternElement::Node(node) => &mut node.attributes,
            PatternElement::Edge(edge) => &mut edge.attributes,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            PatternElement::Node(_) => ElementKind::Node,
            PatternElement::Edge(_) => ElementKind::Edge,
        }
    }

    pub fn variable(&self) -> Option<&str> {
        self.attributes().variable.as_deref()
    }
}

/// Variable names in first-declaration order, each with exactly one kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variables(Vec<(String, ElementKind)>);

impl Variables {
    pub fn declare(&mut self, name: &str, kind: ElementKind) -> Result<(), CypherError> {
        match self.kind_of(name) {
            Some(existing) if existing != kind => Err(CypherError::PatternConflict {
                variable: name.to_string(),
                first: existing,
                second: kind,
            }),
            Some(_) => Ok(()),
            None => {
                self.0.push((name.to_string(), kind));
                Ok(())
            }
        }
    }

    pub fn kind_of(&self, name: &str) -> Option<ElementKind> {
        self.0
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, kind)| *kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementKind)> {
        self.0.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn count(&self, kind: ElementKind) -> usize {
        self.0.iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One comma-separated part of a MATCH clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    elements: Vec<PatternElement>,
    variables: Variables,
}

impl Pattern {
    /// Fails with [`CypherError::PatternConflict`] when a variable names both a
    /// node and an edge element.
    pub fn new(elements: Vec<PatternElement>) -> Result<Self, CypherError> {
        let mut variables = Variables::default();
        for element in &elements {
            if let Some(name) = element.variable() {
                variables.declare(name, element.kind())?;
            }
            if let PatternElement::Edge(edge) = element {
                for endpoint in [edge.from, edge.to] {
                    if !matches!(elements.get(endpoint), Some(PatternElement::Node(_))) {
                        return Err(CypherError::semantic(
                            format!("edge endpoint {endpoint} is not a node element"),
                            Span::default(),
                        ));
                    }
                }
            }
        }
        Ok(Pattern {
            elements,
            variables,
        })
    }

    /// Builds `(start)-[r1]-(n1)-[r2]-(n2)…`.
    pub fn chain(
        start: NodeElement,
        segments: Vec<(RelationshipElement, NodeElement)>,
    ) -> Result<Self, CypherError> {
        let mut elements = Vec::with_capacity(segments.len() * 2 + 1);
        elements.push(PatternElement::Node(start));
        for (rel, node) in segments {
            let left = elements.len() - 1;
            let right = left + 2;
            elements.push(PatternElement::Edge(rel.into_edge(left, right)));
            elements.push(PatternElement::Node(node));
        }
        Pattern::new(elements)
    }

    pub fn node(node: NodeElement) -> Result<Self, CypherError> {
        Pattern::chain(node, Vec::new())
    }

    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    patterns: Vec<Pattern>,
    variables: Variables,
    where_clause: Option<Expression>,
    pub span: Span,
}

impl MatchClause {
    /// Merges the variables of all patterns and resolves the variable leaves
    /// of the WHERE expression and of property maps.
    pub fn new(
        mut patterns: Vec<Pattern>,
        mut where_clause: Option<Expression>,
    ) -> Result<Self, CypherError> {
        let mut variables = Variables::default();
        for pattern in &patterns {
            for (name, kind) in pattern.variables().iter() {
                variables.declare(name, kind)?;
            }
        }

        let lookup = |name: &str| variables.kind_of(name);
        if let Some(expr) = &mut where_clause {
            expr.resolve_variables(&lookup);
        }
        for pattern in &mut patterns {
            for element in &mut pattern.elements {
                for (_, value) in &mut element.attributes_mut().properties {
                    value.resolve_variables(&lookup);
                }
            }
        }

        Ok(MatchClause {
            patterns,
            variables,
            where_clause,
            span: Span::default(),
        })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn kind_of(&self, name: &str) -> Option<ElementKind> {
        self.variables.kind_of(name)
    }

    pub fn node_variable_count(&self) -> usize {
        self.variables.count(ElementKind::Node)
    }

    pub fn edge_variable_count(&self) -> usize {
        self.variables.count(ElementKind::Edge)
    }

    pub fn where_clause(&self) -> Option<&Expression> {
        self.where_clause.as_ref()
    }
}
