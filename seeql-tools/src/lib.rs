pub mod logger;

use seeql_core::{ElementRef, InMemoryGraph, PropertyGraph, QueryError, QueryResult, Value};
use serde_json::{json, Map};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ToolError(Box<ToolErrorKind>);

impl ToolError {
    pub fn kind(&self) -> &ToolErrorKind {
        &self.0
    }
}

#[derive(Error, Debug)]
pub enum ToolErrorKind {
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("MissingQuery: pass --query or --query-file")]
    MissingQuery,
}

impl<E> From<E> for ToolError
where
    ToolErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        ToolError(Box::new(ToolErrorKind::from(err)))
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

pub fn load_graph(path: &Path) -> Result<InMemoryGraph> {
    let json = std::fs::read_to_string(path)?;
    Ok(InMemoryGraph::from_json_str(&json)?)
}

/// Query text from `--query`, else the contents of `--query-file`.
pub fn read_query(query: Option<&str>, query_file: Option<&Path>) -> Result<String> {
    match (query, query_file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => Err(ToolErrorKind::MissingQuery.into()),
    }
}

/// JSON form of a result with graph elements replaced by their external ids.
pub fn render_result<G: PropertyGraph>(result: &QueryResult, graph: &G) -> serde_json::Value {
    let value = match result {
        QueryResult::Integer(value) => json!(value),
        QueryResult::Double(value) => json!(value),
        QueryResult::Single(value) => value_json(graph, value),
        QueryResult::Table(table) => {
            let rows: Vec<serde_json::Value> = table
                .rows
                .iter()
                .map(|row| {
                    let mut record = Map::new();
                    for (column, value) in table.columns.iter().zip(row) {
                        record.insert(column.clone(), value_json(graph, value));
                    }
                    serde_json::Value::Object(record)
                })
                .collect();
            json!({ "columns": table.columns, "rows": rows })
        }
        QueryResult::Nodes(nodes) => {
            element_ids(graph, nodes.iter().map(|id| ElementRef::Node(*id)))
        }
        QueryResult::Edges(edges) => {
            element_ids(graph, edges.iter().map(|id| ElementRef::Edge(*id)))
        }
        QueryResult::Graph { nodes, edges } => json!({
            "nodes": element_ids(graph, nodes.iter().map(|id| ElementRef::Node(*id))),
            "edges": element_ids(graph, edges.iter().map(|id| ElementRef::Edge(*id))),
        }),
    };
    json!({ "kind": result.kind(), "value": value })
}

fn element_ids<G: PropertyGraph>(
    graph: &G,
    elements: impl Iterator<Item = ElementRef>,
) -> serde_json::Value {
    serde_json::Value::Array(
        elements
            .map(|element| element_json(graph, element))
            .collect(),
    )
}

fn value_json<G: PropertyGraph>(graph: &G, value: &Value) -> serde_json::Value {
    match value {
        Value::Element(element) => {
            let mut tagged = Map::new();
            tagged.insert(element.kind().to_string(), element_json(graph, *element));
            serde_json::Value::Object(tagged)
        }
        other => json!(other),
    }
}

fn element_json<G: PropertyGraph>(graph: &G, element: ElementRef) -> serde_json::Value {
    match graph.element_id(element) {
        Some(id) => json!(id),
        None => serde_json::Value::Null,
    }
}
