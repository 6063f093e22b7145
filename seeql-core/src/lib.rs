pub mod errors;

pub type Result<T> = std::result::Result<T, errors::QueryError>;

pub mod engine;
pub mod eval;
pub mod graph;
pub mod matcher;
pub mod projector;
pub mod result;
pub mod value;

pub use engine::{execute_query, execute_query_ast, QueryEngine, QueryStats};
pub use errors::{ErrorKind, QueryError};
pub use graph::{
    Attribute, EdgeDocument, EdgeId, ElementRef, GraphDocument, InMemoryGraph, NodeDocument,
    NodeId, PropertyGraph,
};
pub use result::{QueryResult, Table};
pub use value::{Binding, Number, Value};

pub mod prelude {
    pub use super::errors::QueryError;
    pub use super::Result;
}
