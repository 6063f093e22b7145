use seeql_cypher::{CypherError, ElementKind};
use thiserror::Error;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct QueryError(Box<ErrorKind>);

impl QueryError {
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        ErrorKind::TypeMismatch(message.into()).into()
    }

    pub(crate) fn unsupported_operator(operator: impl Into<String>) -> Self {
        ErrorKind::UnsupportedOperator(operator.into()).into()
    }

    pub(crate) fn invalid_graph(message: impl Into<String>) -> Self {
        ErrorKind::InvalidGraph(message.into()).into()
    }
}

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("PatternConflict: variable `{variable}` is used as both {first} and {second}")]
    PatternConflict {
        variable: String,
        first: ElementKind,
        second: ElementKind,
    },
    #[error("UnsupportedOperator: {0}")]
    UnsupportedOperator(String),
    #[error("TypeMismatch: {0}")]
    TypeMismatch(String),
    #[error("EmptyQuery: query text is blank")]
    EmptyQuery,
    #[error("CypherError: {0}")]
    Cypher(CypherError),
    #[error("InvalidGraph: {0}")]
    InvalidGraph(String),
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl From<CypherError> for ErrorKind {
    fn from(err: CypherError) -> Self {
        match err {
            CypherError::PatternConflict {
                variable,
                first,
                second,
            } => ErrorKind::PatternConflict {
                variable,
                first,
                second,
            },
            CypherError::EmptyQuery => ErrorKind::EmptyQuery,
            other => ErrorKind::Cypher(other),
        }
    }
}

impl<E> From<E> for QueryError
where
    ErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        QueryError(Box::new(ErrorKind::from(err)))
    }
}
