use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by entity, edge and query operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A field value failed its validator.
    #[error("validation error: value '{value}' is not valid for field '{field}' on type {type_name}")]
    Validation {
        type_name: String,
        field: String,
        value: Value,
    },

    /// A create, update or delete rule chain resolved to deny.
    #[error("insufficient permission: viewer with ID {} cannot perform action {action} on type {type_name}", .viewer_id.as_deref().unwrap_or("null"))]
    Permission {
        viewer_id: Option<String>,
        action: String,
        type_name: String,
    },

    /// Operation on a deleted entity, or storage access outside the ready state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Query shape the layer does not support (e.g. a field without an index).
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    #[error("type {0} is not registered")]
    TypeNotRegistered(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Raised by lifecycle hooks that want to abort an operation.
    #[error("hook error: {0}")]
    Hook(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Serialization(err.to_string())
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
