use thiserror::Error;

/// Error type for storage backend operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("duplicate key '{key}' in table {table}")]
    DuplicateKey { table: String, key: String },

    /// The backend connection was closed.
    #[error("storage connection closed")]
    Closed,

    /// Any backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}
