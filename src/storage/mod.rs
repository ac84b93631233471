//! Storage - the relational backend contract the graph layer persists through.
//!
//! The graph layer never talks SQL. It asks a [`StorageBackend`] for a handful of
//! table-level primitives and expresses every read as a [`Select`]: one base
//! table, an optional inner join, and a list of column filters.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   Entity / Query / Edges     │
//! └──────────────┬───────────────┘
//!                │ Row, Filter, Select
//!                ▼
//! ┌──────────────────────────────┐
//! │       StorageBackend         │
//! │ has_table / create_table     │
//! │ insert / update / delete     │
//! │ select (filters + join)      │
//! └──────┬───────────────┬───────┘
//!        ▼               ▼
//!  InMemoryBackend   (external: SQL drivers)
//! ```

mod error;
mod in_memory;
mod query;
mod schema;

use async_trait::async_trait;

pub use error::StorageError;
pub use in_memory::InMemoryBackend;
pub use query::{Filter, Join, Predicate, Row, Select};
pub use schema::{ColumnDef, ColumnKind, TableSchema};

/// Table-level storage primitives consumed by the graph layer.
///
/// Every call is asynchronous; timeouts and cancellation belong to the
/// implementation and are passed through unmodified.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Whether a table with this name exists.
    async fn has_table(&self, table: &str) -> Result<bool, StorageError>;

    /// Create a table. Fails with [`StorageError::TableExists`] if it is already present.
    async fn create_table(&self, schema: &TableSchema) -> Result<(), StorageError>;

    /// Insert rows into a table.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), StorageError>;

    /// Apply `changes` to every row matching all `filters`. Returns the number of rows touched.
    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        changes: Row,
    ) -> Result<u64, StorageError>;

    /// Delete every row matching all `filters`. Returns the number of rows removed.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StorageError>;

    /// Run a select and return the base table's rows.
    async fn select(&self, query: &Select) -> Result<Vec<Row>, StorageError>;

    /// Release the connection. Later calls may fail.
    async fn close(&self) -> Result<(), StorageError>;
}
