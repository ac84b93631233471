//! InMemoryBackend - HashMap-backed storage for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::{Filter, Row, Select, StorageBackend, StorageError, TableSchema};

static NULL: Value = Value::Null;

struct Table {
    schema: TableSchema,
    rows: Vec<Row>,
}

impl Table {
    fn key_of(&self, row: &Row) -> Option<Value> {
        self.schema
            .primary_key()
            .and_then(|pk| row.get(pk))
            .cloned()
    }
}

/// In-memory storage backend.
///
/// Tables live in a `HashMap` behind an `RwLock`. Clone-friendly via `Arc`:
/// clones share the same tables.
#[derive(Clone)]
pub struct InMemoryBackend {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    closed: Arc<AtomicBool>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of rows currently stored in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize, StorageError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        tables
            .get(table)
            .map(|t| t.rows.len())
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))
    }

    /// Names of every table, sorted.
    pub fn table_names(&self) -> Result<Vec<String>, StorageError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

/// Resolve `column` against the base row first, then the joined row.
fn lookup<'a>(
    column: &str,
    base_table: &str,
    base: &'a Row,
    joined: Option<(&str, &'a Row)>,
) -> Option<&'a Value> {
    if let Some((table, name)) = column.split_once('.') {
        if table == base_table {
            return base.get(name);
        }
        return match joined {
            Some((joined_table, row)) if joined_table == table => row.get(name),
            _ => None,
        };
    }

    base.get(column)
        .or_else(|| joined.and_then(|(_, row)| row.get(column)))
}

fn matches_all(filters: &[Filter], base_table: &str, base: &Row, joined: Option<(&str, &Row)>) -> bool {
    filters.iter().all(|filter| {
        let value = lookup(&filter.column, base_table, base, joined).unwrap_or(&NULL);
        filter.predicate.matches(value)
    })
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn has_table(&self, table: &str) -> Result<bool, StorageError> {
        self.ensure_open()?;
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        Ok(tables.contains_key(table))
    }

    async fn create_table(&self, schema: &TableSchema) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        if tables.contains_key(&schema.name) {
            return Err(StorageError::TableExists(schema.name.clone()));
        }
        tables.insert(
            schema.name.clone(),
            Table {
                schema: schema.clone(),
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        let target = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;

        // Check the whole batch before writing so a duplicate leaves the table untouched.
        let mut batch_keys = Vec::new();
        for row in &rows {
            let Some(key) = target.key_of(row) else {
                continue;
            };
            let clash = batch_keys.contains(&key)
                || target
                    .rows
                    .iter()
                    .any(|existing| target.key_of(existing).as_ref() == Some(&key));
            if clash {
                return Err(StorageError::DuplicateKey {
                    table: table.to_string(),
                    key: key.as_str().map(str::to_string).unwrap_or_else(|| key.to_string()),
                });
            }
            batch_keys.push(key);
        }

        target.rows.extend(rows);
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        changes: Row,
    ) -> Result<u64, StorageError> {
        self.ensure_open()?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        let target = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;

        let mut touched = 0;
        for row in target.rows.iter_mut() {
            if matches_all(filters, table, row, None) {
                for (column, value) in &changes {
                    row.insert(column.clone(), value.clone());
                }
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StorageError> {
        self.ensure_open()?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        let target = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;

        let before = target.rows.len();
        target.rows.retain(|row| !matches_all(filters, table, row, None));
        Ok((before - target.rows.len()) as u64)
    }

    async fn select(&self, query: &Select) -> Result<Vec<Row>, StorageError> {
        self.ensure_open()?;
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        let base = tables
            .get(&query.table)
            .ok_or_else(|| StorageError::TableNotFound(query.table.clone()))?;

        let Some(join) = &query.join else {
            return Ok(base
                .rows
                .iter()
                .filter(|row| matches_all(&query.filters, &query.table, row, None))
                .cloned()
                .collect());
        };

        let joined = tables
            .get(&join.table)
            .ok_or_else(|| StorageError::TableNotFound(join.table.clone()))?;

        let mut results = Vec::new();
        for row in &base.rows {
            let Some(key) = row.get(&join.base_column) else {
                continue;
            };
            for other in &joined.rows {
                if other.get(&join.joined_column) != Some(key) {
                    continue;
                }
                if matches_all(
                    &query.filters,
                    &query.table,
                    row,
                    Some((join.table.as_str(), other)),
                ) {
                    results.push(row.clone());
                }
            }
        }
        Ok(results)
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
