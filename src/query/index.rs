use std::marker::PhantomData;

use serde_json::Value;

use super::{base_select, fetch_objects};
use crate::access_control::Viewer;
use crate::client::{tables, Database};
use crate::entity::{Entity, GraphType};
use crate::error::{GraphError, Result};
use crate::storage::{Filter, Predicate};

/// Match applied to an index key.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexQuery {
    Equals(Value),
    InArray(Vec<Value>),
    /// Inclusive on both ends.
    InRange(Value, Value),
    /// SQL `LIKE` pattern (`%`, `_`).
    Like(String),
}

impl IndexQuery {
    pub fn equals(value: impl Into<Value>) -> Self {
        IndexQuery::Equals(value.into())
    }

    pub fn in_array<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        IndexQuery::InArray(values.into_iter().map(Into::into).collect())
    }

    pub fn in_range(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        IndexQuery::InRange(low.into(), high.into())
    }

    pub fn like(pattern: impl Into<String>) -> Self {
        IndexQuery::Like(pattern.into())
    }

    fn predicate(&self) -> Predicate {
        match self {
            IndexQuery::Equals(value) => Predicate::Equals(value.clone()),
            IndexQuery::InArray(values) => Predicate::In(values.clone()),
            IndexQuery::InRange(low, high) => Predicate::Between(low.clone(), high.clone()),
            IndexQuery::Like(pattern) => Predicate::Like(pattern.clone()),
        }
    }
}

/// Objects whose indexed field matches an [`IndexQuery`].
pub struct IndexLookup<T: GraphType> {
    db: Database,
    field: String,
    query: IndexQuery,
    viewer: Option<Viewer>,
    _type: PhantomData<fn() -> T>,
}

impl<T: GraphType> IndexLookup<T> {
    /// Fails with `UnsupportedQuery` unless `field` is one of the type's indexed fields.
    pub fn new(
        db: &Database,
        field: &str,
        query: IndexQuery,
        viewer: Option<&Viewer>,
    ) -> Result<Self> {
        let descriptor = db.descriptor(T::TYPE_NAME)?;
        if !descriptor.is_indexed(field) {
            return Err(GraphError::UnsupportedQuery(format!(
                "querying by field '{}' on type '{}' is not supported as it is not an indexed field",
                field,
                T::TYPE_NAME
            )));
        }

        Ok(Self {
            db: db.clone(),
            field: field.to_string(),
            query,
            viewer: viewer.cloned(),
            _type: PhantomData,
        })
    }

    pub async fn fetch(&self) -> Result<Vec<Entity<T>>> {
        let index_table = tables::index_table(T::TYPE_NAME, &self.field);
        let (_, select) = base_select::<T>(&self.db);
        let select = select
            .inner_join(index_table.as_str(), "id", "id")
            .filter(Filter::new(format!("{index_table}.key"), self.query.predicate()));
        fetch_objects::<T>(&self.db, select, self.viewer.as_ref()).await
    }
}
