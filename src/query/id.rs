use std::marker::PhantomData;

use super::{base_select, fetch_objects};
use crate::access_control::Viewer;
use crate::client::Database;
use crate::entity::{Entity, GraphType};
use crate::error::Result;
use crate::storage::Filter;

/// One object by id.
pub struct IdQuery<T: GraphType> {
    db: Database,
    id: String,
    viewer: Option<Viewer>,
    _type: PhantomData<fn() -> T>,
}

impl<T: GraphType> IdQuery<T> {
    pub fn new(db: &Database, id: impl Into<String>, viewer: Option<&Viewer>) -> Self {
        Self {
            db: db.clone(),
            id: id.into(),
            viewer: viewer.cloned(),
            _type: PhantomData,
        }
    }

    /// `None` when the object does not exist or the viewer may not read it.
    pub async fn fetch(&self) -> Result<Option<Entity<T>>> {
        let (table, select) = base_select::<T>(&self.db);
        let select = select.filter(Filter::eq(format!("{table}.id"), self.id.as_str()));
        let results = fetch_objects::<T>(&self.db, select, self.viewer.as_ref()).await?;
        Ok(results.into_iter().next())
    }
}
