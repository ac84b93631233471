use std::marker::PhantomData;

use super::{base_select, fetch_objects};
use crate::access_control::Viewer;
use crate::client::Database;
use crate::entity::{Entity, GraphType};
use crate::error::Result;

/// Every object of a type. A full scan of the type's rows.
pub struct SelectAllQuery<T: GraphType> {
    db: Database,
    viewer: Option<Viewer>,
    _type: PhantomData<fn() -> T>,
}

impl<T: GraphType> SelectAllQuery<T> {
    pub fn new(db: &Database, viewer: Option<&Viewer>) -> Self {
        Self {
            db: db.clone(),
            viewer: viewer.cloned(),
            _type: PhantomData,
        }
    }

    pub async fn fetch(&self) -> Result<Vec<Entity<T>>> {
        let (_, select) = base_select::<T>(&self.db);
        fetch_objects::<T>(&self.db, select, self.viewer.as_ref()).await
    }
}
