//! Queries - the fixed set of read shapes.
//!
//! Every shape builds one [`Select`] against the object table of its type,
//! hydrates the rows into entities and then drops the ones the viewer may not
//! read. Read rules are applied after hydration, never pushed into the
//! storage filter, since they can look at any field of the object.
//!
//! | Shape                | Storage read                                        |
//! |----------------------|-----------------------------------------------------|
//! | [`IdQuery`]          | `id = ?`                                            |
//! | [`SelectAllQuery`]   | type filter only                                    |
//! | [`IndexLookup`]      | join `index__{type}__{field}` on `id`, filter `key` |
//! | [`EdgeQuery`]        | join `associations`, filter tag and anchor id       |

mod edge;
mod id;
mod index;
mod select_all;

use tracing::debug;

pub use edge::EdgeQuery;
pub(crate) use edge::EdgePlan;
pub use id::IdQuery;
pub use index::{IndexLookup, IndexQuery};
pub use select_all::SelectAllQuery;

use crate::access_control::Viewer;
use crate::client::Database;
use crate::entity::{Entity, GraphType};
use crate::error::Result;
use crate::storage::{Filter, Select};

/// Object table of `T` restricted to rows of type `T`.
fn base_select<T: GraphType>(db: &Database) -> (String, Select) {
    let table = db.table_for_type(T::TYPE_NAME);
    let select = Select::from(table.as_str())
        .filter(Filter::eq(format!("{table}.type_name"), T::TYPE_NAME));
    (table, select)
}

/// Runs `select`, hydrates every row and keeps the readable ones.
async fn fetch_objects<T: GraphType>(
    db: &Database,
    select: Select,
    viewer: Option<&Viewer>,
) -> Result<Vec<Entity<T>>> {
    let backend = db.backend()?;
    let descriptor = db.descriptor(T::TYPE_NAME)?;
    let rows = backend.select(&select).await?;

    let mut visible = Vec::with_capacity(rows.len());
    for row in &rows {
        let entity = Entity::<T>::from_row(db, descriptor.clone(), row, viewer)?;
        if entity.can_read() {
            visible.push(entity);
        }
    }

    debug!(
        type_name = T::TYPE_NAME,
        fetched = rows.len(),
        visible = visible.len(),
        "query finished"
    );
    Ok(visible)
}
