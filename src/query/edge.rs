use std::future::IntoFuture;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use serde_json::Value;

use super::{base_select, fetch_objects, IdQuery, IndexLookup, IndexQuery};
use crate::access_control::Viewer;
use crate::client::{tables, Database};
use crate::entity::{Entity, GraphType};
use crate::error::Result;
use crate::storage::Filter;

/// How an edge query reaches its objects.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EdgePlan {
    /// Field-backed edge whose field is null.
    Empty,
    /// Field-backed edge: the id stored in the field.
    ById(String),
    /// Inverse of a field-backed edge, through the index on its field.
    Index { field: &'static str, key: Value },
    /// Rows with `id1 = anchor`; yields the `id2` side.
    Outbound { tag: String, anchor: String },
    /// Rows with `id2 = anchor`; yields the `id1` side.
    Inbound { tag: String, anchor: String },
}

/// Objects of type `C` reached through an edge.
///
/// Lazy: storage is read when the query is awaited (or through
/// [`fetch`](Self::fetch), [`first`](Self::first), [`first_n`](Self::first_n)).
///
/// ```ignore
/// let items = list.query_edges::<TodoItem>("items")?.await?;
/// let newest = list.query_edges::<TodoItem>("items")?.first().await?;
/// ```
pub struct EdgeQuery<C: GraphType> {
    db: Database,
    viewer: Option<Viewer>,
    plan: EdgePlan,
    _type: PhantomData<fn() -> C>,
}

impl<C: GraphType> EdgeQuery<C> {
    pub(crate) fn new(db: &Database, viewer: Option<&Viewer>, plan: EdgePlan) -> Self {
        Self {
            db: db.clone(),
            viewer: viewer.cloned(),
            plan,
            _type: PhantomData,
        }
    }

    pub async fn fetch(&self) -> Result<Vec<Entity<C>>> {
        let viewer = self.viewer.as_ref();
        match &self.plan {
            EdgePlan::Empty => Ok(Vec::new()),
            EdgePlan::ById(id) => Ok(IdQuery::<C>::new(&self.db, id.as_str(), viewer)
                .fetch()
                .await?
                .into_iter()
                .collect()),
            EdgePlan::Index { field, key } => {
                IndexLookup::<C>::new(&self.db, field, IndexQuery::Equals(key.clone()), viewer)?
                    .fetch()
                    .await
            }
            EdgePlan::Outbound { tag, anchor } => self.through_associations(tag, anchor, false).await,
            EdgePlan::Inbound { tag, anchor } => self.through_associations(tag, anchor, true).await,
        }
    }

    pub async fn first(&self) -> Result<Option<Entity<C>>> {
        Ok(self.fetch().await?.into_iter().next())
    }

    pub async fn first_n(&self, n: usize) -> Result<Vec<Entity<C>>> {
        let mut results = self.fetch().await?;
        results.truncate(n);
        Ok(results)
    }

    async fn through_associations(&self, tag: &str, anchor: &str, inverse: bool) -> Result<Vec<Entity<C>>> {
        let (joined, anchored) = if inverse { ("id1", "id2") } else { ("id2", "id1") };
        let (_, select) = base_select::<C>(&self.db);
        let select = select
            .inner_join(tables::ASSOCIATIONS, "id", joined)
            .filter(Filter::eq(format!("{}.{}", tables::ASSOCIATIONS, anchored), anchor))
            .filter(Filter::eq(
                format!("{}.assoc_type_name", tables::ASSOCIATIONS),
                tag,
            ));
        fetch_objects::<C>(&self.db, select, self.viewer.as_ref()).await
    }
}

impl<C: GraphType> IntoFuture for EdgeQuery<C> {
    type Output = Result<Vec<Entity<C>>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.fetch().await })
    }
}
