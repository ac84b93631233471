//! Edge operations on entities.

use futures::future::try_join_all;
use serde_json::Value;
use tracing::debug;

use super::entity::{authorize_cascade, delete_objects, now, timestamp};
use super::{AsEntityId, EdgeConfig, Entity, GraphType};
use crate::access_control::{Action, Viewer};
use crate::client::{tables, Database};
use crate::error::{GraphError, Result};
use crate::query::{EdgePlan, EdgeQuery};
use crate::storage::{Filter, Row, Select, StorageBackend};

impl<T: GraphType> Entity<T> {
    pub async fn add_edge<C: GraphType>(&mut self, edge: &str, target: &mut Entity<C>) -> Result<()> {
        self.add_edges(edge, &mut [target]).await
    }

    /// Links this object to `targets` through `edge`.
    ///
    /// Requires update permission on this object. Targets with unsaved
    /// changes are saved first. Field-backed edges store the single target's
    /// id in the backing field and save this object instead of writing
    /// association rows.
    pub async fn add_edges<C: GraphType>(
        &mut self,
        edge: &str,
        targets: &mut [&mut Entity<C>],
    ) -> Result<()> {
        self.ensure_not_deleted()?;
        self.enforce(Action::Update)?;
        if targets.is_empty() {
            return Ok(());
        }

        let config = self.edge_config(edge)?;
        check_connected_type::<C>(edge, &config)?;
        if config.is_one_to_one() && targets.len() > 1 {
            return Err(GraphError::InvalidEdge(format!(
                "edge '{}' is one-to-one, but {} targets were given",
                edge,
                targets.len()
            )));
        }

        if let Some(field) = config.backing_field() {
            let target_id = targets[0].id().to_string();
            self.set(field, target_id)?.save().await?;
            return Ok(());
        }

        if config.is_undirected() && C::TYPE_NAME != T::TYPE_NAME {
            return Err(GraphError::InvalidEdge(format!(
                "edge '{}' is undirected and must reference objects of type {}",
                edge,
                T::TYPE_NAME
            )));
        }

        let backend = self.database().backend()?;
        let tag = tables::edge_tag(T::TYPE_NAME, edge);

        if config.is_one_to_one() {
            backend
                .delete(
                    tables::ASSOCIATIONS,
                    &[Filter::eq("id1", self.id()), Filter::eq("assoc_type_name", tag.as_str())],
                )
                .await?;
            if config.is_undirected() {
                backend
                    .delete(
                        tables::ASSOCIATIONS,
                        &[Filter::eq("id2", self.id()), Filter::eq("assoc_type_name", tag.as_str())],
                    )
                    .await?;
            }
        }

        try_join_all(
            targets
                .iter_mut()
                .filter(|target| target.has_unsaved_changes())
                .map(|target| target.save()),
        )
        .await?;

        let target_ids: Vec<Value> = targets.iter().map(|target| Value::from(target.id())).collect();
        // Targets already linked keep their rows.
        let existing = if config.is_one_to_one() {
            Vec::new()
        } else {
            self.linked_ids(backend.as_ref(), &tag, "id1", "id2", &target_ids)
                .await?
        };

        let creator_id = self
            .viewer()
            .and_then(Viewer::id)
            .map(Value::from)
            .unwrap_or(Value::Null);
        let stamp = timestamp(now());
        let link = |from: &str, to: &str| {
            Row::from([
                ("id1".to_string(), Value::from(from)),
                ("id2".to_string(), Value::from(to)),
                ("assoc_type_name".to_string(), Value::from(tag.as_str())),
                ("id2_type".to_string(), Value::from(C::TYPE_NAME)),
                ("creator_id".to_string(), creator_id.clone()),
                ("created_at".to_string(), stamp.clone()),
                ("updated_at".to_string(), stamp.clone()),
            ])
        };

        let mut rows = Vec::with_capacity(targets.len() * 2);
        for target in targets.iter() {
            if existing.contains(&Value::from(target.id())) {
                continue;
            }
            rows.push(link(self.id(), target.id()));
            if config.is_undirected() {
                rows.push(link(target.id(), self.id()));
            }
        }
        let added = rows.len();
        if !rows.is_empty() {
            backend.insert(tables::ASSOCIATIONS, rows).await?;
        }

        debug!(type_name = T::TYPE_NAME, id = %self.id(), edge, rows = added, "added edges");
        Ok(())
    }

    pub async fn delete_edge(
        &mut self,
        edge: &str,
        target: impl AsEntityId,
        also_delete: bool,
    ) -> Result<()> {
        self.delete_edges(edge, [target], also_delete).await
    }

    /// Unlinks `targets` (entities or ids) from this object.
    ///
    /// Targets that are not linked are ignored. With `also_delete`, the linked
    /// objects are deleted as well once this viewer passes their type's delete
    /// rules; their hooks do not run.
    pub async fn delete_edges<I>(&mut self, edge: &str, targets: I, also_delete: bool) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsEntityId,
    {
        self.ensure_not_deleted()?;
        self.enforce(Action::Update)?;

        let ids: Vec<String> = targets
            .into_iter()
            .map(|target| target.entity_id().to_string())
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        let config = self.edge_config(edge)?;
        let backend = self.database().backend()?;
        let connected = self.database().descriptor(config.connected_type())?;
        let connected_table = self.database().table_for_type(config.connected_type());

        if let Some(field) = config.backing_field() {
            let current = match self.get(field)? {
                Value::String(id) if ids.contains(id) => id.clone(),
                _ => return Ok(()),
            };
            if also_delete {
                let linked = [Value::from(current)];
                authorize_cascade(self.database(), backend.as_ref(), &connected, &linked, self.viewer())
                    .await?;
                delete_objects(backend.as_ref(), &connected_table, &connected, &linked).await?;
            }
            self.set(field, Value::Null)?.save().await?;
            return Ok(());
        }

        let tag = tables::edge_tag(T::TYPE_NAME, edge);
        let id_values: Vec<Value> = ids.into_iter().map(Value::from).collect();

        // Only targets that are actually linked may be cascaded to.
        let mut linked = self
            .linked_ids(backend.as_ref(), &tag, "id1", "id2", &id_values)
            .await?;
        if config.is_undirected() {
            for id in self
                .linked_ids(backend.as_ref(), &tag, "id2", "id1", &id_values)
                .await?
            {
                if !linked.contains(&id) {
                    linked.push(id);
                }
            }
        }
        if also_delete {
            authorize_cascade(self.database(), backend.as_ref(), &connected, &linked, self.viewer())
                .await?;
        }

        backend
            .delete(
                tables::ASSOCIATIONS,
                &[
                    Filter::eq("id1", self.id()),
                    Filter::eq("assoc_type_name", tag.as_str()),
                    Filter::is_in("id2", id_values.clone()),
                ],
            )
            .await?;
        if config.is_undirected() {
            backend
                .delete(
                    tables::ASSOCIATIONS,
                    &[
                        Filter::eq("id2", self.id()),
                        Filter::eq("assoc_type_name", tag.as_str()),
                        Filter::is_in("id1", id_values.clone()),
                    ],
                )
                .await?;
        }

        if also_delete && !linked.is_empty() {
            delete_objects(backend.as_ref(), &connected_table, &connected, &linked).await?;
        }

        debug!(
            type_name = T::TYPE_NAME,
            id = %self.id(),
            edge,
            unlinked = linked.len(),
            also_delete,
            "deleted edges"
        );
        Ok(())
    }

    /// Objects connected to this one through `edge`. Nothing is read until the
    /// returned query is awaited.
    pub fn query_edges<C: GraphType>(&self, edge: &str) -> Result<EdgeQuery<C>> {
        self.ensure_not_deleted()?;
        let config = self.edge_config(edge)?;
        check_connected_type::<C>(edge, &config)?;

        let plan = match config.backing_field() {
            Some(field) => match self.get(field)? {
                Value::String(id) => EdgePlan::ById(id.clone()),
                _ => EdgePlan::Empty,
            },
            None => EdgePlan::Outbound {
                tag: tables::edge_tag(T::TYPE_NAME, edge),
                anchor: self.id().to_string(),
            },
        };
        Ok(EdgeQuery::new(self.database(), self.viewer(), plan))
    }

    /// Objects of this type that link to `connected` through their `edge`.
    ///
    /// Field-backed edges are resolved through the index on the backing field
    /// and fail with `UnsupportedQuery` when that field is not indexed.
    pub fn query_inverse_of_edge<C: GraphType>(
        db: &Database,
        edge: &str,
        connected: &Entity<C>,
        viewer: Option<&Viewer>,
    ) -> Result<EdgeQuery<T>> {
        let descriptor = db.descriptor(T::TYPE_NAME)?;
        let config = descriptor
            .edges
            .get(edge)
            .cloned()
            .ok_or_else(|| missing_edge::<T>(edge))?;
        check_connected_type::<C>(edge, &config)?;

        let plan = match config.backing_field() {
            Some(field) if descriptor.is_indexed(field) => EdgePlan::Index {
                field,
                key: Value::from(connected.id()),
            },
            Some(field) => {
                return Err(GraphError::UnsupportedQuery(format!(
                    "the inverse of edge '{}' on type {} needs an index on field '{}'",
                    edge,
                    T::TYPE_NAME,
                    field
                )))
            }
            None => EdgePlan::Inbound {
                tag: tables::edge_tag(T::TYPE_NAME, edge),
                anchor: connected.id().to_string(),
            },
        };
        Ok(EdgeQuery::new(db, viewer, plan))
    }

    /// Values of `other` on association rows tagged `tag` whose `anchor` column
    /// is this object and whose `other` column is one of `candidates`.
    async fn linked_ids(
        &self,
        backend: &dyn StorageBackend,
        tag: &str,
        anchor: &str,
        other: &str,
        candidates: &[Value],
    ) -> Result<Vec<Value>> {
        let select = Select::from(tables::ASSOCIATIONS)
            .filter(Filter::eq(anchor, self.id()))
            .filter(Filter::eq("assoc_type_name", tag))
            .filter(Filter::is_in(other, candidates.to_vec()));
        let rows = backend.select(&select).await?;
        Ok(rows
            .into_iter()
            .filter_map(|mut row| row.remove(other))
            .collect())
    }

    fn edge_config(&self, edge: &str) -> Result<EdgeConfig> {
        self.descriptor()
            .edges
            .get(edge)
            .cloned()
            .ok_or_else(|| missing_edge::<T>(edge))
    }
}

fn missing_edge<T: GraphType>(edge: &str) -> GraphError {
    GraphError::NotFound(format!("edge '{}' not found on object type {}", edge, T::TYPE_NAME))
}

fn check_connected_type<C: GraphType>(edge: &str, config: &EdgeConfig) -> Result<()> {
    if config.connected_type() != C::TYPE_NAME {
        return Err(GraphError::InvalidEdge(format!(
            "edge '{}' connects to {}, not {}",
            edge,
            config.connected_type(),
            C::TYPE_NAME
        )));
    }
    Ok(())
}
