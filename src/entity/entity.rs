use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{Fields, GraphType};
use crate::access_control::{Action, PermissionEvaluator, RuleSubject, Viewer};
use crate::client::{tables, Database, TypeDescriptor};
use crate::error::{GraphError, Result};
use crate::query::{IdQuery, IndexLookup, IndexQuery, SelectAllQuery};
use crate::storage::{Filter, Row, Select, StorageBackend};

static NULL: Value = Value::Null;

/// Identity and bookkeeping of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub id: String,
    /// Id of the viewer that created the object, empty when there was none.
    pub creator_id: String,
    pub created_time: DateTime<Utc>,
    pub modified_time: DateTime<Utc>,
}

/// An instance of the entity type `T`.
///
/// Reads through [`get`](Self::get) always return the persisted value. Writes
/// through [`set`](Self::set) are staged and only become visible to `get` once
/// [`save`](Self::save) succeeds. After [`delete`](Self::delete) the instance is
/// inert: every read and write fails with `IllegalState`.
///
/// ```ignore
/// let mut item = Entity::<TodoItem>::create(&db, Some(&viewer))?;
/// item.set("title", "Buy milk")?;
/// item.save().await?;
///
/// let loaded = Entity::<TodoItem>::get_by_id(&db, item.id(), Some(&viewer)).await?;
/// assert_eq!(loaded.get("title")?, "Buy milk");
/// ```
pub struct Entity<T: GraphType> {
    db: Database,
    descriptor: Arc<TypeDescriptor>,
    viewer: Option<Viewer>,
    metadata: Metadata,
    data: Fields,
    staged: Fields,
    dirty_fields: Vec<String>,
    is_new: bool,
    is_deleted: bool,
    _type: PhantomData<fn() -> T>,
}

impl<T: GraphType> Entity<T> {
    /// A new, unsaved instance holding the type's initial value.
    ///
    /// The creator id is the viewer's id, or empty without a viewer.
    pub fn create(db: &Database, viewer: Option<&Viewer>) -> Result<Self> {
        let descriptor = db.descriptor(T::TYPE_NAME)?;
        let now = now();
        let creator_id = viewer.and_then(Viewer::id).unwrap_or_default().to_string();

        Ok(Self {
            db: db.clone(),
            descriptor,
            viewer: viewer.cloned(),
            metadata: Metadata {
                id: db.generate_id(),
                creator_id,
                created_time: now,
                modified_time: now,
            },
            data: T::initial_value(),
            staged: Fields::new(),
            dirty_fields: Vec::new(),
            is_new: true,
            is_deleted: false,
            _type: PhantomData,
        })
    }

    /// Hydrates a stored object row.
    pub(crate) fn from_row(
        db: &Database,
        descriptor: Arc<TypeDescriptor>,
        row: &Row,
        viewer: Option<&Viewer>,
    ) -> Result<Self> {
        let data: Fields = serde_json::from_str(column(row, "data")?)?;

        Ok(Self {
            db: db.clone(),
            descriptor,
            viewer: viewer.cloned(),
            metadata: Metadata {
                id: column(row, "id")?.to_string(),
                creator_id: column(row, "creator_id")?.to_string(),
                created_time: parse_timestamp(row, "created_at")?,
                modified_time: parse_timestamp(row, "updated_at")?,
            },
            data,
            staged: Fields::new(),
            dirty_fields: Vec::new(),
            is_new: false,
            is_deleted: false,
            _type: PhantomData,
        })
    }

    // --- Accessors ---

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn creator_id(&self) -> &str {
        &self.metadata.creator_id
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.metadata.created_time
    }

    pub fn modified_time(&self) -> DateTime<Utc> {
        self.metadata.modified_time
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// True until the first successful save.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.is_new || !self.dirty_fields.is_empty()
    }

    /// Fields set since the last save, in the order they were first set.
    pub fn modified_fields(&self) -> &[String] {
        &self.dirty_fields
    }

    // --- Fields ---

    /// Persisted value of a field; null when the field is absent.
    pub fn get(&self, field: &str) -> Result<&Value> {
        self.ensure_not_deleted()?;
        Ok(self.data.get(field).unwrap_or(&NULL))
    }

    /// Value of a field including changes not yet saved.
    pub fn get_unsaved(&self, field: &str) -> Result<&Value> {
        self.ensure_not_deleted()?;
        Ok(self.working_value(field).unwrap_or(&NULL))
    }

    /// Persisted value of a field, deserialized.
    pub fn get_as<V: DeserializeOwned>(&self, field: &str) -> Result<V> {
        let value = self.get(field)?.clone();
        Ok(serde_json::from_value(value)?)
    }

    /// All persisted field values.
    pub fn fields(&self) -> Result<&Fields> {
        self.ensure_not_deleted()?;
        Ok(&self.data)
    }

    /// Stages a field value.
    ///
    /// A value rejected by the field's validator fails with `Validation` and
    /// stages nothing, unless the validator substitutes a value of its own.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.ensure_not_deleted()?;

        let mut value = value.into();
        if let Some(validator) = self.descriptor.validators.get(field) {
            if !validator.is_valid(&value) {
                value = validator
                    .coerce(&value)
                    .ok_or_else(|| GraphError::Validation {
                        type_name: T::TYPE_NAME.to_string(),
                        field: field.to_string(),
                        value: value.clone(),
                    })?;
            }
        }

        if !self.dirty_fields.iter().any(|f| f == field) {
            self.dirty_fields.push(field.to_string());
        }
        self.staged.insert(field.to_string(), value);
        Ok(self)
    }

    // --- Persistence ---

    /// Persists staged changes.
    ///
    /// New instances are checked against the create rules and inserted;
    /// existing ones against the update rules and updated. Every declared
    /// secondary index is rebuilt afterwards.
    pub async fn save(&mut self) -> Result<&mut Self> {
        self.ensure_not_deleted()?;
        let backend = self.db.backend()?;

        let was_new = self.is_new;
        let action = if was_new { Action::Create } else { Action::Update };
        self.enforce(action)?;

        let changeset = self.pending_payload();
        if was_new {
            T::on_before_create(self, &changeset).await?;
        } else {
            T::on_before_update(self, &changeset).await?;
        }

        // Hooks may have staged more changes.
        let payload = self.pending_payload();
        let table = self.db.table_for_type(T::TYPE_NAME);
        let data = serde_json::to_string(&payload)?;
        let now = now();

        if was_new {
            let row = Row::from([
                ("id".to_string(), Value::from(self.id())),
                ("type_name".to_string(), Value::from(T::TYPE_NAME)),
                ("visibility".to_string(), Value::from(1)),
                ("creator_id".to_string(), Value::from(self.creator_id())),
                ("data".to_string(), Value::String(data)),
                ("created_at".to_string(), timestamp(now)),
                ("updated_at".to_string(), timestamp(now)),
            ]);
            backend.insert(&table, vec![row]).await?;
            self.metadata.created_time = now;
        } else {
            let changes = Row::from([
                ("data".to_string(), Value::String(data)),
                ("updated_at".to_string(), timestamp(now)),
            ]);
            backend.update(&table, &self.row_filters(), changes).await?;
        }
        self.metadata.modified_time = now;

        self.is_new = false;
        self.data = payload;
        self.staged.clear();
        self.dirty_fields.clear();
        debug!(type_name = T::TYPE_NAME, id = %self.metadata.id, created = was_new, "saved object");

        self.rebuild_indexes(backend.as_ref()).await?;

        if was_new {
            T::on_after_create(self).await?;
        } else {
            T::on_after_update(self).await?;
        }
        Ok(self)
    }

    /// Removes the object and its index rows, then makes this instance inert.
    ///
    /// Never-saved instances are left untouched. Association rows pointing at
    /// the object are kept.
    pub async fn delete(&mut self) -> Result<()> {
        self.ensure_not_deleted()?;
        if self.is_new {
            return Ok(());
        }
        let backend = self.db.backend()?;

        self.enforce(Action::Delete)?;
        T::on_before_delete(self).await?;

        let table = self.db.table_for_type(T::TYPE_NAME);
        backend.delete(&table, &self.row_filters()).await?;
        delete_index_rows(backend.as_ref(), &self.descriptor, &[Value::from(self.id())]).await?;

        self.data = T::initial_value();
        self.staged.clear();
        self.dirty_fields.clear();
        self.is_deleted = true;
        debug!(type_name = T::TYPE_NAME, id = %self.metadata.id, "deleted object");
        Ok(())
    }

    // --- Statics ---

    /// Fails with `NotFound` when no readable object has this id.
    pub async fn get_by_id(db: &Database, id: &str, viewer: Option<&Viewer>) -> Result<Self> {
        Self::query_by_id(db, id, viewer).await?.ok_or_else(|| {
            GraphError::NotFound(format!(
                "no valid object of type {} found with ID '{}'",
                T::TYPE_NAME,
                id
            ))
        })
    }

    pub async fn query_by_id(
        db: &Database,
        id: &str,
        viewer: Option<&Viewer>,
    ) -> Result<Option<Self>> {
        IdQuery::<T>::new(db, id, viewer).fetch().await
    }

    /// Every readable object of this type. A full scan; prefer
    /// [`query_by`](Self::query_by) on an indexed field.
    pub async fn query_all(db: &Database, viewer: Option<&Viewer>) -> Result<Vec<Self>> {
        SelectAllQuery::<T>::new(db, viewer).fetch().await
    }

    /// Objects whose indexed `field` matches `query`.
    pub async fn query_by(
        db: &Database,
        field: &str,
        query: IndexQuery,
        viewer: Option<&Viewer>,
    ) -> Result<Vec<Self>> {
        IndexLookup::<T>::new(db, field, query, viewer)?
            .fetch()
            .await
    }

    /// Deletes the object with this id, if the viewer can see it.
    pub async fn delete_with_id(db: &Database, id: &str, viewer: Option<&Viewer>) -> Result<()> {
        if let Some(mut entity) = Self::query_by_id(db, id, viewer).await? {
            entity.delete().await?;
        }
        Ok(())
    }

    // --- Internals ---

    pub(crate) fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub(crate) fn ensure_not_deleted(&self) -> Result<()> {
        if self.is_deleted {
            return Err(GraphError::IllegalState(format!(
                "object with ID '{}' has been deleted",
                self.metadata.id
            )));
        }
        Ok(())
    }

    pub(crate) fn enforce(&self, action: Action) -> Result<()> {
        PermissionEvaluator::new(&self.descriptor.access_rules, action, self.viewer.as_ref())
            .enforce_can_perform_action(self)
    }

    pub(crate) fn can_read(&self) -> bool {
        PermissionEvaluator::new(&self.descriptor.access_rules, Action::Read, self.viewer.as_ref())
            .can_perform_action(self)
    }

    fn working_value(&self, field: &str) -> Option<&Value> {
        self.staged.get(field).or_else(|| self.data.get(field))
    }

    /// Persisted data overlaid with every dirty field.
    fn pending_payload(&self) -> Fields {
        let mut payload = self.data.clone();
        for field in &self.dirty_fields {
            if let Some(value) = self.staged.get(field) {
                payload.insert(field.clone(), value.clone());
            }
        }
        payload
    }

    fn row_filters(&self) -> [Filter; 2] {
        [
            Filter::eq("id", self.id()),
            Filter::eq("type_name", T::TYPE_NAME),
        ]
    }

    /// Delete-then-insert of every index row for this object.
    async fn rebuild_indexes(&self, backend: &dyn StorageBackend) -> Result<()> {
        let fields = self.descriptor.indexed_fields;
        if fields.is_empty() {
            return Ok(());
        }

        try_join_all(fields.iter().map(|field| async move {
            let table = tables::index_table(T::TYPE_NAME, field);
            backend.delete(&table, &[Filter::eq("id", self.id())]).await?;
            let row = Row::from([
                ("key".to_string(), self.data.get(*field).cloned().unwrap_or(Value::Null)),
                ("id".to_string(), Value::from(self.id())),
            ]);
            backend.insert(&table, vec![row]).await
        }))
        .await?;
        Ok(())
    }
}

impl<T: GraphType> RuleSubject for Entity<T> {
    fn id(&self) -> &str {
        &self.metadata.id
    }

    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn creator_id(&self) -> &str {
        &self.metadata.creator_id
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.working_value(name)
    }
}

impl<T: GraphType> fmt::Debug for Entity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type_name", &T::TYPE_NAME)
            .field("metadata", &self.metadata)
            .field("data", &self.data)
            .field("dirty_fields", &self.dirty_fields)
            .field("is_new", &self.is_new)
            .field("is_deleted", &self.is_deleted)
            .finish()
    }
}

/// Deletes object rows of `descriptor`'s type by id, together with their index rows.
pub(crate) async fn delete_objects(
    backend: &dyn StorageBackend,
    table: &str,
    descriptor: &TypeDescriptor,
    ids: &[Value],
) -> Result<()> {
    backend
        .delete(
            table,
            &[
                Filter::is_in("id", ids.to_vec()),
                Filter::eq("type_name", descriptor.type_name),
            ],
        )
        .await?;
    delete_index_rows(backend, descriptor, ids).await
}

pub(crate) async fn delete_index_rows(
    backend: &dyn StorageBackend,
    descriptor: &TypeDescriptor,
    ids: &[Value],
) -> Result<()> {
    try_join_all(descriptor.indexed_fields.iter().map(|field| async move {
        let table = tables::index_table(descriptor.type_name, field);
        backend.delete(&table, &[Filter::is_in("id", ids.to_vec())]).await
    }))
    .await?;
    Ok(())
}

/// Checks `viewer` against the delete rules of every stored object of
/// `descriptor`'s type among `ids`. Missing ids are skipped.
pub(crate) async fn authorize_cascade(
    db: &Database,
    backend: &dyn StorageBackend,
    descriptor: &TypeDescriptor,
    ids: &[Value],
    viewer: Option<&Viewer>,
) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let table = db.table_for_type(descriptor.type_name);
    let select = Select::from(table.as_str())
        .filter(Filter::is_in("id", ids.to_vec()))
        .filter(Filter::eq("type_name", descriptor.type_name));
    let evaluator = PermissionEvaluator::new(&descriptor.access_rules, Action::Delete, viewer);
    for row in backend.select(&select).await? {
        let object = StoredObject::from_row(descriptor.type_name, &row)?;
        evaluator.enforce_can_perform_action(&object)?;
    }
    Ok(())
}

/// A stored row seen through the rules of its type, without its Rust type.
struct StoredObject<'r> {
    type_name: &'static str,
    id: &'r str,
    creator_id: &'r str,
    data: Fields,
}

impl<'r> StoredObject<'r> {
    fn from_row(type_name: &'static str, row: &'r Row) -> Result<Self> {
        Ok(Self {
            type_name,
            id: column(row, "id")?,
            creator_id: column(row, "creator_id")?,
            data: serde_json::from_str(column(row, "data")?)?,
        })
    }
}

impl RuleSubject for StoredObject<'_> {
    fn id(&self) -> &str {
        self.id
    }

    fn type_name(&self) -> &str {
        self.type_name
    }

    fn creator_id(&self) -> &str {
        self.creator_id
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Current time at the millisecond precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub(crate) fn timestamp(time: DateTime<Utc>) -> Value {
    Value::String(time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn column<'r>(row: &'r Row, name: &str) -> Result<&'r str> {
    row.get(name).and_then(Value::as_str).ok_or_else(|| {
        GraphError::Serialization(format!("stored row is missing text column '{name}'"))
    })
}

fn parse_timestamp(row: &Row, name: &str) -> Result<DateTime<Utc>> {
    let raw = column(row, name)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| GraphError::Serialization(format!("invalid timestamp in '{name}': {e}")))
}
