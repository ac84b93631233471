use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use super::registry::{TypeDescriptor, TypeRegistry};
use super::tables;
use crate::config::{DatabaseConfig, LogLevel, StorageMode};
use crate::entity::GraphType;
use crate::error::{GraphError, Result};
use crate::ids::{IdGenerator, UuidV7Generator};
use crate::logging;
use crate::storage::{StorageBackend, TableSchema};

const UNINITIALISED: u8 = 0;
const READY: u8 = 1;
const CLOSED: u8 = 2;

/// Lifecycle of a [`Database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseState {
    Uninitialised,
    Ready,
    Closed,
}

struct DatabaseInner {
    config: DatabaseConfig,
    backend: Arc<dyn StorageBackend>,
    ids: Arc<dyn IdGenerator>,
    registry: TypeRegistry,
    state: AtomicU8,
}

/// Handle to a configured graph database.
///
/// Cheap to clone; clones share the backend, the type registry and the
/// lifecycle state. Every entity and query holds one.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.inner.config)
            .field("types", &self.inner.registry.len())
            .field("state", &self.state())
            .finish()
    }
}

impl Database {
    pub fn builder(backend: Arc<dyn StorageBackend>) -> DatabaseBuilder {
        DatabaseBuilder::new(backend)
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.inner.config
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.inner.config.storage_mode
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    pub fn state(&self) -> DatabaseState {
        match self.inner.state.load(Ordering::Acquire) {
            READY => DatabaseState::Ready,
            CLOSED => DatabaseState::Closed,
            _ => DatabaseState::Uninitialised,
        }
    }

    /// Creates every missing table and makes the database ready for use.
    pub async fn initialise(&self) -> Result<()> {
        if self.state() == DatabaseState::Closed {
            return Err(GraphError::IllegalState(
                "database connection has been closed".into(),
            ));
        }

        self.create_table_if_absent(tables::object_table_schema(tables::OBJECTS))
            .await?;
        self.create_table_if_absent(tables::associations_schema())
            .await?;

        let index_tables = self.inner.registry.iter().flat_map(|descriptor| {
            descriptor
                .indexed_fields
                .iter()
                .map(|field| tables::index_table(descriptor.type_name, field))
        });
        try_join_all(index_tables.map(|name| {
            self.create_table_if_absent(tables::index_table_schema(&name))
        }))
        .await?;

        if self.storage_mode() == StorageMode::MultiTable {
            try_join_all(self.inner.registry.iter().map(|descriptor| {
                self.create_table_if_absent(tables::object_table_schema(descriptor.type_name))
            }))
            .await?;
        }

        self.inner.state.store(READY, Ordering::Release);
        Ok(())
    }

    /// Releases the storage connection. Storage access afterwards fails.
    pub async fn close(&self) -> Result<()> {
        self.inner.state.store(CLOSED, Ordering::Release);
        self.inner.backend.close().await?;
        Ok(())
    }

    /// Object table for a type under the configured storage mode.
    pub fn table_for_type(&self, type_name: &str) -> String {
        match self.storage_mode() {
            StorageMode::SingleTable => tables::OBJECTS.to_string(),
            StorageMode::MultiTable => type_name.to_string(),
        }
    }

    pub fn descriptor(&self, type_name: &str) -> Result<Arc<TypeDescriptor>> {
        self.inner.registry.get(type_name)
    }

    pub fn generate_id(&self) -> String {
        self.inner.ids.generate()
    }

    /// The backend, if the database is ready.
    pub(crate) fn backend(&self) -> Result<Arc<dyn StorageBackend>> {
        match self.state() {
            DatabaseState::Ready => Ok(self.inner.backend.clone()),
            DatabaseState::Uninitialised => Err(GraphError::IllegalState(
                "database has not been initialised; call initialise() first".into(),
            )),
            DatabaseState::Closed => Err(GraphError::IllegalState(
                "database connection has been closed".into(),
            )),
        }
    }

    async fn create_table_if_absent(&self, schema: TableSchema) -> Result<()> {
        let backend = &self.inner.backend;
        if backend.has_table(&schema.name).await? {
            debug!(table = %schema.name, "required table exists");
            return Ok(());
        }
        backend.create_table(&schema).await?;
        info!(table = %schema.name, "created database table");
        Ok(())
    }
}

/// Collects configuration and types, then builds a [`Database`].
pub struct DatabaseBuilder {
    backend: Arc<dyn StorageBackend>,
    config: DatabaseConfig,
    ids: Arc<dyn IdGenerator>,
    descriptors: Vec<TypeDescriptor>,
}

impl DatabaseBuilder {
    fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            config: DatabaseConfig::default(),
            ids: Arc::new(UuidV7Generator),
            descriptors: Vec::new(),
        }
    }

    pub fn config(mut self, config: DatabaseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.config.storage_mode = mode;
        self
    }

    pub fn minimum_log_level(mut self, level: LogLevel) -> Self {
        self.config.minimum_log_level = level;
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn register<T: GraphType>(mut self) -> Self {
        self.descriptors.push(TypeDescriptor::of::<T>());
        self
    }

    pub fn build(self) -> Result<Database> {
        if self.config.install_log_subscriber {
            logging::init(self.config.minimum_log_level);
        }

        let mut registry = TypeRegistry::new();
        for descriptor in self.descriptors {
            let type_name = descriptor.type_name;
            registry.register(descriptor)?;
            info!(type_name, "registered type");
        }
        registry.check_edges()?;

        Ok(Database {
            inner: Arc::new(DatabaseInner {
                config: self.config,
                backend: self.backend,
                ids: self.ids,
                registry,
                state: AtomicU8::new(UNINITIALISED),
            }),
        })
    }
}
