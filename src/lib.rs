pub mod access_control;
pub mod client;
pub mod config;
pub mod data_types;
pub mod entity;
pub mod error;
pub mod ids;
pub mod logging;
pub mod query;
pub mod storage;

pub use access_control::{
    rules, AccessRules, Action, Decision, PermissionEvaluator, Rule, RuleSubject, Viewer,
    ViewerBuilder,
};
pub use client::{Database, DatabaseBuilder, DatabaseState, TypeDescriptor, TypeRegistry};
pub use config::{DatabaseConfig, LogLevel, StorageMode};
pub use data_types::{
    BooleanType, DataType, DateTimeType, EnumType, FloatType, IntegerType, StringType, Validators,
};
pub use entity::{AsEntityId, EdgeConfig, EdgeConfigs, Entity, Fields, GraphType, Metadata};
pub use error::{GraphError, Result};
pub use ids::{IdGenerator, UuidV7Generator};
pub use query::{EdgeQuery, IdQuery, IndexLookup, IndexQuery, SelectAllQuery};
pub use storage::{InMemoryBackend, StorageBackend, StorageError};

// Re-exported so implementors of GraphType don't need their own dependency.
pub use async_trait::async_trait;
pub use serde_json::Value;
