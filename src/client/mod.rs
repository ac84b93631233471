//! Client - the database handle, its type registry and table layout.
//!
//! A [`Database`] is built once from a backend, a configuration and the set of
//! entity types it serves. `initialise()` creates whatever tables are missing;
//! until then (and after `close()`) every storage access fails with
//! `IllegalState`.
//!
//! ```text
//! Database::builder(backend)
//!     .register::<TodoItem>()        ┌──────────────┐
//!     .register::<TodoList>()  ───►  │ TypeRegistry │  name -> TypeDescriptor
//!     .build()?                      └──────────────┘
//!     .initialise().await?      ───►  objects, associations,
//!                                     index__{type}__{field}, [per-type tables]
//! ```

mod database;
mod registry;
pub mod tables;

pub use database::{Database, DatabaseBuilder, DatabaseState};
pub use registry::{TypeDescriptor, TypeRegistry};
