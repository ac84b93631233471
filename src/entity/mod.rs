//! Entities - typed objects, their lifecycle and their edges.
//!
//! An entity type is a marker type implementing [`GraphType`]; its instances
//! are [`Entity<T>`]. Field writes are staged and committed by `save()`:
//!
//! ```text
//!            set()                 save()
//!  data ───────────► staged ──────────────────────────────► data
//!  (persisted)       + dirty      rules → before hook →
//!                    fields       write row → rebuild indexes →
//!                                 after hook
//! ```
//!
//! Edges connect an entity to others, either through rows in the shared
//! association table or through an id stored in one of its own fields.

mod edge;
mod edges;
mod entity;
mod graph_type;

pub use edge::{AsEntityId, EdgeConfig, EdgeConfigs};
pub use entity::{Entity, Metadata};
pub use graph_type::{Fields, GraphType};
