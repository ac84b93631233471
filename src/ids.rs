//! Identifier generation.

use uuid::Uuid;

/// Produces globally unique, time-sortable string identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// UUIDv7 identifiers: the leading 48 bits are a millisecond timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> String {
        Uuid::now_v7().to_string()
    }
}
