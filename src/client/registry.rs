use std::any::TypeId;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::access_control::AccessRules;
use crate::data_types::Validators;
use crate::entity::{EdgeConfigs, GraphType};
use crate::error::{GraphError, Result};

/// Everything the layer needs to know about a registered type, captured once
/// at registration.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub type_name: &'static str,
    pub validators: Validators,
    pub edges: EdgeConfigs,
    pub indexed_fields: &'static [&'static str],
    pub access_rules: AccessRules,
    type_id: TypeId,
}

impl TypeDescriptor {
    pub fn of<T: GraphType>() -> Self {
        Self {
            type_name: T::TYPE_NAME,
            validators: T::validators(),
            edges: T::edges(),
            indexed_fields: T::indexed_fields(),
            access_rules: T::access_rules(),
            type_id: TypeId::of::<T>(),
        }
    }

    pub fn is_indexed(&self, field: &str) -> bool {
        self.indexed_fields.contains(&field)
    }
}

/// Type name to descriptor. Written by the database builder, read-only afterwards.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: BTreeMap<&'static str, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same Rust type twice is a no-op. A different type
    /// claiming an already registered name is an error.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        if let Some(existing) = self.types.get(descriptor.type_name) {
            if existing.type_id == descriptor.type_id {
                return Ok(());
            }
            return Err(GraphError::IllegalState(format!(
                "type name {} is registered by two different types",
                descriptor.type_name
            )));
        }
        self.types
            .insert(descriptor.type_name, Arc::new(descriptor));
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Result<Arc<TypeDescriptor>> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| GraphError::TypeNotRegistered(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values().map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every edge must point at a registered type.
    pub(crate) fn check_edges(&self) -> Result<()> {
        for descriptor in self.iter() {
            for (name, edge) in descriptor.edges.iter() {
                if !self.contains(edge.connected_type()) {
                    return Err(GraphError::InvalidEdge(format!(
                        "edge '{}' on type {} connects to unregistered type {}",
                        name,
                        descriptor.type_name,
                        edge.connected_type()
                    )));
                }
            }
        }
        Ok(())
    }
}
