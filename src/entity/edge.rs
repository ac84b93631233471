use std::collections::BTreeMap;

use super::{Entity, GraphType};

/// How an edge is declared on a type.
///
/// ```ignore
/// EdgeConfigs::new()
///     .edge("items", EdgeConfig::to::<TodoItem>())
///     .edge("friends", EdgeConfig::to::<User>().undirected())
///     .edge("owner", EdgeConfig::to::<User>().stored_in("owner_id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfig {
    connected_type: &'static str,
    undirected: bool,
    one_to_one: bool,
    connected_id_field: Option<&'static str>,
}

impl EdgeConfig {
    pub fn to<C: GraphType>() -> Self {
        Self {
            connected_type: C::TYPE_NAME,
            undirected: false,
            one_to_one: false,
            connected_id_field: None,
        }
    }

    /// Store a mirrored row for every link, so the edge reads the same from both ends.
    pub fn undirected(mut self) -> Self {
        self.undirected = true;
        self
    }

    /// At most one connected object.
    pub fn one_to_one(mut self) -> Self {
        self.one_to_one = true;
        self
    }

    /// Keep the connected id in a field of the source instead of the
    /// association table. Implies one-to-one.
    pub fn stored_in(mut self, field: &'static str) -> Self {
        self.one_to_one = true;
        self.connected_id_field = Some(field);
        self
    }

    pub fn connected_type(&self) -> &'static str {
        self.connected_type
    }

    pub fn is_undirected(&self) -> bool {
        self.undirected
    }

    pub fn is_one_to_one(&self) -> bool {
        self.one_to_one
    }

    pub fn connected_id_field(&self) -> Option<&'static str> {
        self.connected_id_field
    }

    /// The backing field, when this edge is field-backed.
    pub(crate) fn backing_field(&self) -> Option<&'static str> {
        self.connected_id_field.filter(|_| self.one_to_one)
    }
}

/// Named edge declarations of one type.
#[derive(Debug, Clone, Default)]
pub struct EdgeConfigs {
    edges: BTreeMap<&'static str, EdgeConfig>,
}

impl EdgeConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge(mut self, name: &'static str, config: EdgeConfig) -> Self {
        self.edges.insert(name, config);
        self
    }

    pub fn get(&self, name: &str) -> Option<&EdgeConfig> {
        self.edges.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &EdgeConfig)> {
        self.edges.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Anything that names an entity by id: ids themselves or loaded entities.
pub trait AsEntityId {
    fn entity_id(&self) -> &str;
}

impl AsEntityId for str {
    fn entity_id(&self) -> &str {
        self
    }
}

impl AsEntityId for String {
    fn entity_id(&self) -> &str {
        self
    }
}

impl<C: GraphType> AsEntityId for Entity<C> {
    fn entity_id(&self) -> &str {
        self.id()
    }
}

impl<A: AsEntityId + ?Sized> AsEntityId for &A {
    fn entity_id(&self) -> &str {
        (**self).entity_id()
    }
}

impl<A: AsEntityId + ?Sized> AsEntityId for &mut A {
    fn entity_id(&self) -> &str {
        (**self).entity_id()
    }
}
