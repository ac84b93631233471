use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{EdgeConfigs, Entity};
use crate::access_control::AccessRules;
use crate::data_types::Validators;
use crate::error::Result;

/// A field payload: field name to JSON value.
pub type Fields = Map<String, Value>;

/// Per-type behaviour of an entity type.
///
/// Implemented by a marker type; instances are [`Entity<Self>`]. Everything
/// except `TYPE_NAME` and `initial_value` has an empty default.
///
/// ```ignore
/// struct TodoItem;
///
/// #[async_trait]
/// impl GraphType for TodoItem {
///     const TYPE_NAME: &'static str = "TodoItem";
///
///     fn initial_value() -> Fields {
///         fields! { "title" => "", "is_completed" => false }
///     }
///
///     fn indexed_fields() -> &'static [&'static str] {
///         &["title"]
///     }
/// }
/// ```
///
/// Hooks run inside `save()` / `delete()`. Before-hooks get the tentative
/// changeset and may edit the entity further; those edits are persisted too.
/// An error from a before-hook aborts the operation before storage is
/// touched. After-hooks run once the write has happened, and their errors do
/// not undo it.
#[async_trait]
pub trait GraphType: Send + Sync + Sized + 'static {
    /// Unique name of the type. Stored in `type_name` and used for table names.
    const TYPE_NAME: &'static str;

    /// Field values of a freshly created instance.
    fn initial_value() -> Fields;

    fn validators() -> Validators {
        Validators::new()
    }

    fn edges() -> EdgeConfigs {
        EdgeConfigs::new()
    }

    /// Fields that get a secondary index and can be used with `query_by`.
    fn indexed_fields() -> &'static [&'static str] {
        &[]
    }

    fn access_rules() -> AccessRules {
        AccessRules::new()
    }

    async fn on_before_create(_entity: &mut Entity<Self>, _changeset: &Fields) -> Result<()> {
        Ok(())
    }

    async fn on_after_create(_entity: &mut Entity<Self>) -> Result<()> {
        Ok(())
    }

    async fn on_before_update(_entity: &mut Entity<Self>, _changeset: &Fields) -> Result<()> {
        Ok(())
    }

    async fn on_after_update(_entity: &mut Entity<Self>) -> Result<()> {
        Ok(())
    }

    async fn on_before_delete(_entity: &mut Entity<Self>) -> Result<()> {
        Ok(())
    }
}

/// Builds a [`Fields`] map from `key => value` pairs.
#[macro_export]
macro_rules! fields {
    () => { $crate::entity::Fields::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::entity::Fields::new();
        $( map.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        map
    }};
}
