//! Field validators.
//!
//! A type declares a [`DataType`] per field it wants checked. `Entity::set`
//! consults the validator before staging a value: valid values are staged
//! as-is, invalid values are replaced by the validator's [`DataType::coerce`]
//! substitute when it has one, and rejected otherwise.
//!
//! ```ignore
//! Validators::new()
//!     .field("title", StringType::new().non_null().max_length(64).auto_truncate())
//!     .field("priority", IntegerType::new().min(0).max(5))
//!     .field("status", EnumType::new().one_of(["open", "done"]).default_to("open"));
//! ```

mod boolean;
mod date_time;
mod enum_type;
mod number;
mod string;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub use boolean::BooleanType;
pub use date_time::DateTimeType;
pub use enum_type::EnumType;
pub use number::{FloatType, IntegerType};
pub use string::StringType;

/// A field-level value validator.
///
/// `Display` renders a short summary such as `string, non-null, max-length=10`.
pub trait DataType: fmt::Display + Send + Sync {
    fn is_valid(&self, value: &Value) -> bool;

    /// The value to store for `value`: the value itself when valid, otherwise
    /// whatever this validator substitutes (a default, a truncation, or null).
    fn validated_value(&self, value: &Value) -> Value;

    /// Substitute for an invalid value that `set` may stage instead of failing.
    fn coerce(&self, _value: &Value) -> Option<Value> {
        None
    }

    /// Storage type hint, e.g. `string`, `integer`, `timestamp`.
    fn db_type(&self) -> &'static str;
}

/// Validators keyed by field name.
#[derive(Clone, Default)]
pub struct Validators {
    fields: BTreeMap<String, Arc<dyn DataType>>,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, validator: impl DataType + 'static) -> Self {
        self.fields.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn DataType> {
        self.fields.get(name).map(|v| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn DataType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|(k, v)| (k, v.to_string())))
            .finish()
    }
}

/// Joins summary parts the way every validator's `Display` does.
fn write_summary(f: &mut fmt::Formatter<'_>, parts: &[String]) -> fmt::Result {
    f.write_str(&parts.join(", "))
}

fn nullability(non_null: bool) -> String {
    let label = if non_null { "non-null" } else { "nullable" };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validators_lookup_by_field() {
        let validators = Validators::new()
            .field("title", StringType::new().non_null())
            .field("done", BooleanType::new());

        assert_eq!(validators.len(), 2);
        assert!(validators.get("title").is_some());
        assert!(validators.get("missing").is_none());
        assert!(!validators.get("title").unwrap().is_valid(&Value::Null));
        assert!(validators.get("done").unwrap().is_valid(&json!(true)));

        let names: Vec<&str> = validators.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["done", "title"]);
    }

    #[test]
    fn debug_lists_summaries() {
        let validators = Validators::new().field("done", BooleanType::new().non_null());
        assert_eq!(format!("{validators:?}"), r#"{"done": "boolean, non-null"}"#);
    }
}
