use std::fmt;

use serde_json::Value;

use super::{nullability, write_summary, DataType};

#[derive(Debug, Clone, Default)]
pub struct StringType {
    non_null: bool,
    non_empty: bool,
    max_length: Option<usize>,
    auto_truncate: bool,
    default: Option<String>,
}

impl StringType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    /// Reject empty and whitespace-only strings (and null).
    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    /// Maximum length in characters.
    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Cut over-long values down to the maximum length instead of rejecting them.
    pub fn auto_truncate(mut self) -> Self {
        self.auto_truncate = true;
        self
    }

    /// A default also makes null invalid; `validated_value(null)` yields the default.
    pub fn default_to(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn truncated(&self, value: &Value) -> Option<Value> {
        let (Some(max), Value::String(text)) = (self.max_length, value) else {
            return None;
        };
        if !self.auto_truncate || text.chars().count() <= max {
            return None;
        }
        Some(Value::String(text.chars().take(max).collect()))
    }
}

impl DataType for StringType {
    fn is_valid(&self, value: &Value) -> bool {
        let text = match value {
            Value::Null => {
                return !(self.non_null || self.default.is_some() || self.non_empty);
            }
            Value::String(text) => text,
            _ => return false,
        };

        if self.non_empty && text.trim().is_empty() {
            return false;
        }
        match self.max_length {
            Some(max) if max > 0 => text.chars().count() <= max,
            _ => true,
        }
    }

    fn validated_value(&self, value: &Value) -> Value {
        if self.is_valid(value) {
            return value.clone();
        }
        if let Some(truncated) = self.truncated(value) {
            return truncated;
        }
        if let Some(default) = &self.default {
            return Value::String(default.clone());
        }
        if self.non_null {
            return Value::String(String::new());
        }
        Value::Null
    }

    fn coerce(&self, value: &Value) -> Option<Value> {
        self.truncated(value).filter(|v| self.is_valid(v))
    }

    fn db_type(&self) -> &'static str {
        "string"
    }
}

impl fmt::Display for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec!["string".to_string(), nullability(self.non_null)];
        if let Some(default) = self.default.as_deref().filter(|d| !d.is_empty()) {
            parts.push(format!("default={default}"));
        }
        if self.non_empty {
            parts.push("non-empty".to_string());
        }
        if let Some(max) = self.max_length.filter(|m| *m > 0) {
            parts.push(format!("max-length={max}"));
        }
        write_summary(f, &parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_default_value() {
        let validator = StringType::new().default_to("abc");
        assert_eq!(validator.validated_value(&Value::Null), json!("abc"));
        assert_eq!(validator.validated_value(&json!("def")), json!("def"));
        assert_eq!(validator.validated_value(&json!("")), json!(""));
    }

    #[test]
    fn handles_empty_strings() {
        let validator = StringType::new().non_empty();
        assert!(!validator.is_valid(&json!("")));
        assert!(!validator.is_valid(&json!("   ")));
        assert!(!validator.is_valid(&Value::Null));
        assert!(validator.is_valid(&json!("abc")));
    }

    #[test]
    fn handles_null_values() {
        let validator = StringType::new().non_null();
        assert!(!validator.is_valid(&Value::Null));
        assert!(validator.is_valid(&json!("")));
        assert!(validator.is_valid(&json!("abc")));
        assert_eq!(validator.validated_value(&Value::Null), json!(""));
    }

    #[test]
    fn rejects_non_strings() {
        let validator = StringType::new();
        assert!(!validator.is_valid(&json!(5)));
        assert!(!validator.is_valid(&json!(true)));
        assert_eq!(validator.validated_value(&json!(5)), Value::Null);
    }

    #[test]
    fn handles_max_length() {
        let validator = StringType::new().max_length(5);
        assert!(validator.is_valid(&Value::Null));
        assert!(validator.is_valid(&json!("")));
        assert!(validator.is_valid(&json!("abc")));
        assert!(!validator.is_valid(&json!("abcdef")));
        assert_eq!(validator.coerce(&json!("abcdef")), None);
    }

    #[test]
    fn truncates_when_asked() {
        let validator = StringType::new().max_length(5).auto_truncate();
        assert_eq!(validator.validated_value(&json!("abc")), json!("abc"));
        assert_eq!(validator.validated_value(&json!("abcde")), json!("abcde"));
        assert_eq!(validator.validated_value(&json!("abcdef")), json!("abcde"));
        assert_eq!(validator.coerce(&json!("abcdef")), Some(json!("abcde")));
    }

    #[test]
    fn summary() {
        assert_eq!(StringType::new().db_type(), "string");
        assert_eq!(StringType::new().to_string(), "string, nullable");
        assert_eq!(
            StringType::new().non_null().non_empty().max_length(10).to_string(),
            "string, non-null, non-empty, max-length=10"
        );
        assert_eq!(
            StringType::new().default_to("x").to_string(),
            "string, nullable, default=x"
        );
    }
}
