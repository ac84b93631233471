use std::fmt;

use serde_json::Value;

use super::{nullability, write_summary, DataType};

/// A string restricted to a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct EnumType {
    options: Vec<String>,
    non_null: bool,
    default: Option<String>,
}

impl EnumType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn one_of<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    pub fn default_to(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl DataType for EnumType {
    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::Null => !self.non_null,
            Value::String(s) => self.options.iter().any(|o| o == s),
            _ => false,
        }
    }

    fn validated_value(&self, value: &Value) -> Value {
        if self.is_valid(value) {
            return value.clone();
        }
        self.default
            .as_ref()
            .map(|d| Value::String(d.clone()))
            .unwrap_or(Value::Null)
    }

    fn db_type(&self) -> &'static str {
        "string"
    }
}

impl fmt::Display for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec!["enum".to_string(), nullability(self.non_null)];
        if let Some(default) = self.default.as_deref().filter(|d| !d.is_empty()) {
            parts.push(format!("default={default}"));
        }
        parts.push(format!("options={}", self.options.join("|")));
        write_summary(f, &parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> EnumType {
        EnumType::new().one_of(["Option A", "Option B", "Option C"])
    }

    #[test]
    fn accepts_and_returns_options() {
        let validator = validator();
        for option in validator.options().to_vec() {
            assert!(validator.is_valid(&json!(option)));
            assert_eq!(validator.validated_value(&json!(option)), json!(option));
        }
    }

    #[test]
    fn rejects_unknown_values() {
        let validator = validator();
        assert!(!validator.is_valid(&json!("Option D")));
        assert_eq!(validator.validated_value(&json!("Option D")), Value::Null);
    }

    #[test]
    fn null_handling_and_default() {
        assert!(validator().is_valid(&Value::Null));
        let strict = validator().non_null().default_to("Option A");
        assert!(!strict.is_valid(&Value::Null));
        assert_eq!(strict.validated_value(&Value::Null), json!("Option A"));
    }

    #[test]
    fn summary() {
        assert_eq!(validator().db_type(), "string");
        assert_eq!(
            validator().non_null().to_string(),
            "enum, non-null, options=Option A|Option B|Option C"
        );
    }
}
