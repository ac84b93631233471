use std::fmt;

use serde_json::Value;

use super::{nullability, write_summary, DataType};

#[derive(Debug, Clone, Default)]
pub struct BooleanType {
    non_null: bool,
    default: Option<bool>,
}

impl BooleanType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    pub fn default_to(mut self, value: bool) -> Self {
        self.default = Some(value);
        self
    }
}

impl DataType for BooleanType {
    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::Null => !self.non_null,
            Value::Bool(_) => true,
            _ => false,
        }
    }

    fn validated_value(&self, value: &Value) -> Value {
        if !self.is_valid(value) || value.is_null() {
            return self.default.map(Value::Bool).unwrap_or(Value::Null);
        }
        value.clone()
    }

    fn db_type(&self) -> &'static str {
        "boolean"
    }
}

impl fmt::Display for BooleanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec!["boolean".to_string(), nullability(self.non_null)];
        if self.default == Some(true) {
            parts.push("default=true".to_string());
        }
        write_summary(f, &parts)
    }
}
