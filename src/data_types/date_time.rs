use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::{nullability, write_summary, DataType};

/// Timestamps stored as RFC 3339 strings.
#[derive(Debug, Clone, Default)]
pub struct DateTimeType {
    non_null: bool,
    default: Option<DateTime<Utc>>,
}

impl DateTimeType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    pub fn default_to(mut self, value: DateTime<Utc>) -> Self {
        self.default = Some(value);
        self
    }

    fn default_value(&self) -> Value {
        self.default
            .map(|d| Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .unwrap_or(Value::Null)
    }
}

impl DataType for DateTimeType {
    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::Null => !self.non_null,
            Value::String(s) => DateTime::parse_from_rfc3339(s).is_ok(),
            _ => false,
        }
    }

    fn validated_value(&self, value: &Value) -> Value {
        if !self.is_valid(value) || value.is_null() {
            return self.default_value();
        }
        value.clone()
    }

    fn db_type(&self) -> &'static str {
        "timestamp"
    }
}

impl fmt::Display for DateTimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec!["datetime".to_string(), nullability(self.non_null)];
        if let Some(default) = self.default {
            parts.push(format!("default={}", default.to_rfc3339()));
        }
        write_summary(f, &parts)
    }
}
