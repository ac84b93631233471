use std::fmt;

use serde_json::{Number, Value};

use super::{nullability, write_summary, DataType};

/// Bounds and default shared by the integer and float validators.
#[derive(Debug, Clone, Default)]
struct NumberRules {
    non_null: bool,
    min: Option<f64>,
    max: Option<f64>,
    default: Option<f64>,
}

impl NumberRules {
    fn check(&self, value: &Value, integral: bool) -> bool {
        let n = match value {
            Value::Null => return !self.non_null,
            Value::Number(n) => n,
            _ => return false,
        };
        let Some(x) = n.as_f64().filter(|x| x.is_finite()) else {
            return false;
        };
        if integral && !(n.is_i64() || n.is_u64() || x.fract() == 0.0) {
            return false;
        }
        if self.max.is_some_and(|max| x > max) {
            return false;
        }
        if self.min.is_some_and(|min| x < min) {
            return false;
        }
        true
    }

    fn summary(&self, db_type: &str) -> Vec<String> {
        let mut parts = vec![db_type.to_string(), nullability(self.non_null)];
        for (label, bound) in [("default", self.default), ("min", self.min), ("max", self.max)] {
            if let Some(v) = bound.filter(|v| *v != 0.0) {
                parts.push(format!("{label}={v}"));
            }
        }
        parts
    }
}

fn float_value(x: f64) -> Value {
    Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
}

fn integer_value(x: f64) -> Value {
    Value::Number(Number::from(x as i64))
}

/// Whole numbers; fractional values are invalid.
#[derive(Debug, Clone, Default)]
pub struct IntegerType {
    rules: NumberRules,
}

impl IntegerType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_null(mut self) -> Self {
        self.rules.non_null = true;
        self
    }

    pub fn min(mut self, value: i64) -> Self {
        self.rules.min = Some(value as f64);
        self
    }

    pub fn max(mut self, value: i64) -> Self {
        self.rules.max = Some(value as f64);
        self
    }

    pub fn default_to(mut self, value: i64) -> Self {
        self.rules.default = Some(value as f64);
        self
    }
}

impl DataType for IntegerType {
    fn is_valid(&self, value: &Value) -> bool {
        self.rules.check(value, true)
    }

    fn validated_value(&self, value: &Value) -> Value {
        if !self.is_valid(value) {
            return self.rules.default.map(integer_value).unwrap_or(Value::Null);
        }
        match value.as_f64() {
            Some(x) if !(value.is_i64() || value.is_u64()) => integer_value(x),
            _ => value.clone(),
        }
    }

    fn db_type(&self) -> &'static str {
        "integer"
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, &self.rules.summary(self.db_type()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FloatType {
    rules: NumberRules,
}

impl FloatType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_null(mut self) -> Self {
        self.rules.non_null = true;
        self
    }

    pub fn min(mut self, value: f64) -> Self {
        self.rules.min = Some(value);
        self
    }

    pub fn max(mut self, value: f64) -> Self {
        self.rules.max = Some(value);
        self
    }

    pub fn default_to(mut self, value: f64) -> Self {
        self.rules.default = Some(value);
        self
    }
}

impl DataType for FloatType {
    fn is_valid(&self, value: &Value) -> bool {
        self.rules.check(value, false)
    }

    fn validated_value(&self, value: &Value) -> Value {
        if !self.is_valid(value) {
            return self.rules.default.map(float_value).unwrap_or(Value::Null);
        }
        value.clone()
    }

    fn db_type(&self) -> &'static str {
        "float"
    }
}

impl fmt::Display for FloatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, &self.rules.summary(self.db_type()))
    }
}
