//! Row, filter and select shapes shared by every backend.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

/// A table row: column name to value.
pub type Row = BTreeMap<String, Value>;

/// A column predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(Value),
    /// Membership in a set of values.
    In(Vec<Value>),
    /// Inclusive range over numbers or strings.
    Between(Value, Value),
    /// SQL `LIKE` pattern: `%` matches any run, `_` one character, ASCII case-insensitive.
    Like(String),
}

impl Predicate {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Predicate::Equals(expected) => same(value, expected),
            Predicate::In(options) => options.iter().any(|option| same(value, option)),
            Predicate::Between(low, high) => {
                matches!(
                    compare(value, low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(compare(value, high), Some(Ordering::Less | Ordering::Equal))
            }
            Predicate::Like(pattern) => match value {
                Value::String(text) => like(text, pattern),
                Value::Number(n) => like(&n.to_string(), pattern),
                Value::Bool(b) => like(&b.to_string(), pattern),
                _ => false,
            },
        }
    }
}

/// A filter on one column. Columns may be qualified as `table.column`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub predicate: Predicate,
}

impl Filter {
    pub fn new(column: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            column: column.into(),
            predicate,
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Predicate::Equals(value.into()))
    }

    pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(column, Predicate::In(values))
    }

    pub fn between(column: impl Into<String>, low: Value, high: Value) -> Self {
        Self::new(column, Predicate::Between(low, high))
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, Predicate::Like(pattern.into()))
    }
}

/// Inner join of the base table against `table` on `base_column = joined_column`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub base_column: String,
    pub joined_column: String,
}

/// A read against one table, optionally inner-joined to a second one.
///
/// Backends return the base table's columns for every surviving combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub join: Option<Join>,
    pub filters: Vec<Filter>,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            join: None,
            filters: Vec::new(),
        }
    }

    pub fn inner_join(
        mut self,
        table: impl Into<String>,
        base_column: impl Into<String>,
        joined_column: impl Into<String>,
    ) -> Self {
        self.join = Some(Join {
            table: table.into(),
            base_column: base_column.into(),
            joined_column: joined_column.into(),
        });
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// Equality with numbers compared by value, so `30` matches `30.0`.
fn same(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => compare(left, right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();

    // Backtracking matcher; `star` remembers the last `%` and the text position it consumed up to.
    let (mut t, mut p) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}
