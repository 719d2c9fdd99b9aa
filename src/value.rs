use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A single cell of a table
///
/// Every cell is converted into one of these variants once, at ingestion time,
/// so later stages only ever match on a closed set of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Absent or explicitly empty
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric measurement (may be non-finite when supplied directly)
    Number(f64),
    /// Free text or label
    Text(String),
}

/// Shared null for lookups that miss
pub(crate) static NULL: Value = Value::Null;

impl Value {
    /// Parse a raw textual cell (CSV, spreadsheet string) into a tagged value
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_null_token(trimmed) {
            return Value::Null;
        }
        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return Value::Number(number);
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        Value::Text(trimmed.to_string())
    }

    /// Check whether the value is absent
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Finite numeric payload, only for `Number`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(x) if x.is_finite() => Some(*x),
            _ => None,
        }
    }

    /// Numeric payload, also accepting text that parses to a finite number
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Value::Number(x) if x.is_finite() => Some(*x),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            _ => None,
        }
    }

    /// Whether this is a finite `Number` with no fractional part
    pub fn is_integral(&self) -> bool {
        self.as_f64().map_or(false, |x| x.fract() == 0.0)
    }

    /// Whether this is text that would parse as a number
    pub fn is_numeric_text(&self) -> bool {
        matches!(self, Value::Text(_)) && self.coerce_f64().is_some()
    }

    /// Stringified form used for category matching and grouping
    pub fn to_key(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(x) if *x == 0.0 => "0".to_string(),
            Value::Number(x) => x.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

fn is_null_token(s: &str) -> bool {
    ["nan", "null", "none"]
        .iter()
        .any(|token| s.eq_ignore_ascii_case(token))
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            other => write!(f, "{}", other.to_key()),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Number(x as f64)
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Number(x as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            nested => Value::Text(nested.to_string()),
        }
    }
}
