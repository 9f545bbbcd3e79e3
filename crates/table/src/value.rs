use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single typed cell.
///
/// `Display` renders the canonical text form used for hashing, pattern
/// detection and value histograms. `Null` renders as the empty string, and
/// whole floats print without a fractional part so `Int(100)` and
/// `Float(100.0)` share a canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell, for Int and Float only.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The dtype a single non-null cell belongs to. `None` for Null.
    pub fn dtype(&self) -> Option<DType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DType::Boolean),
            Value::Int(_) => Some(DType::Integer),
            Value::Float(_) => Some(DType::Decimal),
            Value::Text(_) => Some(DType::String),
            Value::DateTime(_) => Some(DType::Datetime),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Column type classes reported by schema inference and profiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Integer,
    Decimal,
    Boolean,
    Datetime,
    String,
}

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Integer => "integer",
            DType::Decimal => "decimal",
            DType::Boolean => "boolean",
            DType::Datetime => "datetime",
            DType::String => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Integer | DType::Decimal)
    }

    /// Narrowest class covering both. Integer widens to decimal; any other
    /// disagreement falls back to string.
    pub fn unify(self, other: DType) -> DType {
        match (self, other) {
            (a, b) if a == b => a,
            (DType::Integer, DType::Decimal) | (DType::Decimal, DType::Integer) => DType::Decimal,
            _ => DType::String,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
