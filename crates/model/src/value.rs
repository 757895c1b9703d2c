use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The date format used for SQL date literals.
const SQL_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// The plain-text date format, matching how a date prints outside of SQL
/// quoting (month/day/year with a 12-hour clock).
const TEXT_DATE_FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";

/// A scalar carried by a condition or constant expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Timestamp(NaiveDateTime),
    Json(serde_json::Value),
    Null,
}

impl Value {
    /// The value's plain text form without any SQL quoting, e.g. for
    /// interpolation into a LIKE pattern.
    pub fn raw_text(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Boolean(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::Timestamp(v) => v.format(TEXT_DATE_FORMAT).to_string(),
            Value::Json(v) => v.to_string(),
            Value::Null => "NULL".to_string(),
        }
    }
}

/// Renders the value as a SQL literal.
///
/// Dates are quoted in `19 Feb 2015 00:00:00` form and integers stay bare;
/// every other variant is rendered to text with embedded single quotes
/// doubled, then single-quoted.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Timestamp(v) => write!(f, "'{}'", v.format(SQL_DATE_FORMAT)),
            Value::Int(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
            other => write!(f, "'{}'", other.raw_text().replace('\'', "''")),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}
