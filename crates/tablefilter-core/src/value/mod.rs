//! Module: value
//! Responsibility: loosely typed filter operands and record cells.
//! Does not own: schema-typed comparison domains (see `coercion` / `scalar`).
//! Boundary: every JSON payload crosses into the core through `Value`.

mod coercion;
mod scalar;


use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

// re-exports
pub use coercion::{
    CoercionError, coerce, to_bool, to_float, to_int, to_text, to_timestamp,
};
pub use scalar::{Scalar, TextMode};
pub(crate) use scalar::casefold;

///
/// Record
///
/// One row of a record set: raw field name to loosely typed cell.
/// Keys are matched exactly; only the schema lookup is case-insensitive.
///

pub type Record = BTreeMap<String, Value>;

///
/// Value
///
/// Closed sum over the JSON shapes a filter or record can carry.
/// JSON numbers always land in `Number`, whatever the declared field type.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Self>),
}

impl Value {
    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Short shape name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i64> for Value {
    #[expect(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

///
/// ValueError
///
/// JSON shapes that have no `Value` representation.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValueError {
    #[error("JSON objects are not valid filter or record values")]
    ObjectNotSupported,

    #[error("JSON number {0} is not representable as a 64-bit float")]
    NumberOutOfRange(String),
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ValueError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(v) => Ok(Self::Bool(v)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| ValueError::NumberOutOfRange(n.to_string())),
            serde_json::Value::String(v) => Ok(Self::Text(v)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            serde_json::Value::Object(_) => Err(ValueError::ObjectNotSupported),
        }
    }
}

/// Convert one JSON object into a record.
pub fn record_from_json(
    object: serde_json::Map<String, serde_json::Value>,
) -> Result<Record, ValueError> {
    object
        .into_iter()
        .map(|(key, value)| Value::try_from(value).map(|value| (key, value)))
        .collect()
}
