//! Module: value::coercion
//! Responsibility: every loose-value → typed-scalar conversion, with one error type.
//! Does not own: deciding whether a failed coercion is an error or a non-match.
//! Boundary: condition resolution (operands) and record evaluation (cells) both call in here.

use crate::{
    schema::FieldType,
    value::{Scalar, Value},
};
use thiserror::Error as ThisError;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};

// Largest magnitude where every integer is exactly representable as f64.
const F64_SAFE_INT: f64 = 9_007_199_254_740_992.0;

///
/// CoercionError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum CoercionError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{input}' is not a valid {expected}")]
    Unparseable {
        expected: &'static str,
        input: String,
    },

    #[error("{value} has a fractional part and cannot be used as an int")]
    FractionalInt { value: f64 },

    #[error("{value} is outside the supported int range")]
    IntOutOfRange { value: f64 },

    #[error("'{input}' does not match any supported timestamp layout")]
    TimestampLayout { input: String },
}

impl CoercionError {
    const fn mismatch(expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }
}

/// Coerce a loose value into the comparison domain of `field_type`.
pub fn coerce(value: &Value, field_type: FieldType) -> Result<Scalar, CoercionError> {
    match field_type {
        FieldType::String | FieldType::Text => to_text(value).map(Scalar::Text),
        FieldType::Int => to_int(value).map(Scalar::Int),
        FieldType::Float => to_float(value).map(Scalar::Float),
        FieldType::Bool => to_bool(value).map(Scalar::Bool),
        FieldType::Timestamp => to_timestamp(value).map(Scalar::Timestamp),
    }
}

/// Text domain: strings as-is, numbers and booleans by their display form.
pub fn to_text(value: &Value) -> Result<String, CoercionError> {
    match value {
        Value::Text(text) => Ok(text.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::List(_) => Err(CoercionError::mismatch("text", value)),
    }
}

/// Int domain: whole numbers, or strings holding one.
pub fn to_int(value: &Value) -> Result<i64, CoercionError> {
    match value {
        Value::Number(n) => float_to_int(*n),
        Value::Text(text) => {
            let text = text.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Ok(n);
            }

            // "10.0" is still a whole number
            let n = text
                .parse::<f64>()
                .map_err(|_| CoercionError::Unparseable {
                    expected: "int",
                    input: text.to_string(),
                })?;

            float_to_int(n)
        }
        Value::Null | Value::Bool(_) | Value::List(_) => {
            Err(CoercionError::mismatch("int", value))
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
fn float_to_int(n: f64) -> Result<i64, CoercionError> {
    if !n.is_finite() || n.abs() > F64_SAFE_INT {
        return Err(CoercionError::IntOutOfRange { value: n });
    }
    if n.fract() != 0.0 {
        return Err(CoercionError::FractionalInt { value: n });
    }

    Ok(n as i64)
}

/// Float domain: numbers, or strings holding one.
pub fn to_float(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(text) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| CoercionError::Unparseable {
                    expected: "float",
                    input: text.clone(),
                })
        }
        Value::Null | Value::Bool(_) | Value::List(_) => {
            Err(CoercionError::mismatch("float", value))
        }
    }
}

/// Bool domain: booleans, or the case-insensitive strings `true` / `false`.
pub fn to_bool(value: &Value) -> Result<bool, CoercionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Text(text) if text.eq_ignore_ascii_case("true") => Ok(true),
        Value::Text(text) if text.eq_ignore_ascii_case("false") => Ok(false),
        Value::Text(text) => Err(CoercionError::Unparseable {
            expected: "bool",
            input: text.clone(),
        }),
        Value::Null | Value::Number(_) | Value::List(_) => {
            Err(CoercionError::mismatch("bool", value))
        }
    }
}

/// Timestamp domain: strings in one of the supported layouts.
///
/// Layouts are tried in order and the first successful parse wins:
/// 1. RFC3339 (with or without fractional seconds)
/// 2. `YYYY-MM-DDTHH:MM:SS[.fff]` without zone, read as UTC
/// 3. `YYYY-MM-DD`, read as UTC midnight
pub fn to_timestamp(value: &Value) -> Result<OffsetDateTime, CoercionError> {
    let Value::Text(text) = value else {
        return Err(CoercionError::mismatch("timestamp", value));
    };

    parse_timestamp(text).ok_or_else(|| CoercionError::TimestampLayout {
        input: text.clone(),
    })
}

fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(ts) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(ts);
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    if let Ok(ts) = PrimitiveDateTime::parse(text, naive) {
        return Some(ts.assume_utc());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(text, date_only) {
        return Some(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc());
    }

    None
}
