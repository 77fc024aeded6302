//! Module: value::scalar
//! Responsibility: typed comparison values and their ordering/text semantics.
//! Does not own: converting loose values into scalars (see `coercion`).
//! Boundary: the operator table compares `Scalar`s only.

use std::{cmp::Ordering, fmt};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextMode {
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// Scalar
///
/// A value already coerced into one field type's comparison domain.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Float(f64),
    Int(i64),
    Text(String),
    Timestamp(OffsetDateTime),
}

impl Scalar {
    /// Same-domain ordering. Mixed domains and NaN compare as `None`.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(casefold(a).cmp(&casefold(b))),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Same-domain equality; text folds case.
    #[must_use]
    pub fn equals(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => Some(a == b),
            _ => self.compare(other).map(Ordering::is_eq),
        }
    }

    #[must_use]
    pub fn text_contains(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        self.text_op(needle, mode, |hay, needle| hay.contains(needle))
    }

    #[must_use]
    pub fn text_starts_with(&self, prefix: &Self, mode: TextMode) -> Option<bool> {
        self.text_op(prefix, mode, |hay, prefix| hay.starts_with(prefix))
    }

    #[must_use]
    pub fn text_ends_with(&self, suffix: &Self, mode: TextMode) -> Option<bool> {
        self.text_op(suffix, mode, |hay, suffix| hay.ends_with(suffix))
    }

    fn text_op(
        &self,
        other: &Self,
        mode: TextMode,
        f: impl FnOnce(&str, &str) -> bool,
    ) -> Option<bool> {
        let (Self::Text(left), Self::Text(right)) = (self, other) else {
            return None;
        };

        Some(match mode {
            TextMode::Cs => f(left, right),
            TextMode::Ci => f(&casefold(left), &casefold(right)),
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Timestamp(v) => match v.format(&Rfc3339) {
                Ok(rendered) => f.write_str(&rendered),
                Err(_) => write!(f, "{v}"),
            },
        }
    }
}

pub(crate) fn casefold(input: &str) -> String {
    if input.is_ascii() {
        return input.to_ascii_lowercase();
    }

    input.to_lowercase()
}
