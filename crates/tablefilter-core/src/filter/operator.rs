//! Module: filter::operator
//! Responsibility: operator tokens and the per-type operator table.
//! Does not own: operand coercion or record lookup.
//! Boundary: both backends consult `OPERATOR_TABLE` before building anything.

use crate::{
    schema::FieldType,
    value::{Scalar, TextMode},
};
use derive_more::Display;
use std::cmp::Ordering;

///
/// Operator
///
/// Leaf comparison operator. Tokens are matched case-insensitively.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Operator {
    #[display("=")]
    Eq,
    #[display("<>")]
    Ne,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display("contains")]
    Contains,
    #[display("notcontains")]
    NotContains,
    #[display("startswith")]
    StartsWith,
    #[display("endswith")]
    EndsWith,
    #[display("between")]
    Between,
}

impl Operator {
    /// Parse a wire token; `None` for anything outside the grammar.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token.to_ascii_lowercase().as_str() {
            "=" => Self::Eq,
            "<>" => Self::Ne,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            "contains" => Self::Contains,
            "notcontains" => Self::NotContains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "between" => Self::Between,
            _ => return None,
        };

        Some(op)
    }

    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Between)
    }

    /// Apply a single-operand operator to an already-coerced cell.
    ///
    /// Returns `None` when the operator is undefined for the scalar domains
    /// involved (mixed domains, NaN ordering, or `between`).
    #[must_use]
    pub fn apply(self, cell: &Scalar, operand: &Scalar) -> Option<bool> {
        match self {
            Self::Eq => cell.equals(operand),
            Self::Ne => cell.equals(operand).map(|eq| !eq),
            Self::Gt => cell.compare(operand).map(Ordering::is_gt),
            Self::Gte => cell.compare(operand).map(Ordering::is_ge),
            Self::Lt => cell.compare(operand).map(Ordering::is_lt),
            Self::Lte => cell.compare(operand).map(Ordering::is_le),
            Self::Contains => cell.text_contains(operand, TextMode::Ci),
            Self::NotContains => cell.text_contains(operand, TextMode::Ci).map(|hit| !hit),
            Self::StartsWith => cell.text_starts_with(operand, TextMode::Ci),
            Self::EndsWith => cell.text_ends_with(operand, TextMode::Ci),
            Self::Between => None,
        }
    }
}

///
/// OperatorRule
///
/// One row of the operator table: an operator and the declared
/// field types it is defined for.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OperatorRule {
    pub operator: Operator,
    pub types: &'static [FieldType],
}

const ANY: &[FieldType] = &[
    FieldType::String,
    FieldType::Text,
    FieldType::Int,
    FieldType::Float,
    FieldType::Bool,
    FieldType::Timestamp,
];
const ORDERED: &[FieldType] = &[FieldType::Int, FieldType::Float, FieldType::Timestamp];
const TEXTUAL: &[FieldType] = &[FieldType::String, FieldType::Text];

// Absence of a rule means the operator is unsupported for that type.
pub const OPERATOR_TABLE: &[OperatorRule] = &[
    OperatorRule {
        operator: Operator::Eq,
        types: ANY,
    },
    OperatorRule {
        operator: Operator::Ne,
        types: ANY,
    },
    OperatorRule {
        operator: Operator::Gt,
        types: ORDERED,
    },
    OperatorRule {
        operator: Operator::Gte,
        types: ORDERED,
    },
    OperatorRule {
        operator: Operator::Lt,
        types: ORDERED,
    },
    OperatorRule {
        operator: Operator::Lte,
        types: ORDERED,
    },
    OperatorRule {
        operator: Operator::Contains,
        types: TEXTUAL,
    },
    OperatorRule {
        operator: Operator::NotContains,
        types: TEXTUAL,
    },
    OperatorRule {
        operator: Operator::StartsWith,
        types: TEXTUAL,
    },
    OperatorRule {
        operator: Operator::EndsWith,
        types: TEXTUAL,
    },
    OperatorRule {
        operator: Operator::Between,
        types: ORDERED,
    },
];

/// Returns whether the table defines `operator` for `field_type`.
#[must_use]
pub fn supports_operator(field_type: FieldType, operator: Operator) -> bool {
    OPERATOR_TABLE
        .iter()
        .any(|rule| rule.operator == operator && rule.types.contains(&field_type))
}

/// Every operator defined for `field_type`, in table order.
pub fn operators_for(field_type: FieldType) -> impl Iterator<Item = Operator> {
    OPERATOR_TABLE
        .iter()
        .filter(move |rule| rule.types.contains(&field_type))
        .map(|rule| rule.operator)
}
