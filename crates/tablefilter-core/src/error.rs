use crate::{schema::FieldType, value::CoercionError};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// FilterError
///
/// Terminal failure of one parse / evaluate / build call.
/// Every variant is a deterministic input-validation failure; none are retried.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum FilterError {
    #[error("filter expression must be an array, got {found}")]
    InvalidExpressionShape { found: &'static str },

    #[error("malformed NOT filter: {reason}")]
    MalformedNot { reason: String },

    #[error("malformed group filter: {reason}")]
    MalformedGroup { reason: String },

    #[error("invalid logical operator in group: {found}")]
    InvalidLogicalOperator { found: String },

    #[error("operator in simple condition must be a string, got {found}")]
    InvalidOperator { found: &'static str },

    #[error("field '{field}' not found in schema for entity '{entity}'")]
    UnknownField { field: String, entity: String },

    #[error("unsupported operator '{operator}' for field type {field_type} of field '{field}'")]
    UnsupportedOperator {
        operator: String,
        field: String,
        field_type: FieldType,
    },

    #[error("invalid value for {field_type} field '{field}': {source}")]
    InvalidOperandType {
        field: String,
        field_type: FieldType,
        #[source]
        source: OperandError,
    },

    #[error("filter nesting exceeds the maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("no adapter registered for entity type '{entity}'")]
    UnknownEntity { entity: String },
}

impl FilterError {
    pub(crate) fn malformed_not(reason: impl Into<String>) -> Self {
        Self::MalformedNot {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_group(reason: impl Into<String>) -> Self {
        Self::MalformedGroup {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_operand(
        field: &str,
        field_type: FieldType,
        source: impl Into<OperandError>,
    ) -> Self {
        Self::InvalidOperandType {
            field: field.to_string(),
            field_type,
            source: source.into(),
        }
    }

    /// Stable classification, independent of the message payload.
    #[must_use]
    pub const fn kind(&self) -> FilterErrorKind {
        match self {
            Self::InvalidExpressionShape { .. } => FilterErrorKind::InvalidExpressionShape,
            Self::MalformedNot { .. } => FilterErrorKind::MalformedNot,
            Self::MalformedGroup { .. } => FilterErrorKind::MalformedGroup,
            Self::InvalidLogicalOperator { .. } => FilterErrorKind::InvalidLogicalOperator,
            Self::InvalidOperator { .. } => FilterErrorKind::InvalidOperator,
            Self::UnknownField { .. } => FilterErrorKind::UnknownField,
            Self::UnsupportedOperator { .. } => FilterErrorKind::UnsupportedOperator,
            Self::InvalidOperandType { .. } => FilterErrorKind::InvalidOperandType,
            Self::DepthLimitExceeded { .. } => FilterErrorKind::DepthLimitExceeded,
            Self::UnknownEntity { .. } => FilterErrorKind::UnknownEntity,
        }
    }
}

///
/// FilterErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum FilterErrorKind {
    InvalidExpressionShape,
    MalformedNot,
    MalformedGroup,
    InvalidLogicalOperator,
    InvalidOperator,
    UnknownField,
    UnsupportedOperator,
    InvalidOperandType,
    DepthLimitExceeded,
    UnknownEntity,
}

///
/// OperandError
///
/// Why a filter value could not be brought into its field's comparison domain.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum OperandError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("{bound} bound: {source}")]
    RangeBound {
        bound: RangeBound,
        #[source]
        source: CoercionError,
    },

    #[error("operator 'between' requires an array of two values, got {found}")]
    RangeShape { found: String },
}

///
/// RangeBound
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum RangeBound {
    #[display("lower")]
    Lower,
    #[display("upper")]
    Upper,
}
