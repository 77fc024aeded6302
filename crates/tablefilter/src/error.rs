use crate::{
    config::ConfigError,
    source::{SourceError, SourceErrorKind},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tablefilter_core::{
    error::{FilterError, FilterErrorKind},
    schema::SchemaError,
    value::ValueError,
};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable class + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// The filter classification, when the failure came from a filter.
    #[must_use]
    pub const fn filter_kind(&self) -> Option<FilterErrorKind> {
        match self.kind {
            ErrorKind::Filter(kind) => Some(kind),
            _ => None,
        }
    }
}

impl From<FilterError> for Error {
    fn from(err: FilterError) -> Self {
        Self::new(ErrorKind::Filter(err.kind()), ErrorOrigin::Filter, err.to_string())
    }
}

// Payloads that are not filter-shaped at all (JSON objects, huge numbers).
impl From<ValueError> for Error {
    fn from(err: ValueError) -> Self {
        Self::new(
            ErrorKind::Filter(FilterErrorKind::InvalidExpressionShape),
            ErrorOrigin::Value,
            err.to_string(),
        )
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::new(ErrorKind::Schema, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        Self::new(ErrorKind::Source(err.kind()), ErrorOrigin::Source, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and request handlers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The filter payload was rejected; the caller can fix it.
    Filter(FilterErrorKind),

    /// Table data or schema files could not be used.
    Source(SourceErrorKind),

    /// A schema definition is invalid.
    Schema,

    /// Service configuration is invalid.
    Config,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Filter,
    Schema,
    Source,
    Value,
}
