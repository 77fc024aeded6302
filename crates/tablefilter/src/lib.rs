//! ## Crate layout
//! - `core`: value model, schema, filter grammar, evaluator, and predicate builder.
//! - `config`: TOML configuration for the service.
//! - `source`: file-backed tables and entity schemas.
//! - `service`: `FilterService`, the request-facing entry point.
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module mirrors the surface used by request handlers.

pub use tablefilter_core as core;

pub mod config;
pub mod error;
pub mod service;
pub mod source;

// re-exports
pub use error::Error;
pub use service::FilterService;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::FilterConfig,
        core::{
            error::FilterErrorKind,
            eval::RecordFilter,
            predicate::{AdapterRegistry, EntityAdapter, SchemaAdapter, SqlPredicate},
            schema::{FieldDef, FieldType, TableSchema},
            value::{Record, Value},
        },
        error::{Error, ErrorKind, ErrorOrigin},
        service::FilterService,
        source::TableSource,
    };
}
