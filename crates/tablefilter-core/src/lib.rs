//! Core of tablefilter: schema-checked nested filter expressions, evaluated
//! over in-memory records or lowered to SQL predicates via entity adapters.

// public exports are one module level down
pub mod error;
pub mod eval;
pub mod filter;
pub mod obs;
pub mod predicate;
pub mod schema;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Default maximum nesting depth of a filter payload.
///
/// Every array level (negation operand, chain element, leaf) counts once.
pub const MAX_FILTER_DEPTH: usize = 64;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
///

pub mod prelude {
    pub use crate::{
        eval::RecordFilter,
        predicate::{EntityAdapter, SchemaAdapter, SqlPredicate},
        schema::{FieldDef, FieldType, TableSchema},
        value::{Record, Value},
    };
}
