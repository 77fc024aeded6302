//! Module: predicate
//! Responsibility: lowering filters into engine predicates through entity adapters.
//! Does not own: executing predicates against storage.
//! Boundary: shares the grammar walk with `eval`; only the fold strategy differs.

mod adapter;
mod builder;
mod registry;
mod sql;


// re-exports
pub use adapter::{EntityAdapter, SchemaAdapter, SchemaOrigin, lower_condition};
pub use builder::{build_predicate, build_predicate_with_depth};
pub use registry::{AdapterRegistry, SharedAdapter};
pub use sql::{SqlCompare, SqlOp, SqlPredicate};
