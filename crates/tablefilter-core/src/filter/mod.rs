//! Module: filter
//! Responsibility: the nested-array filter grammar, its leaf conditions, and the operator table.
//! Does not own: evaluation strategy; backends plug in through `FilterFold`.
//! Boundary: `fold_filter` is the only entry point that interprets filter payloads.

mod condition;
mod grammar;
mod operator;

#[cfg(test)]
mod tests;

// re-exports
pub use condition::{Condition, Operand, ResolvedCondition};
pub use grammar::{FilterFold, LogicalOp, NOT_TOKEN, fold_filter, is_reserved_token};
pub use operator::{OPERATOR_TABLE, Operator, OperatorRule, operators_for, supports_operator};
