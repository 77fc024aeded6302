//! Module: filter::grammar
//! Responsibility: the single recursive walk over the nested-array filter grammar.
//! Does not own: leaf semantics or how results are combined (see `FilterFold`).
//! Boundary: every edge-case policy of the grammar lives here and nowhere else.

use crate::{error::FilterError, filter::condition::Condition, value::Value};
use derive_more::Display;

/// Token that opens a negation: `["!", expr]`.
pub const NOT_TOKEN: &str = "!";

///
/// LogicalOp
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum LogicalOp {
    #[display("and")]
    And,
    #[display("or")]
    Or,
}

impl LogicalOp {
    fn parse(token: &Value) -> Result<Self, FilterError> {
        match token.as_str() {
            Some(s) if s.eq_ignore_ascii_case("and") => Ok(Self::And),
            Some(s) if s.eq_ignore_ascii_case("or") => Ok(Self::Or),
            _ => Err(FilterError::InvalidLogicalOperator {
                found: token.to_string(),
            }),
        }
    }
}

/// `and` / `or` (any case) and `!` can never name a field in leaf position.
#[must_use]
pub fn is_reserved_token(token: &str) -> bool {
    token == NOT_TOKEN || token.eq_ignore_ascii_case("and") || token.eq_ignore_ascii_case("or")
}

///
/// FilterFold
///
/// Strategy plugged into the grammar walk. A `None` result anywhere
/// stands for the universal filter (match everything).
///

pub trait FilterFold {
    type Output;

    fn leaf(&mut self, condition: Condition<'_>) -> Result<Self::Output, FilterError>;

    fn and(&mut self, left: Self::Output, right: Self::Output) -> Option<Self::Output>;

    fn or(&mut self, left: Self::Output, right: Self::Output) -> Option<Self::Output>;

    fn not(&mut self, inner: Self::Output) -> Self::Output;
}

/// Walk `filter` once, handing every leaf and combinator to `fold`.
///
/// An absent filter (or a top-level JSON `null`) is the universal filter
/// and is not shape-checked. Any failure aborts the whole walk.
pub fn fold_filter<F: FilterFold>(
    filter: Option<&Value>,
    max_depth: usize,
    fold: &mut F,
) -> Result<Option<F::Output>, FilterError> {
    match filter {
        None | Some(Value::Null) => Ok(None),
        Some(expr) => Walker { fold, max_depth }.walk(expr, 1),
    }
}

///
/// Walker
///

struct Walker<'f, F> {
    fold: &'f mut F,
    max_depth: usize,
}

impl<F: FilterFold> Walker<'_, F> {
    fn walk(&mut self, expr: &Value, depth: usize) -> Result<Option<F::Output>, FilterError> {
        if depth > self.max_depth {
            return Err(FilterError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }

        let Some(items) = expr.as_list() else {
            return Err(FilterError::InvalidExpressionShape {
                found: expr.type_name(),
            });
        };

        match items {
            [] => Ok(None),
            [Value::Text(head), ..] if head == NOT_TOKEN => self.walk_not(items, depth),
            [Value::Text(field), operator, value] if !is_reserved_token(field) => {
                let Some(operator) = operator.as_str() else {
                    return Err(FilterError::InvalidOperator {
                        found: operator.type_name(),
                    });
                };

                self.fold
                    .leaf(Condition::new(field, operator, value))
                    .map(Some)
            }
            _ => self.walk_chain(items, depth),
        }
    }

    fn walk_not(&mut self, items: &[Value], depth: usize) -> Result<Option<F::Output>, FilterError> {
        let [_, operand] = items else {
            return Err(FilterError::malformed_not(format!(
                "expected 2 elements, got {}",
                items.len()
            )));
        };
        if !operand.is_list() {
            return Err(FilterError::malformed_not(format!(
                "operand must be an array, got {}",
                operand.type_name()
            )));
        }

        let inner = self.walk(operand, depth + 1)?;

        Ok(inner.map(|inner| self.fold.not(inner)))
    }

    // [expr, op, expr, op, expr, ...] folded strictly left to right
    fn walk_chain(
        &mut self,
        items: &[Value],
        depth: usize,
    ) -> Result<Option<F::Output>, FilterError> {
        let [first, rest @ ..] = items else {
            return Ok(None);
        };
        if items.len() % 2 == 0 {
            return Err(FilterError::malformed_group(format!(
                "expected alternating conditions and operators, got {} elements",
                items.len()
            )));
        }

        let mut acc = self.walk(first, depth + 1)?;
        for pair in rest.chunks_exact(2) {
            let op = LogicalOp::parse(&pair[0])?;
            let next = self.walk(&pair[1], depth + 1)?;
            acc = self.combine(op, acc, next);
        }

        Ok(acc)
    }

    fn combine(
        &mut self,
        op: LogicalOp,
        left: Option<F::Output>,
        right: Option<F::Output>,
    ) -> Option<F::Output> {
        match (op, left, right) {
            (LogicalOp::And, None, side) | (LogicalOp::And, side, None) => side,
            (LogicalOp::Or, None, _) | (LogicalOp::Or, _, None) => None,
            (LogicalOp::And, Some(left), Some(right)) => self.fold.and(left, right),
            (LogicalOp::Or, Some(left), Some(right)) => self.fold.or(left, right),
        }
    }
}
