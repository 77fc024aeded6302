//! Module: predicate::adapter
//! Responsibility: the entity adapter capability and its schema-driven implementation.
//! Does not own: grammar traversal (see `builder`) or adapter lookup (see `registry`).
//! Boundary: compiled-in entities are schema snapshots fed to the same adapter.

use crate::{
    error::FilterError,
    filter::{Condition, Operand, Operator, ResolvedCondition},
    predicate::sql::{SqlOp, SqlPredicate},
    schema::{EntitySpec, SchemaError, TableSchema},
    value::{Scalar, Value, casefold},
};
use tracing::debug;

///
/// EntityAdapter
///
/// Translates leaf conditions into engine predicates and composes them.
///

pub trait EntityAdapter {
    type Predicate;

    fn entity_name(&self) -> &str;

    fn predicate_for_field(
        &self,
        field: &str,
        operator: &str,
        value: &Value,
    ) -> Result<Self::Predicate, FilterError>;

    /// Zero operands yield `None`; one is passed through unwrapped.
    fn and_predicate(&self, predicates: Vec<Self::Predicate>) -> Option<Self::Predicate>;

    /// Zero operands yield `None`; one is passed through unwrapped.
    fn or_predicate(&self, predicates: Vec<Self::Predicate>) -> Option<Self::Predicate>;

    fn not_predicate(&self, predicate: Self::Predicate) -> Self::Predicate;
}

///
/// SchemaOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SchemaOrigin {
    /// Compiled-in `EntitySpec`.
    Snapshot,
    /// Loaded or built at runtime.
    Runtime,
}

///
/// SchemaAdapter
///
/// SQL adapter driven entirely by a `TableSchema`.
///

#[derive(Clone, Debug)]
pub struct SchemaAdapter {
    schema: TableSchema,
    origin: SchemaOrigin,
}

impl SchemaAdapter {
    #[must_use]
    pub const fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            origin: SchemaOrigin::Runtime,
        }
    }

    pub fn from_spec(spec: &EntitySpec) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: spec.to_schema()?,
            origin: SchemaOrigin::Snapshot,
        })
    }

    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[must_use]
    pub const fn origin(&self) -> SchemaOrigin {
        self.origin
    }
}

impl EntityAdapter for SchemaAdapter {
    type Predicate = SqlPredicate;

    fn entity_name(&self) -> &str {
        self.schema.entity_name()
    }

    fn predicate_for_field(
        &self,
        field: &str,
        operator: &str,
        value: &Value,
    ) -> Result<SqlPredicate, FilterError> {
        let resolved = Condition::new(field, operator, value).resolve(&self.schema)?;

        if let Operand::Range { lower, upper } = &resolved.operand {
            debug!(
                entity = self.entity_name(),
                field,
                field_type = %resolved.field_type,
                %lower,
                %upper,
                "expanding between into an inclusive range"
            );
        }

        Ok(lower_condition(&resolved))
    }

    fn and_predicate(&self, predicates: Vec<SqlPredicate>) -> Option<SqlPredicate> {
        junction(predicates, SqlPredicate::And)
    }

    fn or_predicate(&self, predicates: Vec<SqlPredicate>) -> Option<SqlPredicate> {
        junction(predicates, SqlPredicate::Or)
    }

    fn not_predicate(&self, predicate: SqlPredicate) -> SqlPredicate {
        predicate.negate()
    }
}

fn junction(
    mut predicates: Vec<SqlPredicate>,
    wrap: fn(Vec<SqlPredicate>) -> SqlPredicate,
) -> Option<SqlPredicate> {
    match predicates.len() {
        0 => None,
        1 => predicates.pop(),
        _ => Some(wrap(predicates)),
    }
}

/// Lower one resolved leaf into its SQL form.
#[must_use]
pub fn lower_condition(resolved: &ResolvedCondition) -> SqlPredicate {
    let column = resolved.column.as_str();

    match &resolved.operand {
        Operand::Range { lower, upper } => SqlPredicate::And(vec![
            SqlPredicate::compare(column, SqlOp::Gte, lower.clone()),
            SqlPredicate::compare(column, SqlOp::Lte, upper.clone()),
        ]),
        Operand::Single(arg) if resolved.field_type.is_textual() => {
            let arg = fold_text(arg);
            let cmp = |op| SqlPredicate::compare(column, op, arg.clone());

            match resolved.operator {
                Operator::Ne => cmp(SqlOp::NeFold),
                Operator::Contains => cmp(SqlOp::ContainsFold),
                Operator::NotContains => cmp(SqlOp::ContainsFold).negate(),
                Operator::StartsWith => cmp(SqlOp::HasPrefixFold),
                Operator::EndsWith => cmp(SqlOp::HasSuffixFold),
                _ => cmp(SqlOp::EqFold),
            }
        }
        Operand::Single(arg) => {
            let op = match resolved.operator {
                Operator::Ne => SqlOp::Ne,
                Operator::Gt => SqlOp::Gt,
                Operator::Gte => SqlOp::Gte,
                Operator::Lt => SqlOp::Lt,
                Operator::Lte => SqlOp::Lte,
                _ => SqlOp::Eq,
            };

            SqlPredicate::compare(column, op, arg.clone())
        }
    }
}

fn fold_text(arg: &Scalar) -> Scalar {
    match arg {
        Scalar::Text(text) => Scalar::Text(casefold(text)),
        other => other.clone(),
    }
}
