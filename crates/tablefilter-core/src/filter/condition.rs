//! Module: filter::condition
//! Responsibility: leaf conditions, from raw `[field, op, value]` to a schema-resolved form.
//! Does not own: grammar traversal or predicate construction.
//! Boundary: resolution order is field, then operator, then operand.

use crate::{
    error::{FilterError, OperandError, RangeBound},
    filter::operator::{Operator, supports_operator},
    schema::{FieldType, TableSchema},
    value::{Record, Scalar, Value, coerce},
};

///
/// Condition
///
/// A leaf exactly as it appears in the filter payload. The operator is
/// known to be a string; nothing else has been checked.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Condition<'a> {
    pub field: &'a str,
    pub operator: &'a str,
    pub value: &'a Value,
}

impl<'a> Condition<'a> {
    #[must_use]
    pub const fn new(field: &'a str, operator: &'a str, value: &'a Value) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    /// Resolve against a schema, coercing the operand into the field's domain.
    pub fn resolve(&self, schema: &TableSchema) -> Result<ResolvedCondition, FilterError> {
        let def = schema
            .field(self.field)
            .ok_or_else(|| FilterError::UnknownField {
                field: self.field.to_string(),
                entity: schema.entity_name().to_string(),
            })?;
        let field_type = def.ty;

        let operator = Operator::from_token(self.operator)
            .filter(|op| supports_operator(field_type, *op))
            .ok_or_else(|| FilterError::UnsupportedOperator {
                operator: self.operator.to_string(),
                field: self.field.to_string(),
                field_type,
            })?;

        let operand = if operator.is_range() {
            self.range_operand(field_type)?
        } else {
            coerce(self.value, field_type)
                .map(Operand::Single)
                .map_err(|source| FilterError::invalid_operand(self.field, field_type, source))?
        };

        Ok(ResolvedCondition {
            field: self.field.to_string(),
            column: def.name.clone(),
            field_type,
            operator,
            operand,
        })
    }

    fn range_operand(&self, field_type: FieldType) -> Result<Operand, FilterError> {
        let Some([lower, upper]) = self.value.as_list() else {
            return Err(FilterError::invalid_operand(
                self.field,
                field_type,
                OperandError::RangeShape {
                    found: describe_shape(self.value),
                },
            ));
        };

        let bound = |value: &Value, bound: RangeBound| {
            coerce(value, field_type).map_err(|source| {
                FilterError::invalid_operand(
                    self.field,
                    field_type,
                    OperandError::RangeBound { bound, source },
                )
            })
        };

        Ok(Operand::Range {
            lower: bound(lower, RangeBound::Lower)?,
            upper: bound(upper, RangeBound::Upper)?,
        })
    }
}

fn describe_shape(value: &Value) -> String {
    match value.as_list() {
        Some(items) => format!("a list of {} values", items.len()),
        None => value.type_name().to_string(),
    }
}

///
/// Operand
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Single(Scalar),
    Range { lower: Scalar, upper: Scalar },
}

///
/// ResolvedCondition
///
/// Schema-checked leaf with its operand already coerced.
/// `field` keeps the spelling from the filter (records are keyed by it);
/// `column` is the declared schema name.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCondition {
    pub field: String,
    pub column: String,
    pub field_type: FieldType,
    pub operator: Operator,
    pub operand: Operand,
}

impl ResolvedCondition {
    /// Evaluate against one record. A missing key never matches.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match FieldPresence::of(record, &self.field) {
            FieldPresence::Present(cell) => self.matches_cell(cell),
            FieldPresence::Missing => false,
        }
    }

    /// Evaluate against one stored cell. An uncoercible cell never matches.
    #[must_use]
    pub fn matches_cell(&self, cell: &Value) -> bool {
        let Ok(cell) = coerce(cell, self.field_type) else {
            return false;
        };

        match &self.operand {
            Operand::Single(operand) => self.operator.apply(&cell, operand).unwrap_or(false),
            Operand::Range { lower, upper } => {
                Operator::Gte.apply(&cell, lower) == Some(true)
                    && Operator::Lte.apply(&cell, upper) == Some(true)
            }
        }
    }
}

///
/// FieldPresence
///

enum FieldPresence<'a> {
    Present(&'a Value),
    Missing,
}

impl<'a> FieldPresence<'a> {
    fn of(record: &'a Record, field: &str) -> Self {
        record.get(field).map_or(Self::Missing, Self::Present)
    }
}
