//! Module: schema::snapshot
//! Responsibility: compile-time schema snapshots for fixed entities.
//! Does not own: adapter behaviour; a snapshot only feeds the schema-driven adapter.

use crate::schema::{FieldDef, FieldType, SchemaError, TableSchema};

use FieldType::{Bool, Float, Int, String as Str, Text, Timestamp};

///
/// FieldSpec
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

///
/// EntitySpec
///
/// Static field list for one entity, fixed at build time.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntitySpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl EntitySpec {
    /// Materialize the snapshot as a runtime schema.
    pub fn to_schema(&self) -> Result<TableSchema, SchemaError> {
        TableSchema::new(
            self.name,
            self.fields
                .iter()
                .map(|spec| FieldDef::new(spec.name, spec.ty)),
        )
    }
}

pub const TRANSACTION: EntitySpec = EntitySpec {
    name: "transaction",
    fields: &[
        FieldSpec::new("id", Int),
        FieldSpec::new("date", Timestamp),
        FieldSpec::new("amount", Float),
        FieldSpec::new("name", Str),
        FieldSpec::new("location", Str),
        FieldSpec::new("category", Str),
        FieldSpec::new("type", Str),
    ],
};

pub const TEST1_SCHEMA: EntitySpec = EntitySpec {
    name: "test1schema",
    fields: &[
        FieldSpec::new("id", Int),
        FieldSpec::new("field_string", Str),
        FieldSpec::new("field_int", Int),
        FieldSpec::new("field_float", Float),
        FieldSpec::new("field_bool", Bool),
        FieldSpec::new("field_time", Timestamp),
        FieldSpec::new("field_text", Text),
    ],
};

pub const TEST2_SCHEMA: EntitySpec = EntitySpec {
    name: "test2schema",
    fields: &[
        FieldSpec::new("id", Int),
        FieldSpec::new("name", Str),
        FieldSpec::new("description", Text),
        FieldSpec::new("quantity", Int),
        FieldSpec::new("price", Float),
        FieldSpec::new("active", Bool),
        FieldSpec::new("created_at", Timestamp),
        FieldSpec::new("updated_at", Timestamp),
        FieldSpec::new("item_type", Str),
    ],
};

pub const TEST3_SCHEMA: EntitySpec = EntitySpec {
    name: "test3schema",
    fields: &[
        FieldSpec::new("id", Int),
        FieldSpec::new("sku", Str),
        FieldSpec::new("product_name", Str),
        FieldSpec::new("short_description", Str),
        FieldSpec::new("full_description", Text),
        FieldSpec::new("cost_price", Float),
        FieldSpec::new("retail_price", Float),
        FieldSpec::new("stock_count", Int),
        FieldSpec::new("is_active", Bool),
        FieldSpec::new("published_at", Timestamp),
        FieldSpec::new("last_ordered_at", Timestamp),
        FieldSpec::new("tags", Str),
    ],
};

const BUILTIN: &[EntitySpec] = &[TRANSACTION, TEST1_SCHEMA, TEST2_SCHEMA, TEST3_SCHEMA];

/// Every entity that ships with a compiled-in snapshot.
#[must_use]
pub const fn builtin_entities() -> &'static [EntitySpec] {
    BUILTIN
}
