//! Module: schema
//! Responsibility: declared field types and the per-table field registry.
//! Does not own: loading schemas from disk or storage introspection.
//! Boundary: the only schema surface the filter grammar and adapters depend on.

mod snapshot;


use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};
use thiserror::Error as ThisError;

// re-exports
pub use snapshot::{
    EntitySpec, FieldSpec, TEST1_SCHEMA, TEST2_SCHEMA, TEST3_SCHEMA, TRANSACTION, builtin_entities,
};

///
/// FieldType
///
/// Declared scalar type of one table column.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(into = "String", try_from = "String")]
pub enum FieldType {
    #[display("string")]
    String,
    #[display("int")]
    Int,
    #[display("float")]
    Float,
    #[display("bool")]
    Bool,
    #[display("timestamp")]
    Timestamp,
    #[display("text")]
    Text,
}

impl FieldType {
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::Text)
    }

    /// Numeric and temporal types have a total order usable by `between`.
    #[must_use]
    pub const fn supports_range(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Timestamp)
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "int" => Ok(Self::Int),
            "float" | "float64" => Ok(Self::Float),
            "bool" => Ok(Self::Bool),
            "timestamp" | "time" | "time.time" => Ok(Self::Timestamp),
            _ => Err(SchemaError::UnknownFieldType {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

///
/// FieldDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

///
/// TableSchema
///
/// Ordered field list for one table plus a case-insensitive index.
/// Built once, read-only afterwards; safe to share across threads.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "SchemaDocument", try_from = "SchemaDocument")]
pub struct TableSchema {
    entity_name: String,
    fields: Vec<FieldDef>,
    index: BTreeMap<String, usize>,
}

impl TableSchema {
    /// Build a schema, rejecting empty and duplicate (case-insensitive) names.
    pub fn new(
        entity_name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDef>,
    ) -> Result<Self, SchemaError> {
        let fields: Vec<FieldDef> = fields.into_iter().collect();
        let mut index = BTreeMap::new();

        for (slot, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName { position: slot });
            }
            if index.insert(fold_name(&field.name), slot).is_some() {
                return Err(SchemaError::DuplicateField {
                    field: field.name.clone(),
                });
            }
        }

        Ok(Self {
            entity_name: entity_name.into(),
            fields,
            index,
        })
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Case-insensitive field lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index
            .get(&fold_name(name))
            .and_then(|slot| self.fields.get(*slot))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&fold_name(name))
    }
}

fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

///
/// SchemaDocument
///
/// Serialized shape of a schema file: `{"entityName": ..., "fields": [...]}`.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDocument {
    #[serde(default)]
    entity_name: String,
    fields: Vec<FieldDef>,
}

impl TryFrom<SchemaDocument> for TableSchema {
    type Error = SchemaError;

    fn try_from(doc: SchemaDocument) -> Result<Self, Self::Error> {
        Self::new(doc.entity_name, doc.fields)
    }
}

impl From<TableSchema> for SchemaDocument {
    fn from(schema: TableSchema) -> Self {
        Self {
            entity_name: schema.entity_name,
            fields: schema.fields,
        }
    }
}

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("duplicate field '{field}'")]
    DuplicateField { field: String },

    #[error("field at position {position} has an empty name")]
    EmptyFieldName { position: usize },

    #[error("unknown field type '{name}'")]
    UnknownFieldType { name: String },
}
