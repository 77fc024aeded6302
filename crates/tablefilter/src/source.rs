//! Module: source
//! Responsibility: file-backed table schemas, table records, and entity schemas.
//! Does not own: filter logic; it only produces deserialized shapes.
//! Boundary: table and entity names are single path components.

use crate::config::FilterConfig;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use tablefilter_core::{
    schema::{SchemaError, TableSchema},
    value::{Record, ValueError, record_from_json},
};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

pub const SCHEMA_FILE: &str = "schema.json";
pub const DATA_FILE: &str = "data.json";

///
/// TableSource
///
/// Layout:
/// - `<tables_dir>/<table>/schema.json`
/// - `<tables_dir>/<table>/data.json`
/// - `<schema_dir>/<entity>.json`
///

#[derive(Clone, Debug)]
pub struct TableSource {
    tables_dir: PathBuf,
    schema_dir: PathBuf,
}

impl TableSource {
    pub fn new(tables_dir: impl Into<PathBuf>, schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            tables_dir: tables_dir.into(),
            schema_dir: schema_dir.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(&config.tables_dir, &config.schema_dir)
    }

    #[must_use]
    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }

    #[must_use]
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Sorted names of table directories that hold a schema file.
    /// A missing tables directory lists as empty.
    pub fn list_tables(&self) -> Result<Vec<String>, SourceError> {
        let entries = match fs::read_dir(&self.tables_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(SourceError::io(&self.tables_dir, source)),
        };

        let mut tables = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SourceError::io(&self.tables_dir, source))?;
            let path = entry.path();

            if path.join(SCHEMA_FILE).is_file()
                && let Some(name) = path.file_name().and_then(|name| name.to_str())
            {
                tables.push(name.to_string());
            }
        }
        tables.sort();

        Ok(tables)
    }

    /// Schema of `table`. A schema without `entityName` takes the table name.
    pub fn load_schema(&self, table: &str) -> Result<TableSchema, SourceError> {
        let path = self.table_file(table, SCHEMA_FILE)?;
        let schema: TableSchema = read_json(&path)?;

        if schema.entity_name().is_empty() {
            return TableSchema::new(table, schema.fields().to_vec())
                .map_err(|source| SourceError::Schema { path, source });
        }

        Ok(schema)
    }

    /// Records of `table`, in file order.
    pub fn load_records(&self, table: &str) -> Result<Vec<Record>, SourceError> {
        let path = self.table_file(table, DATA_FILE)?;
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = read_json(&path)?;

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                record_from_json(row).map_err(|source| SourceError::Record {
                    path: path.clone(),
                    index,
                    source,
                })
            })
            .collect()
    }

    /// Schema document for a schema-driven entity adapter.
    pub fn load_entity_schema(&self, entity: &str) -> Result<TableSchema, SourceError> {
        check_name(entity)?;
        let path = self.schema_dir.join(format!("{entity}.json"));

        read_json(&path)
    }

    fn table_file(&self, table: &str, file: &str) -> Result<PathBuf, SourceError> {
        check_name(table)?;
        let dir = self.tables_dir.join(table);

        if !dir.join(SCHEMA_FILE).is_file() {
            return Err(SourceError::TableNotFound {
                table: table.to_string(),
            });
        }

        Ok(dir.join(file))
    }
}

fn check_name(name: &str) -> Result<(), SourceError> {
    let mut components = Path::new(name).components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(SourceError::InvalidName {
            name: name.to_string(),
        }),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| SourceError::io(path, source))?;

    serde_json::from_str(&text).map_err(|source| SourceError::json(path, source))
}

///
/// SourceError
///

#[derive(Debug, ThisError)]
pub enum SourceError {
    #[error("table '{table}' not found")]
    TableNotFound { table: String },

    #[error("invalid table or entity name '{name}'")]
    InvalidName { name: String },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema in '{}': {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("record {index} in '{}': {source}", path.display())]
    Record {
        path: PathBuf,
        index: usize,
        #[source]
        source: ValueError,
    },
}

impl SourceError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn kind(&self) -> SourceErrorKind {
        match self {
            Self::TableNotFound { .. } => SourceErrorKind::NotFound,
            Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                SourceErrorKind::NotFound
            }
            Self::InvalidName { .. } => SourceErrorKind::InvalidName,
            Self::Io { .. } => SourceErrorKind::Unreadable,
            Self::Json { .. } | Self::Schema { .. } | Self::Record { .. } => {
                SourceErrorKind::Malformed
            }
        }
    }
}

///
/// SourceErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum SourceErrorKind {
    NotFound,
    InvalidName,
    Unreadable,
    Malformed,
}
