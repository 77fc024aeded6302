//! Module: config
//! Responsibility: TOML configuration for `FilterService`.
//! Does not own: reading tables or schemas (see `source`).
//! Boundary: every key is optional; relative paths resolve against the config file.

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tablefilter_core::MAX_FILTER_DEPTH;
use thiserror::Error as ThisError;

///
/// FilterConfig
///
/// ```toml
/// tables_dir = "tables"
/// schema_dir = "schemas"
/// max_depth = 64
/// entities = ["invoice"]
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Root holding one directory per table.
    pub tables_dir: PathBuf,

    /// Directory of `<entity>.json` schema documents.
    pub schema_dir: PathBuf,

    /// Maximum filter nesting depth.
    pub max_depth: usize,

    /// Entities registered with schema-driven adapters at startup.
    pub entities: Vec<String>,
}

impl FilterConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.tables_dir = base.join(&config.tables_dir);
            config.schema_dir = base.join(&config.schema_dir);
        }

        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth {
                value: self.max_depth,
            });
        }

        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            tables_dir: PathBuf::from("tables"),
            schema_dir: PathBuf::from("schemas"),
            max_depth: MAX_FILTER_DEPTH,
            entities: Vec::new(),
        }
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_depth must be at least 1, got {value}")]
    InvalidMaxDepth { value: usize },
}

///
/// TESTS
///
