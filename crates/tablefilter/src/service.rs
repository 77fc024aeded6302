//! Module: service
//! Responsibility: request-facing filtering over file-backed tables and registered entities.
//! Does not own: transport, routing, or query execution against a store.
//! Boundary: adapters are registered at construction; the service is read-only afterwards.

use crate::{config::FilterConfig, error::Error, source::TableSource};
use serde::{Deserialize, Serialize};
use tablefilter_core::{
    eval::RecordFilter,
    predicate::{AdapterRegistry, SchemaAdapter, SqlPredicate, build_predicate_with_depth},
    schema::TableSchema,
    value::{Record, Value},
};
use tracing::{debug, info, warn};

///
/// FilterRequest
///
/// Request body: `{"entity": "...", "filter": [...]}`. A missing or null
/// `filter` selects everything; `entity` is only read for entity requests.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub entity: Option<String>,

    #[serde(default)]
    pub filter: Option<serde_json::Value>,
}

impl FilterRequest {
    /// Convert the JSON filter payload into a filter value.
    pub fn filter_value(&self) -> Result<Option<Value>, Error> {
        self.filter
            .clone()
            .map(Value::try_from)
            .transpose()
            .map_err(Error::from)
    }
}

///
/// FilterService
///

#[derive(Clone, Debug)]
pub struct FilterService {
    config: FilterConfig,
    source: TableSource,
    registry: AdapterRegistry,
}

impl FilterService {
    /// Build the service: compiled-in entity snapshots first, then every
    /// configured schema-driven entity. Entities whose schema fails to
    /// load are skipped with a warning.
    pub fn new(config: FilterConfig) -> Result<Self, Error> {
        config.validate()?;

        let source = TableSource::from_config(&config);
        let mut registry = AdapterRegistry::with_builtin_snapshots()?;

        for entity in &config.entities {
            match source.load_entity_schema(entity) {
                Ok(schema) => {
                    if registry
                        .register(entity, SchemaAdapter::new(schema))
                        .is_some()
                    {
                        debug!(entity = %entity, "schema-driven adapter replaced a snapshot");
                    }
                }
                Err(err) => {
                    warn!(entity = %entity, error = %err, "entity schema not loaded; entity is not filterable");
                }
            }
        }

        info!(
            tables_dir = %config.tables_dir.display(),
            entities = registry.len(),
            max_depth = config.max_depth,
            "filter service ready"
        );

        Ok(Self::with_registry(config, registry))
    }

    /// Service over an already-populated registry.
    #[must_use]
    pub fn with_registry(config: FilterConfig, registry: AdapterRegistry) -> Self {
        Self {
            source: TableSource::from_config(&config),
            config,
            registry,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn source(&self) -> &TableSource {
        &self.source
    }

    /// Filterable entity names, lower-cased and sorted.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.registry.entity_names()
    }

    pub fn tables(&self) -> Result<Vec<String>, Error> {
        Ok(self.source.list_tables()?)
    }

    pub fn table_schema(&self, table: &str) -> Result<TableSchema, Error> {
        Ok(self.source.load_schema(table)?)
    }

    /// Filter the records of `table`. The filter is checked against the
    /// schema before any record is read.
    pub fn filter_table(&self, table: &str, filter: Option<&Value>) -> Result<Vec<Record>, Error> {
        let schema = self.source.load_schema(table)?;
        let compiled = RecordFilter::compile_with_depth(&schema, filter, self.config.max_depth)?;
        let records = self.source.load_records(table)?;
        let total = records.len();
        let kept = compiled.filter_records(records);

        debug!(
            table,
            universal = compiled.is_universal(),
            scanned = total,
            matched = kept.len(),
            "table filtered"
        );

        Ok(kept)
    }

    pub fn filter_table_request(
        &self,
        table: &str,
        request: &FilterRequest,
    ) -> Result<Vec<Record>, Error> {
        let filter = request.filter_value()?;

        self.filter_table(table, filter.as_ref())
    }

    /// SQL predicate for `entity`; `Ok(None)` means no WHERE clause.
    pub fn build_entity_predicate(
        &self,
        entity: &str,
        filter: Option<&Value>,
    ) -> Result<Option<SqlPredicate>, Error> {
        let adapter = self.registry.get(entity)?;
        let predicate =
            build_predicate_with_depth(adapter.as_ref(), filter, self.config.max_depth)?;

        debug!(
            entity,
            universal = predicate.is_none(),
            "entity predicate built"
        );

        Ok(predicate)
    }

    /// Entity request; a request without an entity is an unknown entity.
    pub fn entity_request(&self, request: &FilterRequest) -> Result<Option<SqlPredicate>, Error> {
        let entity = request.entity.as_deref().unwrap_or_default();
        let filter = request.filter_value()?;

        self.build_entity_predicate(entity, filter.as_ref())
    }
}
