use crate::{
    error::FilterError,
    predicate::{
        adapter::{EntityAdapter, SchemaAdapter},
        builder::build_predicate,
        sql::SqlPredicate,
    },
    schema::{SchemaError, builtin_entities},
    value::Value,
};
use std::{collections::BTreeMap, fmt, sync::Arc};

///
/// SharedAdapter
///

pub type SharedAdapter = Arc<dyn EntityAdapter<Predicate = SqlPredicate> + Send + Sync>;

///
/// AdapterRegistry
///
/// Adapters keyed by lower-cased entity name. Built during startup and
/// read-only afterwards; clone it (cheap `Arc`s) to share across workers.
///

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, SharedAdapter>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every compiled-in snapshot.
    pub fn with_builtin_snapshots() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for spec in builtin_entities() {
            registry.register(spec.name, SchemaAdapter::from_spec(spec)?);
        }

        Ok(registry)
    }

    /// Register an adapter, returning the one it replaced.
    pub fn register<A>(&mut self, entity: &str, adapter: A) -> Option<SharedAdapter>
    where
        A: EntityAdapter<Predicate = SqlPredicate> + Send + Sync + 'static,
    {
        self.register_shared(entity, Arc::new(adapter))
    }

    pub fn register_shared(&mut self, entity: &str, adapter: SharedAdapter) -> Option<SharedAdapter> {
        self.adapters.insert(entity.to_lowercase(), adapter)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, entity: &str) -> Result<&SharedAdapter, FilterError> {
        self.adapters
            .get(&entity.to_lowercase())
            .ok_or_else(|| FilterError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.adapters.contains_key(&entity.to_lowercase())
    }

    /// Registered (lower-cased) entity names in sorted order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Look up `entity` and build its predicate for `filter`.
    pub fn build_predicate(
        &self,
        entity: &str,
        filter: Option<&Value>,
    ) -> Result<Option<SqlPredicate>, FilterError> {
        let adapter = self.get(entity)?;

        build_predicate(adapter.as_ref(), filter)
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.adapters.keys()).finish()
    }
}
