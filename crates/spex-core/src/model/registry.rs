use crate::{
    error::InternalError,
    model::{Element, Schema, TypeExpr},
    obs::sink::{self, EngineEvent},
};
use spex_config::{DescriptorConfig, SpexConfig};
use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock, RwLock},
};
use tracing::debug;

static GLOBAL: OnceLock<ElementRegistry> = OnceLock::new();

///
/// ElementRegistry
///
/// Builds each element at most once and serves the cached tree afterwards.
/// Concurrent first access to the same type yields the same `Arc<Element>`.
///

#[derive(Debug)]
pub struct ElementRegistry {
    schema: Schema,
    config: SpexConfig,
    cache: RwLock<BTreeMap<TypeExpr, Arc<Element>>>,
}

impl ElementRegistry {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self::with_config(schema, SpexConfig::default())
    }

    #[must_use]
    pub const fn with_config(schema: Schema, config: SpexConfig) -> Self {
        Self {
            schema,
            config,
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Like `with_config`, but rejects an invalid config up front.
    pub fn configured(schema: Schema, config: SpexConfig) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self::with_config(schema, config))
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &SpexConfig {
        &self.config
    }

    #[must_use]
    pub const fn descriptors(&self) -> &DescriptorConfig {
        &self.config.descriptors
    }

    /// Element for a type expression, building and caching it on first use.
    pub fn element(&self, ty: &TypeExpr) -> Result<Arc<Element>, InternalError> {
        if !self.schema.resolves(ty) {
            return Err(InternalError::element_not_found(ty.to_string()));
        }

        if let Some(element) = self
            .cache
            .read()
            .expect("element registry RwLock poisoned while acquiring read lock")
            .get(ty)
        {
            return Ok(Arc::clone(element));
        }

        let mut cache = self
            .cache
            .write()
            .expect("element registry RwLock poisoned while acquiring write lock");

        // another thread may have built it between the two locks
        if let Some(element) = cache.get(ty) {
            return Ok(Arc::clone(element));
        }

        let element = Arc::new(Element::build(
            &self.schema,
            ty,
            self.config.descriptors.max_depth,
        ));
        let properties = u64::try_from(element.len()).unwrap_or(u64::MAX);
        debug!(element = %ty, properties, "built element descriptor tree");
        sink::record(EngineEvent::ElementBuilt { properties });

        cache.insert(ty.clone(), Arc::clone(&element));

        Ok(element)
    }

    pub fn element_named(&self, name: &str) -> Result<Arc<Element>, InternalError> {
        self.element(&TypeExpr::named(name))
    }

    /// Number of cached elements.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .expect("element registry RwLock poisoned while acquiring read lock")
            .len()
    }

    ///
    /// PROCESS-WIDE REGISTRY
    ///

    /// Install the process-wide registry. Fails if one is already installed.
    pub fn install_global(registry: Self) -> Result<&'static Self, InternalError> {
        GLOBAL.set(registry).map_err(|_| {
            InternalError::registry_invariant("process-wide element registry already installed")
        })?;

        GLOBAL
            .get()
            .ok_or_else(|| InternalError::registry_invariant("process-wide element registry missing"))
    }

    #[must_use]
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }
}
