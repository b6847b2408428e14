//! Backend registry.
//!
//! A [`BackendRegistry`] is built explicitly at startup and holds both live
//! backend instances and factories that create instances from a
//! [`BackendConfig`].

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::{Backend, BackendConfig, BackendFactory};
use crate::error::{HalError, HalResult};

/// Factory function type for registered backends.
type Factory = Box<dyn Fn(BackendConfig) -> HalResult<Arc<dyn Backend>> + Send + Sync>;

/// Named collection of backends and backend factories.
pub struct BackendRegistry {
    backends: FxHashMap<String, Arc<dyn Backend>>,
    factories: FxHashMap<String, Factory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: FxHashMap::default(),
            factories: FxHashMap::default(),
        }
    }

    /// Register a live backend under its own name, replacing any previous
    /// backend with that name.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        let name = backend.name().to_string();
        debug!("Registering backend: {}", name);
        self.backends.insert(name, backend);
    }

    /// Register a factory for a [`BackendFactory`] type.
    pub fn register_type<B>(&mut self, name: impl Into<String>)
    where
        B: BackendFactory + 'static,
    {
        self.register_factory(name, |config| {
            let backend = B::from_config(config)?;
            Ok(Arc::new(backend) as Arc<dyn Backend>)
        });
    }

    /// Register a backend factory with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Arc<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering backend factory: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Build a fresh backend from a registered factory.
    pub fn create(&self, name: &str, config: BackendConfig) -> HalResult<Arc<dyn Backend>> {
        match self.factories.get(name) {
            Some(factory) => factory(config),
            None => Err(HalError::BackendUnavailable(format!(
                "No backend factory registered with name '{name}'"
            ))),
        }
    }

    pub fn get(&self, name: &str) -> HalResult<Arc<dyn Backend>> {
        self.backends.get(name).cloned().ok_or_else(|| {
            HalError::BackendUnavailable(format!("No backend registered with name '{name}'"))
        })
    }

    /// Registered backend instances, sorted by name.
    pub fn backends(&self) -> Vec<Arc<dyn Backend>> {
        let mut all: Vec<_> = self.backends.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Names of registered instances and factories, sorted and deduplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .backends
            .keys()
            .chain(self.factories.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains_key(name) || self.factories.contains_key(name)
    }

    /// Backends for which `predicate` holds.
    pub fn filter(&self, predicate: impl Fn(&dyn Backend) -> bool) -> Vec<Arc<dyn Backend>> {
        self.backends()
            .into_iter()
            .filter(|b| predicate(b.as_ref()))
            .collect()
    }

    /// Backends whose serialized capabilities have `key == value`.
    pub fn filter_by(&self, key: &str, value: &serde_json::Value) -> Vec<Arc<dyn Backend>> {
        self.filter(|backend| {
            serde_json::to_value(backend.capabilities())
                .ok()
                .and_then(|caps| caps.get(key).cloned())
                .is_some_and(|field| &field == value)
        })
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
