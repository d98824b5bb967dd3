// Adapter registry
//
// Kind-keyed table of adapters. Lookups are checked against the session's
// API surface so a kind is never driven against a revision that lacks it.

use std::collections::HashMap;
use std::sync::Arc;

use appgate_api::ClientSurface;

use super::{ConditionAdapter, CoreResult, ResourceAdapter, RestAdapter};
use crate::error::CoreError;
use crate::model::ResourceKind;

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ResourceKind, Arc<dyn ResourceAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.adapters.keys().collect();
        kinds.sort();
        f.debug_struct("AdapterRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The typed condition adapter plus a generic adapter for every other kind.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in ResourceKind::all() {
            registry.register(Arc::new(RestAdapter::new(kind)));
        }
        registry.register(Arc::new(ConditionAdapter));
        registry
    }

    /// Install an adapter, replacing any previous one for its kind.
    pub fn register(&mut self, adapter: Arc<dyn ResourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    /// The adapter for `kind`, if the negotiated revision serves it.
    pub fn get(
        &self,
        kind: ResourceKind,
        surface: &ClientSurface,
    ) -> CoreResult<Arc<dyn ResourceAdapter>> {
        let unsupported = || CoreError::UnsupportedKind {
            kind: kind.type_name(),
            version: surface.version().get(),
            required: kind.introduced_in(),
        };
        if !surface.supports(kind.introduced_in()) {
            return Err(unsupported());
        }
        self.adapters.get(&kind).cloned().ok_or_else(unsupported)
    }

    /// Registered kinds available on `surface`, in declaration order.
    pub fn kinds(&self, surface: &ClientSurface) -> Vec<ResourceKind> {
        ResourceKind::all()
            .filter(|k| self.adapters.contains_key(k) && surface.supports(k.introduced_in()))
            .collect()
    }
}
