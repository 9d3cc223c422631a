//! The per-instance object registry and the process-wide handle to one.

mod core;
mod global;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::bundle;
use crate::resolver::{Lookup, ResolveError};
use crate::value::Object;

use self::core::RegistryCore;

pub use self::global::{global, reset_global, set_global};

/// The well-known identifier every registry pools itself under at
/// construction time, so resolvers can request "the current registry" as an
/// ordinary dependency.
pub const REGISTRY_ID: &str = "bindery.Registry";

/// A cheaply cloneable handle to one object pool, backed by the process-wide
/// binding table for cache misses.
#[derive(Clone)]
pub struct Registry {
    core: Arc<RegistryCore>,
}

impl Registry {
    pub fn new() -> Self {
        let registry = Self {
            core: Arc::new(RegistryCore::new()),
        };
        registry
            .core
            .insert(REGISTRY_ID.to_owned(), Arc::new(registry.clone()) as Object);
        registry
    }

    /// True if `id` is pooled or present in the binding table.
    pub fn has(&self, id: &str) -> bool {
        self.core.contains(id) || bundle::contains(id)
    }

    /// Returns the pooled object for `id`, resolving and pooling its binding
    /// on the first request. Resolution work for an id happens at most once
    /// per registry, absent [`clear`](Self::clear) or [`set`](Self::set).
    pub fn get(&self, id: &str) -> Result<Object, ResolveError> {
        self.core.get_object(id)
    }

    /// Force-inserts into the pool, overriding any future lazy resolution
    /// for `id` until cleared.
    pub fn set(&self, id: impl Into<String>, object: Object) {
        self.core.insert(id.into(), object);
    }

    /// Empties the pool. Bindings remain, so a bound id resolves afresh on
    /// its next `get`.
    pub fn clear(&self) {
        self.core.clear();
    }
}

impl Lookup for Registry {
    fn has(&self, id: &str) -> bool {
        Registry::has(self, id)
    }

    fn get(&self, id: &str) -> Result<Object, ResolveError> {
        Registry::get(self, id)
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

/// A mixin for components that want the registry resolving them handed over
/// after construction.
pub trait RegistryAware {
    fn set_registry(&mut self, registry: Registry);
}
