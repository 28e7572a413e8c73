//! Keyed handler registry: symbolic key -> constructible factory.
//!
//! The registry is the single source handlers are constructed from.
//! Graph builders never hold type information themselves; they hold
//! keys and ask the registry for fresh instances at build time.
//! Includes per-key resolve counters for diagnostics.

use crate::error::{BoxError, WeftError, WeftResult};
use crate::handler::Handler;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A zero-argument factory producing a fresh handler instance.
///
/// Factories are fallible; a fault is surfaced to the resolving caller
/// as [`WeftError::ConstructionFailed`] wrapping the cause. Stored
/// behind `Arc` so `resolve` can invoke a factory without holding the
/// registry lock.
pub type Factory<R> = Arc<dyn Fn() -> Result<Box<dyn Handler<R>>, BoxError> + Send + Sync>;

struct Inner<R> {
    factories: HashMap<String, Factory<R>>,
    /// First-seen registration order, for deterministic snapshots.
    order: Vec<String>,
    /// Per-key resolve counters.
    resolve_counts: HashMap<String, Arc<AtomicU64>>,
}

/// Registry of handler factories keyed by symbolic name.
///
/// All operations take `&self`; the interior lock guards against a
/// resolve racing a mutation when the registry is shared across
/// threads. Construct one registry per composition context and pass it
/// by reference — there is no process-wide instance.
pub struct Registry<R> {
    inner: RwLock<Inner<R>>,
}

impl<R> Registry<R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                factories: HashMap::new(),
                order: Vec::new(),
                resolve_counts: HashMap::new(),
            }),
        }
    }

    /// Store or overwrite the factory for `key`.
    ///
    /// Overwriting keeps the key's original snapshot position; to
    /// reposition a key, `unregister` it first.
    pub fn register<F>(&self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Handler<R>>, BoxError> + Send + Sync + 'static,
    {
        let key = key.into();
        let mut inner = self.inner.write();
        if !inner.factories.contains_key(&key) {
            inner.order.push(key.clone());
            inner
                .resolve_counts
                .insert(key.clone(), Arc::new(AtomicU64::new(0)));
        }
        inner.factories.insert(key, Arc::new(factory));
    }

    /// Register a handler type constructible via [`Default`].
    ///
    /// Mirrors the common case of stateless handlers with zero-argument
    /// construction.
    pub fn register_default<H>(&self, key: impl Into<String>)
    where
        H: Handler<R> + Default + 'static,
    {
        self.register(key, || Ok(Box::new(H::default()) as Box<dyn Handler<R>>));
    }

    /// Remove a key; no-op if absent.
    pub fn unregister(&self, key: &str) {
        let mut inner = self.inner.write();
        if inner.factories.remove(key).is_some() {
            inner.order.retain(|k| k != key);
            inner.resolve_counts.remove(key);
        }
    }

    /// Invoke the stored factory and return a freshly constructed
    /// handler.
    ///
    /// The lock is released before the factory runs, so a slow factory
    /// never blocks mutators and a factory may itself call back into
    /// this registry (for example to register a dependency).
    pub fn resolve(&self, key: &str) -> WeftResult<Box<dyn Handler<R>>> {
        let (factory, counter) = {
            let inner = self.inner.read();
            let factory = inner
                .factories
                .get(key)
                .cloned()
                .ok_or_else(|| WeftError::UnknownKey {
                    key: key.to_string(),
                })?;

            // Counters are inserted alongside factories in register(),
            // so a missing counter here is a logic error in this module.
            let counter = inner
                .resolve_counts
                .get(key)
                .expect("resolve counter missing for registered key")
                .clone();
            (factory, counter)
        };
        counter.fetch_add(1, Ordering::Relaxed);

        factory().map_err(|source| WeftError::ConstructionFailed {
            key: key.to_string(),
            source,
        })
    }

    /// Current registration order.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().factories.contains_key(key)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.inner.read().factories.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().factories.is_empty()
    }

    /// Per-key resolve counts, most-resolved first. Keys never resolved
    /// are omitted.
    pub fn stats(&self) -> Vec<(String, u64)> {
        let inner = self.inner.read();
        let mut stats: Vec<_> = inner
            .resolve_counts
            .iter()
            .map(|(key, count)| (key.clone(), count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}
