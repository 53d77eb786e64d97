use crate::cache::ObjectCache;
use crate::config::{CacheLimits, CacheSettings};
use crate::listener::EvictionListener;
use crate::metrics::Metrics;
use crate::recency::RecencyClock;
use crate::store::ObjectStore;

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

/// A builder for creating `ObjectCache` instances.
pub struct ObjectCacheBuilder<K, V, H = ahash::RandomState> {
  pub(crate) limits: CacheLimits,
  pub(crate) hasher: H,
  listener: Option<Arc<dyn EvictionListener<K, V>>>,
  _key_marker: PhantomData<K>,
  _value_marker: PhantomData<V>,
}

impl<K, V, H> fmt::Debug for ObjectCacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ObjectCacheBuilder")
      .field("limits", &self.limits)
      .field("has_listener", &self.listener.is_some())
      .finish_non_exhaustive()
  }
}

// --- General Configuration Methods ---
impl<K, V, H> ObjectCacheBuilder<K, V, H> {
  /// Sets the ceiling on the total size of cached values, in bytes.
  pub fn byte_budget(mut self, bytes: u64) -> Self {
    self.limits.byte_budget = bytes;
    self
  }

  /// Sets the number of entries that survive eviction regardless of the
  /// byte budget.
  pub fn minimum_items(mut self, items: usize) -> Self {
    self.limits.minimum_items = items;
    self
  }

  /// Sets both eviction thresholds at once.
  pub fn limits(mut self, limits: CacheLimits) -> Self {
    self.limits = limits;
    self
  }

  /// Takes the eviction thresholds from a settings snapshot. The `enabled`
  /// flag is not the engine's concern and is ignored here.
  pub fn settings(self, settings: &CacheSettings) -> Self {
    self.limits(settings.limits())
  }

  /// Sets the eviction listener for the cache.
  pub fn eviction_listener<Listener>(mut self, listener: Listener) -> Self
  where
    Listener: EvictionListener<K, V> + 'static,
  {
    self.listener = Some(Arc::new(listener));
    self
  }

  /// Sets the hasher for the cache.
  pub fn hasher<H2>(self, hasher: H2) -> ObjectCacheBuilder<K, V, H2> {
    ObjectCacheBuilder {
      limits: self.limits,
      hasher,
      listener: self.listener,
      _key_marker: PhantomData,
      _value_marker: PhantomData,
    }
  }
}

// --- Default Constructor ---
impl<K, V, H: BuildHasher + Default> ObjectCacheBuilder<K, V, H> {
  /// Creates a new builder with the default limits.
  pub fn new() -> Self {
    Self {
      limits: CacheLimits::default(),
      hasher: H::default(),
      listener: None,
      _key_marker: PhantomData,
      _value_marker: PhantomData,
    }
  }
}

impl<K, V> Default for ObjectCacheBuilder<K, V, ahash::RandomState> {
  fn default() -> Self {
    Self::new()
  }
}

// --- Build Methods ---
impl<K, V, H> ObjectCacheBuilder<K, V, H>
where
  K: Eq + Hash + Ord + Clone,
  H: BuildHasher,
{
  /// Builds the cache.
  ///
  /// Any limits are accepted, including a zero byte budget: every insert then
  /// evicts down to `minimum_items`, or to the inserted entry alone.
  pub fn build(self) -> ObjectCache<K, V, H> {
    ObjectCache {
      store: RwLock::new(ObjectStore::with_hasher(self.hasher)),
      clock: RecencyClock::new(),
      limits: RwLock::new(self.limits),
      metrics: Metrics::new(),
      listener: self.listener,
    }
  }
}
