use crate::config::CacheLimits;
use crate::listener::{EvictionListener, EvictionReason};
use crate::metrics::{CacheStats, Metrics, MetricsSnapshot};
use crate::recency::RecencyClock;
use crate::size::ObjectSize;
use crate::store::{saturate, InsertOutcome, ObjectStore, Removed};
use crate::ObjectCacheBuilder;

use core::fmt;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use parking_lot::RwLock;

/// A thread-safe object cache bounded by a byte budget and a minimum item
/// count.
///
/// Values are held as `Arc<V>`: the cache is one owner among many, and a
/// value handed out by [`get`](Self::get) stays valid after the entry is
/// evicted. When an insert pushes the total size over the byte budget, the
/// least recently used entries are evicted until the cache fits again or only
/// `minimum_items` entries remain, whichever comes first. The entry being
/// inserted is never evicted by its own insert, so even a value larger than
/// the whole budget is admitted.
///
/// Lookups share a read lock and record their use with a single atomic store.
/// Inserts, evictions and removals take the write lock.
///
/// The limits sit behind their own lock so that an insert always enforces a
/// budget and floor that were set together.
pub struct ObjectCache<K: Ord, V, H = ahash::RandomState> {
  pub(crate) store: RwLock<ObjectStore<K, V, H>>,
  pub(crate) clock: RecencyClock,
  pub(crate) limits: RwLock<CacheLimits>,
  pub(crate) metrics: Metrics,
  pub(crate) listener: Option<Arc<dyn EvictionListener<K, V>>>,
}

impl<K: Ord, V, H> fmt::Debug for ObjectCache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ObjectCache")
      .field("limits", &*self.limits.read())
      .field("store", &*self.store.read())
      .field("has_listener", &self.listener.is_some())
      .finish()
  }
}

impl<K, V> ObjectCache<K, V, ahash::RandomState>
where
  K: Eq + Hash + Ord + Clone,
{
  /// Creates a cache with the given limits and default settings otherwise.
  pub fn new(limits: CacheLimits) -> Self {
    ObjectCacheBuilder::new().limits(limits).build()
  }

  /// Returns a builder for a cache.
  pub fn builder() -> ObjectCacheBuilder<K, V> {
    ObjectCacheBuilder::new()
  }
}

impl<K, V, H> ObjectCache<K, V, H>
where
  K: Eq + Hash + Ord + Clone,
  H: BuildHasher,
{
  /// Fetches a value, marking the entry as just used.
  ///
  /// Returns a new share of the value; the cache keeps its own.
  pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let generation = self.clock.tick();
    let found = self.store.read().get(key, generation);

    if found.is_some() {
      Metrics::record(&self.metrics.hits, 1);
    } else {
      Metrics::record(&self.metrics.misses, 1);
    }
    found
  }

  /// "Peeks" at a value without updating its recency or the hit/miss counters.
  pub fn peek<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.store.read().peek(key)
  }

  /// Returns `true` if `key` is cached. Does not update recency.
  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.store.read().contains(key)
  }

  /// Inserts a value, sized by its [`ObjectSize`] implementation.
  ///
  /// If `key` is already cached its entry is replaced. This never fails and
  /// never rejects the value; see the type-level docs for eviction.
  pub fn insert(&self, key: K, value: Arc<V>)
  where
    V: ObjectSize,
  {
    let size = value.size_in_bytes();
    self.insert_with_size(key, value, size);
  }

  /// Inserts a value with an explicitly supplied byte size.
  pub fn insert_with_size(&self, key: K, value: Arc<V>, size: u64) {
    let limits = self.limits();

    let outcome = {
      let mut store = self.store.write();
      // Take the generation under the lock so the new entry is the newest.
      let generation = self.clock.tick();
      store.insert(key, value, size, generation, limits)
    };

    self.after_insert(outcome, size, limits);
  }

  /// Removes an entry, returning the cache's share of its value.
  pub fn invalidate<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let removed = self.store.write().remove(key)?;
    Metrics::record(&self.metrics.invalidations, 1);

    let value = removed.value.clone();
    self.notify(removed, EvictionReason::Invalidated);
    Some(value)
  }

  /// Removes every entry.
  pub fn clear(&self) {
    let removed = self.store.write().clear();
    tracing::debug!(cleared = removed.len(), "object cache cleared");
    for entry in removed {
      self.notify(entry, EvictionReason::Cleared);
    }
  }

  /// Returns the number of cached entries.
  pub fn len(&self) -> usize {
    self.store.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the running totals. O(1): both are maintained incrementally.
  pub fn stats(&self) -> CacheStats {
    let store = self.store.read();
    CacheStats {
      total_size_in_bytes: store.total_bytes(),
      object_count: store.len() as u64,
    }
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.metrics.snapshot(self.stats())
  }

  /// Returns the limits the next insert will enforce.
  pub fn limits(&self) -> CacheLimits {
    *self.limits.read()
  }

  /// Changes the limits. Existing entries are left alone until the next
  /// insert, which enforces the new limits.
  ///
  /// A zero byte budget is valid: inserts then evict down to
  /// `minimum_items`, keeping at least the entry being inserted.
  pub fn set_limits(&self, limits: CacheLimits) {
    let previous = std::mem::replace(&mut *self.limits.write(), limits);
    if previous == limits {
      return;
    }
    tracing::debug!(
      byte_budget = limits.byte_budget,
      minimum_items = limits.minimum_items,
      previous_byte_budget = previous.byte_budget,
      previous_minimum_items = previous.minimum_items,
      "object cache limits changed"
    );
  }

  fn after_insert(&self, outcome: InsertOutcome<K, V>, size: u64, limits: CacheLimits) {
    let InsertOutcome {
      replaced,
      evicted,
      total_bytes,
      items,
    } = outcome;

    Metrics::record(&self.metrics.total_bytes_added, size);
    match replaced {
      Some(old) => {
        Metrics::record(&self.metrics.replacements, 1);
        self.notify(old, EvictionReason::Replaced);
      }
      None => Metrics::record(&self.metrics.inserts, 1),
    }

    if size > limits.byte_budget {
      Metrics::record(&self.metrics.oversized_admissions, 1);
      tracing::warn!(
        size,
        byte_budget = limits.byte_budget,
        "admitted a value larger than the whole byte budget"
      );
    }

    if !evicted.is_empty() {
      let freed_bytes = saturate(evicted.iter().map(|e| u128::from(e.size)).sum());
      Metrics::record(&self.metrics.evicted_by_capacity, evicted.len() as u64);
      tracing::debug!(
        evicted = evicted.len(),
        freed_bytes,
        total_bytes,
        items,
        "object cache evicted entries"
      );
      for victim in evicted {
        self.notify(victim, EvictionReason::Capacity);
      }
    }
  }

  /// Hands a removed entry to the listener, if any. Called without the lock.
  fn notify(&self, removed: Removed<K, V>, reason: EvictionReason) {
    if let Some(listener) = &self.listener {
      listener.on_evict(removed.key, removed.value, reason);
    }
  }
}
