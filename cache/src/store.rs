use crate::config::CacheLimits;
use crate::entry::CacheEntry;
use crate::recency::VictimQueue;

use core::fmt;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// Extra stale queue items tolerated before the victim queue is compacted.
const QUEUE_COMPACTION_SLACK: usize = 64;

/// An entry removed from the store, handed back so that its value can be
/// released (and reported to a listener) after the lock is dropped.
pub(crate) struct Removed<K, V> {
  pub(crate) key: K,
  pub(crate) value: Arc<V>,
  pub(crate) size: u64,
}

/// The result of a single insert.
pub(crate) struct InsertOutcome<K, V> {
  /// The previous value under the same key, if any.
  pub(crate) replaced: Option<Removed<K, V>>,
  /// Entries evicted to bring the store back within its limits, oldest first.
  pub(crate) evicted: Vec<Removed<K, V>>,
  pub(crate) total_bytes: u64,
  pub(crate) items: usize,
}

/// Caps a byte count that no longer fits a `u64`.
#[inline]
pub(crate) fn saturate(bytes: u128) -> u64 {
  u64::try_from(bytes).unwrap_or(u64::MAX)
}

/// The unlocked state of an object cache: the key to entry mapping, the
/// running byte total and the queue used to find eviction victims.
///
/// Every method here assumes the caller holds the appropriate lock. Shared
/// access (`&self`) is enough for lookups and recency updates; anything that
/// changes membership or totals requires `&mut self`.
///
/// Sizes are arbitrary `u64`s, so the running total is kept in a `u128` and
/// stays exact however large the individual sizes are. It is reported
/// saturated at `u64::MAX`.
pub(crate) struct ObjectStore<K: Ord, V, H> {
  map: HashMap<K, CacheEntry<V>, H>,
  queue: VictimQueue<K>,
  total_bytes: u128,
}

impl<K: Ord, V, H> fmt::Debug for ObjectStore<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ObjectStore")
      .field("items", &self.map.len())
      .field("total_bytes", &self.total_bytes)
      .field("queued", &self.queue.len())
      .finish()
  }
}

impl<K, V, H> ObjectStore<K, V, H>
where
  K: Eq + Hash + Ord + Clone,
  H: BuildHasher,
{
  pub(crate) fn with_hasher(hasher: H) -> Self {
    Self {
      map: HashMap::with_hasher(hasher),
      queue: VictimQueue::new(),
      total_bytes: 0,
    }
  }

  #[inline]
  pub(crate) fn total_bytes(&self) -> u64 {
    saturate(self.total_bytes)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.map.len()
  }

  /// Looks up `key` and records a use at `generation` on a hit.
  pub(crate) fn get<Q>(&self, key: &Q, generation: u64) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.map.get(key).map(|entry| {
      entry.touch(generation);
      entry.value()
    })
  }

  /// Looks up `key` without recording a use.
  pub(crate) fn peek<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.map.get(key).map(CacheEntry::value)
  }

  pub(crate) fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.map.contains_key(key)
  }

  /// Inserts or replaces `key`, then evicts until the store is within
  /// `limits`.
  ///
  /// The inserted entry is never chosen as a victim, so an oversized value is
  /// always admitted. Eviction stops at `limits.minimum_items` even when that
  /// leaves the store over its byte budget.
  pub(crate) fn insert(
    &mut self,
    key: K,
    value: Arc<V>,
    size: u64,
    generation: u64,
    limits: CacheLimits,
  ) -> InsertOutcome<K, V> {
    let replaced = self
      .map
      .insert(key.clone(), CacheEntry::new(value, size, generation))
      .map(|old| {
        self.total_bytes -= u128::from(old.size());
        Removed {
          key: key.clone(),
          value: old.value(),
          size: old.size(),
        }
      });
    self.total_bytes += u128::from(size);
    self.queue.push(generation, key.clone());

    let evicted = self.evict(limits, &key);
    self.compact_if_needed();

    InsertOutcome {
      replaced,
      evicted,
      total_bytes: self.total_bytes(),
      items: self.map.len(),
    }
  }

  /// Removes `key`, returning its entry.
  ///
  /// The queue item for the key is left behind and discarded lazily.
  pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<Removed<K, V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let (key, entry) = self.map.remove_entry(key)?;
    self.total_bytes -= u128::from(entry.size());
    Some(Removed {
      key,
      value: entry.value(),
      size: entry.size(),
    })
  }

  /// Removes every entry, returning them so they can be dropped outside the
  /// lock.
  pub(crate) fn clear(&mut self) -> Vec<Removed<K, V>> {
    self.queue.clear();
    self.total_bytes = 0;
    self
      .map
      .drain()
      .map(|(key, entry)| Removed {
        key,
        value: entry.value(),
        size: entry.size(),
      })
      .collect()
  }

  fn evict(&mut self, limits: CacheLimits, protected: &K) -> Vec<Removed<K, V>> {
    let mut evicted = Vec::new();
    let mut held_back = None;

    let byte_budget = u128::from(limits.byte_budget);
    while self.total_bytes > byte_budget && self.map.len() > limits.minimum_items {
      match self.pop_victim(protected, &mut held_back) {
        Some(victim) => evicted.push(victim),
        None => break,
      }
    }

    if let Some((marker, key)) = held_back {
      self.queue.push(marker, key);
    }
    evicted
  }

  /// Pops queue items until one names the least recently used live entry
  /// other than `protected`, and removes that entry.
  fn pop_victim(
    &mut self,
    protected: &K,
    held_back: &mut Option<(u64, K)>,
  ) -> Option<Removed<K, V>> {
    loop {
      let (marker, key) = self.queue.pop()?;

      let Some(entry) = self.map.get_mut(&key) else {
        // Invalidated since it was queued.
        continue;
      };
      if entry.queued_at() != marker {
        // Superseded by a later queue item for the same key.
        continue;
      }
      if key == *protected {
        *held_back = Some((marker, key));
        continue;
      }

      let last_used = entry.last_used();
      if last_used != marker {
        // Used since it was queued. Reposition it under its real marker.
        entry.set_queued_at(last_used);
        self.queue.push(last_used, key);
        continue;
      }

      return self.remove(&key);
    }
  }

  fn compact_if_needed(&mut self) {
    if self.queue.len() <= self.map.len() * 2 + QUEUE_COMPACTION_SLACK {
      return;
    }
    self.queue.rebuild(
      self
        .map
        .iter()
        .map(|(key, entry)| (entry.queued_at(), key.clone())),
    );
  }

  /// Recomputes the byte total by walking every entry. Test-only.
  #[cfg(test)]
  pub(crate) fn recount_bytes(&self) -> u64 {
    saturate(self.map.values().map(|entry| u128::from(entry.size())).sum())
  }

  #[cfg(test)]
  pub(crate) fn queue_len(&self) -> usize {
    self.queue.len()
  }
}
