use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A container for a value in the cache, holding all necessary metadata.
///
/// Entries are never mutated in place apart from their recency marker; a
/// replacement always creates a new entry.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  /// The user's value, wrapped in an Arc for shared ownership.
  value: Arc<V>,
  /// The byte size attributed to this entry, computed once on insert.
  size: u64,
  /// The generation of the most recent use. Updated on every hit.
  last_used: AtomicU64,
  /// The marker under which this entry currently sits in the victim queue.
  /// Only changed while the store is exclusively locked.
  queued_at: u64,
}

impl<V> CacheEntry<V> {
  /// Creates a new `CacheEntry`, stamped with the generation of its insertion.
  pub(crate) fn new(value: Arc<V>, size: u64, generation: u64) -> Self {
    Self {
      value,
      size,
      last_used: AtomicU64::new(generation),
      queued_at: generation,
    }
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  /// Returns the size of the entry in bytes.
  #[inline]
  pub(crate) fn size(&self) -> u64 {
    self.size
  }

  #[inline]
  pub(crate) fn last_used(&self) -> u64 {
    self.last_used.load(Ordering::Relaxed)
  }

  #[inline]
  pub(crate) fn queued_at(&self) -> u64 {
    self.queued_at
  }

  #[inline]
  pub(crate) fn set_queued_at(&mut self, marker: u64) {
    self.queued_at = marker;
  }

  /// Records a use at `generation`.
  ///
  /// This is a cheap atomic operation and may run under a shared lock. The
  /// marker never moves backwards, even when two readers race.
  #[inline]
  pub(crate) fn touch(&self, generation: u64) {
    self.last_used.fetch_max(generation, Ordering::Relaxed);
  }
}
