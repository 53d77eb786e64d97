use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// A monotonically increasing source of recency markers.
///
/// Every insert and every hit takes a fresh generation, so no two uses ever
/// share a marker.
#[derive(Debug, Default)]
pub(crate) struct RecencyClock {
  next: CachePadded<AtomicU64>,
}

impl RecencyClock {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Returns the next generation.
  #[inline]
  pub(crate) fn tick(&self) -> u64 {
    self.next.fetch_add(1, Ordering::Relaxed) + 1
  }
}

/// A min-ordered queue of `(marker, key)` pairs used to pick eviction victims.
///
/// The queue is lazy: hits only bump an entry's atomic marker and never touch
/// the queue, so an item popped from here may be out of date. The store
/// resolves this by comparing the popped marker against the entry and
/// re-queueing it under its current marker when it has been used since. Since
/// a queued marker is never newer than the entry's real one, the first popped
/// item that is still current is the true least-recently-used entry.
#[derive(Debug)]
pub(crate) struct VictimQueue<K: Ord> {
  heap: BinaryHeap<Reverse<(u64, K)>>,
}

impl<K: Ord> VictimQueue<K> {
  pub(crate) fn new() -> Self {
    Self {
      heap: BinaryHeap::new(),
    }
  }

  #[inline]
  pub(crate) fn push(&mut self, marker: u64, key: K) {
    self.heap.push(Reverse((marker, key)));
  }

  /// Removes and returns the pair with the oldest marker. Equal markers are
  /// ordered by key.
  #[inline]
  pub(crate) fn pop(&mut self) -> Option<(u64, K)> {
    self.heap.pop().map(|Reverse(item)| item)
  }

  pub(crate) fn len(&self) -> usize {
    self.heap.len()
  }

  pub(crate) fn clear(&mut self) {
    self.heap.clear();
  }

  /// Replaces the queue contents with `items`, discarding everything stale.
  pub(crate) fn rebuild(&mut self, items: impl IntoIterator<Item = (u64, K)>) {
    let items: Vec<_> = items.into_iter().map(Reverse).collect();
    self.heap = BinaryHeap::from(items);
  }
}
