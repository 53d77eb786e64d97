use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the cache.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Hit/Miss Ratios ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,

  // --- Throughput ---
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) replacements: CachePadded<AtomicU64>,
  pub(crate) invalidations: CachePadded<AtomicU64>,

  // --- Eviction Stats ---
  pub(crate) evicted_by_capacity: CachePadded<AtomicU64>,
  pub(crate) oversized_admissions: CachePadded<AtomicU64>,

  // --- Size ---
  pub(crate) total_bytes_added: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      replacements: CachePadded::new(AtomicU64::new(0)),
      invalidations: CachePadded::new(AtomicU64::new(0)),
      evicted_by_capacity: CachePadded::new(AtomicU64::new(0)),
      oversized_admissions: CachePadded::new(AtomicU64::new(0)),
      total_bytes_added: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn record(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the counters. `stats` carries the
  /// current totals, which live under the cache lock rather than here.
  pub(crate) fn snapshot(&self, stats: CacheStats) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + misses;

    MetricsSnapshot {
      hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      replacements: self.replacements.load(Ordering::Relaxed),
      invalidations: self.invalidations.load(Ordering::Relaxed),
      evicted_by_capacity: self.evicted_by_capacity.load(Ordering::Relaxed),
      oversized_admissions: self.oversized_admissions.load(Ordering::Relaxed),
      total_bytes_added: self.total_bytes_added.load(Ordering::Relaxed),
      total_size_in_bytes: stats.total_size_in_bytes,
      object_count: stats.object_count,
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// The two running totals of a cache, read together under its lock.
///
/// This is what the `.memory` and `.items` gauges report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
  /// Sum of the sizes of all live entries.
  pub total_size_in_bytes: u64,
  /// Number of live entries.
  pub object_count: u64,
}

/// A point-in-time, public-facing snapshot of the cache's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// The number of `get` calls that found their key.
  pub hits: u64,
  /// The number of `get` calls that did not.
  pub misses: u64,
  /// The cache hit ratio (hits / (hits + misses)).
  pub hit_ratio: f64,
  /// The number of inserts of keys that were not present.
  pub inserts: u64,
  /// The number of inserts that replaced a present key.
  pub replacements: u64,
  /// The number of manual invalidations.
  pub invalidations: u64,
  /// The number of entries evicted to stay within the byte budget.
  pub evicted_by_capacity: u64,
  /// The number of values admitted although they alone exceeded the byte
  /// budget.
  pub oversized_admissions: u64,
  /// The cumulative size of every value ever inserted.
  pub total_bytes_added: u64,
  pub total_size_in_bytes: u64,
  pub object_count: u64,
  /// The number of seconds the cache has been running.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("inserts", &self.inserts)
      .field("replacements", &self.replacements)
      .field("invalidations", &self.invalidations)
      .field("evicted_by_capacity", &self.evicted_by_capacity)
      .field("oversized_admissions", &self.oversized_admissions)
      .field("total_bytes_added", &self.total_bytes_added)
      .field("total_size_in_bytes", &self.total_size_in_bytes)
      .field("object_count", &self.object_count)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
