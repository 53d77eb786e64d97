use crate::cache::ObjectCache;
use crate::config::ConfigProvider;
use crate::gauge::{GaugeRegistration, MetricsSink};
use crate::metrics::{CacheStats, MetricsSnapshot};
use crate::tree::{ObjectId, Tree};

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// The name under which a [`TreeCache`] registers its gauges by default.
pub const DEFAULT_TREE_CACHE_NAME: &str = "tree_cache";

/// An in-memory cache of [`Tree`] objects that follows live settings.
///
/// Every call polls the [`ConfigProvider`]. While caching is disabled, `get`
/// always misses and `insert` does nothing, leaving the underlying cache
/// untouched. While enabled, each insert first applies the current byte
/// budget and minimum item count.
///
/// Two gauges, `<name>.memory` and `<name>.items`, are registered with the
/// [`MetricsSink`] on construction and removed when the cache is dropped.
pub struct TreeCache {
  cache: Arc<ObjectCache<ObjectId, Tree>>,
  config: Arc<dyn ConfigProvider>,
  dropped_while_disabled: AtomicU64,
  _gauges: [GaugeRegistration; 2],
}

impl fmt::Debug for TreeCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TreeCache")
      .field("cache", &self.cache)
      .field("gauges", &self._gauges)
      .finish_non_exhaustive()
  }
}

impl TreeCache {
  /// Creates a tree cache registered under [`DEFAULT_TREE_CACHE_NAME`].
  pub fn new(config: Arc<dyn ConfigProvider>, sink: Arc<dyn MetricsSink>) -> Self {
    Self::with_name(DEFAULT_TREE_CACHE_NAME, config, sink)
  }

  /// Creates a tree cache whose gauges are prefixed with `name`.
  pub fn with_name(name: &str, config: Arc<dyn ConfigProvider>, sink: Arc<dyn MetricsSink>) -> Self {
    let settings = config.settings();
    let cache: Arc<ObjectCache<ObjectId, Tree>> =
      Arc::new(ObjectCache::builder().settings(&settings).build());

    let memory = {
      let cache = Arc::downgrade(&cache);
      GaugeRegistration::register(sink.clone(), format!("{name}.memory"), move || {
        read_stat(&cache, |stats| stats.total_size_in_bytes)
      })
    };
    let items = {
      let cache = Arc::downgrade(&cache);
      GaugeRegistration::register(sink, format!("{name}.items"), move || {
        read_stat(&cache, |stats| stats.object_count)
      })
    };

    tracing::info!(
      cache = name,
      enabled = settings.enabled,
      byte_budget = settings.byte_budget,
      minimum_items = settings.minimum_items,
      "tree cache created"
    );

    Self {
      cache,
      config,
      dropped_while_disabled: AtomicU64::new(0),
      _gauges: [memory, items],
    }
  }

  /// Returns the cached tree for `id`, or `None` on a miss or while caching
  /// is disabled.
  pub fn get(&self, id: &ObjectId) -> Option<Arc<Tree>> {
    if !self.config.settings().enabled {
      return None;
    }
    self.cache.get(id)
  }

  /// Caches `tree` under `id`. Does nothing while caching is disabled.
  pub fn insert(&self, id: ObjectId, tree: Arc<Tree>) {
    let settings = self.config.settings();
    if !settings.enabled {
      self.dropped_while_disabled.fetch_add(1, Ordering::Relaxed);
      tracing::trace!(%id, "tree cache disabled, dropping insert");
      return;
    }
    self.cache.set_limits(settings.limits());
    self.cache.insert(id, tree);
  }

  /// Returns whether caching is currently enabled.
  pub fn is_enabled(&self) -> bool {
    self.config.settings().enabled
  }

  pub fn stats(&self) -> CacheStats {
    self.cache.stats()
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.cache.metrics()
  }

  /// The number of inserts discarded because caching was disabled.
  pub fn dropped_while_disabled(&self) -> u64 {
    self.dropped_while_disabled.load(Ordering::Relaxed)
  }

  /// The underlying cache, for operations the wrapper does not gate such as
  /// `invalidate` and `clear`.
  pub fn object_cache(&self) -> &ObjectCache<ObjectId, Tree> {
    &self.cache
  }
}

/// Reads one field of a cache's stats, or 0 once the cache is gone.
fn read_stat(cache: &Weak<ObjectCache<ObjectId, Tree>>, field: impl Fn(CacheStats) -> u64) -> u64 {
  cache.upgrade().map_or(0, |cache| field(cache.stats()))
}
