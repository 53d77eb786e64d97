use std::fmt;
use std::sync::Arc;

/// Describes the reason an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
  /// The entry was the least recently used one while the cache was over its
  /// byte budget.
  Capacity,
  /// An insert of the same key replaced the entry.
  Replaced,
  /// The entry was removed through `invalidate`.
  Invalidated,
  /// The whole cache was cleared.
  Cleared,
}

impl fmt::Display for EvictionReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EvictionReason::Capacity => write!(f, "evicted due to capacity"),
      EvictionReason::Replaced => write!(f, "replaced by a newer value"),
      EvictionReason::Invalidated => write!(f, "manually invalidated"),
      EvictionReason::Cleared => write!(f, "cache cleared"),
    }
  }
}

/// A listener that can be registered with the cache to receive notifications
/// when entries are removed.
///
/// `on_evict` runs on the thread that caused the removal, after the cache
/// lock has been released, so it may call back into the cache. The value is
/// the cache's former share; other holders are unaffected.
pub trait EvictionListener<K, V>: Send + Sync {
  fn on_evict(&self, key: K, value: Arc<V>, reason: EvictionReason);
}

impl<K, V, F> EvictionListener<K, V> for F
where
  F: Fn(K, Arc<V>, EvictionReason) + Send + Sync,
{
  fn on_evict(&self, key: K, value: Arc<V>, reason: EvictionReason) {
    self(key, value, reason)
  }
}
