//! A concurrent, byte-budgeted object cache for content-addressed data.
//!
//! # Features
//! - **Byte Budget with a Floor**: Bounded by the total size of its values, but
//!   never evicts below a configured minimum number of entries.
//! - **Shared Values**: Stores values in an `Arc<V>`; handles returned by `get`
//!   outlive eviction.
//! - **Recency-Based Eviction**: The least recently used entry is always the
//!   next victim, found without a full scan.
//! - **Live Reconfiguration**: Limits and the enabled flag are read from a
//!   [`ConfigProvider`] on every call.
//! - **Observability**: Pull-based gauges for byte usage and item count, and
//!   hit/miss/eviction counters.

// Public modules that form the API
pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod gauge;
pub mod listener;
pub mod metrics;
pub mod size;
pub mod tree;
pub mod tree_cache;

// Internal, crate-only modules
mod entry;
mod recency;
mod store;

// Re-export the primary user-facing types for convenience
pub use builder::ObjectCacheBuilder;
pub use cache::ObjectCache;
pub use config::{CacheLimits, CacheSettings, ConfigProvider, ReloadableConfig};
pub use error::ConfigError;
pub use gauge::{GaugeRegistration, GaugeRegistry, MetricsSink};
pub use listener::{EvictionListener, EvictionReason};
pub use metrics::{CacheStats, MetricsSnapshot};
pub use size::ObjectSize;
pub use tree::{ObjectId, Tree, TreeEntry, TreeEntryKind};
pub use tree_cache::TreeCache;
