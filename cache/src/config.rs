//! Sizing and enablement settings, and the provider trait through which a
//! cache reads them on every operation.
//!
//! Settings may change at any time. Nothing here migrates existing entries on
//! a change: the next insert simply enforces whatever limits are current.

#[cfg(feature = "serde")]
use crate::error::Result;

#[cfg(feature = "serde")]
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::Deserialize;

/// The default byte budget: 40 MiB.
pub const DEFAULT_BYTE_BUDGET: u64 = 40 * 1024 * 1024;
/// The default number of entries kept regardless of the byte budget.
pub const DEFAULT_MINIMUM_ITEMS: usize = 16;

/// The two thresholds that drive eviction.
///
/// Every pair of values is valid. A zero `byte_budget` keeps only the
/// `minimum_items` most recently used entries, and never fewer than the one
/// just inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
  /// Ceiling on the total size of cached values, in bytes.
  pub byte_budget: u64,
  /// Entries retained even when that leaves the cache over `byte_budget`.
  pub minimum_items: usize,
}

impl Default for CacheLimits {
  fn default() -> Self {
    Self {
      byte_budget: DEFAULT_BYTE_BUDGET,
      minimum_items: DEFAULT_MINIMUM_ITEMS,
    }
  }
}

/// A complete settings snapshot for a cache.
///
/// With the `serde` feature this deserializes from YAML such as:
///
/// ```yaml
/// enabled: true
/// byte_budget: 41943040
/// minimum_items: 16
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CacheSettings {
  /// Whether caching is switched on at all.
  pub enabled: bool,
  pub byte_budget: u64,
  pub minimum_items: usize,
}

impl Default for CacheSettings {
  fn default() -> Self {
    Self {
      enabled: true,
      byte_budget: DEFAULT_BYTE_BUDGET,
      minimum_items: DEFAULT_MINIMUM_ITEMS,
    }
  }
}

impl CacheSettings {
  /// Returns the eviction thresholds of these settings.
  pub fn limits(&self) -> CacheLimits {
    CacheLimits {
      byte_budget: self.byte_budget,
      minimum_items: self.minimum_items,
    }
  }

  /// Parses settings from a YAML document. Missing fields take their
  /// defaults.
  #[cfg(feature = "serde")]
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(yaml)?)
  }

  /// Reads and parses settings from a YAML file.
  #[cfg(feature = "serde")]
  pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
    let contents = std::fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }
}

/// A source of live cache settings.
///
/// Implementations must be cheap to poll: the cache reads them on every `get`
/// and `insert`, always outside its critical section.
pub trait ConfigProvider: Send + Sync {
  fn settings(&self) -> CacheSettings;
}

/// Fixed settings never change.
impl ConfigProvider for CacheSettings {
  fn settings(&self) -> CacheSettings {
    *self
  }
}

impl<P: ConfigProvider + ?Sized> ConfigProvider for Arc<P> {
  fn settings(&self) -> CacheSettings {
    (**self).settings()
  }
}

/// Settings that can be swapped at runtime without restarting the cache.
#[derive(Debug, Default)]
pub struct ReloadableConfig {
  current: RwLock<CacheSettings>,
}

impl ReloadableConfig {
  pub fn new(settings: CacheSettings) -> Self {
    Self {
      current: RwLock::new(settings),
    }
  }

  /// Replaces the current settings.
  pub fn update(&self, settings: CacheSettings) {
    let previous = std::mem::replace(&mut *self.current.write(), settings);
    if previous != settings {
      tracing::info!(
        enabled = settings.enabled,
        byte_budget = settings.byte_budget,
        minimum_items = settings.minimum_items,
        "cache settings updated"
      );
    }
  }

  /// Flips only the enabled flag.
  pub fn set_enabled(&self, enabled: bool) {
    let mut guard = self.current.write();
    if guard.enabled != enabled {
      guard.enabled = enabled;
      drop(guard);
      tracing::info!(enabled, "cache enablement changed");
    }
  }

  /// Reloads settings from a YAML document. On error the current settings
  /// are kept.
  #[cfg(feature = "serde")]
  pub fn reload_from_str(&self, yaml: &str) -> Result<()> {
    self.update(CacheSettings::from_yaml_str(yaml)?);
    Ok(())
  }

  /// Reloads settings from a YAML file. On error the current settings are
  /// kept.
  #[cfg(feature = "serde")]
  pub fn reload_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let settings = CacheSettings::from_yaml_file(path).inspect_err(|e| {
      tracing::warn!(path = %path.display(), error = %e, "failed to reload cache settings");
    })?;
    self.update(settings);
    Ok(())
  }
}

impl ConfigProvider for ReloadableConfig {
  fn settings(&self) -> CacheSettings {
    *self.current.read()
  }
}
