//! Pull-based gauges and the scoped handle that keeps one registered.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A callback that reports a gauge's current value when polled.
pub type GaugeFn = Arc<dyn Fn() -> u64 + Send + Sync>;

/// A destination for named, pull-based gauges.
///
/// A sink only stores callbacks; it polls them whenever it likes. Callbacks
/// must therefore be cheap and must not assume anything about the calling
/// thread.
pub trait MetricsSink: Send + Sync {
  /// Registers `gauge` under `name`, replacing any gauge already there.
  fn register_gauge(&self, name: &str, gauge: GaugeFn);

  /// Removes the gauge registered under `name`, if any.
  fn unregister_gauge(&self, name: &str);
}

/// Keeps a gauge registered for as long as it is alive.
///
/// Dropping the handle unregisters the gauge, which ties a gauge's lifetime
/// to the object it reports on.
#[must_use = "the gauge is unregistered as soon as the registration is dropped"]
pub struct GaugeRegistration {
  sink: Arc<dyn MetricsSink>,
  name: String,
}

impl GaugeRegistration {
  pub fn register<F>(sink: Arc<dyn MetricsSink>, name: impl Into<String>, gauge: F) -> Self
  where
    F: Fn() -> u64 + Send + Sync + 'static,
  {
    let name = name.into();
    sink.register_gauge(&name, Arc::new(gauge));
    tracing::info!(gauge = %name, "registered gauge");
    Self { sink, name }
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

impl fmt::Debug for GaugeRegistration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GaugeRegistration")
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}

impl Drop for GaugeRegistration {
  fn drop(&mut self) {
    self.sink.unregister_gauge(&self.name);
    tracing::info!(gauge = %self.name, "unregistered gauge");
  }
}

/// An in-process [`MetricsSink`] that can be polled by name.
#[derive(Default)]
pub struct GaugeRegistry {
  gauges: RwLock<HashMap<String, GaugeFn>>,
}

impl fmt::Debug for GaugeRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GaugeRegistry")
      .field("names", &self.names())
      .finish()
  }
}

impl GaugeRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Polls the gauge registered under `name`.
  ///
  /// The callback runs after the registry lock is released, so a gauge may
  /// take locks of its own.
  pub fn read(&self, name: &str) -> Option<u64> {
    let gauge = self.gauges.read().get(name).cloned()?;
    Some(gauge())
  }

  /// Returns the registered names in sorted order.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.gauges.read().keys().cloned().collect();
    names.sort();
    names
  }

  /// Polls every registered gauge.
  pub fn snapshot(&self) -> BTreeMap<String, u64> {
    let gauges: Vec<(String, GaugeFn)> = self
      .gauges
      .read()
      .iter()
      .map(|(name, gauge)| (name.clone(), gauge.clone()))
      .collect();
    gauges
      .into_iter()
      .map(|(name, gauge)| (name, gauge()))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.gauges.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl MetricsSink for GaugeRegistry {
  fn register_gauge(&self, name: &str, gauge: GaugeFn) {
    if self.gauges.write().insert(name.to_string(), gauge).is_some() {
      tracing::warn!(gauge = %name, "replaced an existing gauge with the same name");
    }
  }

  fn unregister_gauge(&self, name: &str) {
    self.gauges.write().remove(name);
  }
}
