use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::expiration::ExpirationStrategy;
use crate::loader::{LoadResult, Loader};
use crate::metrics::MetricsSink;
use crate::refresh::RefreshHook;
use crate::write_policy::WritePolicy;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// The collaborators every shard shares: expiration, refresh, loading,
/// write propagation and metrics. The engine owns no entries.
pub(crate) struct CacheEngine<V> {
  pub(crate) expiration: Option<Arc<dyn ExpirationStrategy>>,
  pub(crate) refresh: Option<Arc<dyn RefreshHook<V>>>,
  pub(crate) loader: Option<Arc<dyn Loader<V>>>,
  pub(crate) write_policy: Option<Arc<dyn WritePolicy<V>>>,
  pub(crate) metrics: Arc<dyn MetricsSink>,
  closed: AtomicBool,
}

impl<V> CacheEngine<V> {
  pub(crate) fn new(
    expiration: Option<Arc<dyn ExpirationStrategy>>,
    refresh: Option<Arc<dyn RefreshHook<V>>>,
    loader: Option<Arc<dyn Loader<V>>>,
    write_policy: Option<Arc<dyn WritePolicy<V>>>,
    metrics: Arc<dyn MetricsSink>,
  ) -> Self {
    Self {
      expiration,
      refresh,
      loader,
      write_policy,
      metrics,
      closed: AtomicBool::new(false),
    }
  }

  /// Without an expiration strategy nothing expires by time.
  pub(crate) fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
    self
      .expiration
      .as_ref()
      .is_some_and(|strategy| strategy.is_expired(entry.timestamps(), now))
  }

  /// Runs after every successful read.
  pub(crate) fn on_read(&self, key: &str, entry: &CacheEntry<V>, now: Instant) {
    if let Some(strategy) = &self.expiration {
      strategy.on_access(entry.timestamps(), now);
    }
    if let Some(hook) = &self.refresh {
      hook.on_read(key, entry);
      self.metrics.refresh();
    }
  }

  /// Runs for every write, before the entry is published. Entries that carry
  /// an expiry once the strategy has run are not forwarded to the write
  /// policy.
  pub(crate) fn on_write(&self, entry: &CacheEntry<V>, now: Instant) {
    if let Some(strategy) = &self.expiration {
      strategy.on_write(entry.timestamps(), now);
    }
    if entry.timestamps().has_expiry() {
      return;
    }
    if let Some(policy) = &self.write_policy {
      policy.on_write(entry.key(), entry.value_ref());
    }
  }

  /// Fetches `key` from the backing store. `Ok(None)` when no loader is
  /// configured.
  pub(crate) fn load(&self, key: &str) -> LoadResult<V> {
    let Some(loader) = &self.loader else {
      return Ok(None);
    };
    match loader.load(key) {
      Ok(value) => Ok(value.map(Arc::new)),
      Err(e) => Err(CacheError::Load(Arc::from(e))),
    }
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }

  /// Closes the write policy. Only the first call has any effect.
  pub(crate) fn close(&self) {
    if self.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    if let Some(policy) = &self.write_policy {
      policy.close();
    }
  }
}
