use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// Receives cache lifecycle events.
///
/// Calls are fire-and-forget and happen on the caller's thread, so an
/// implementation should be cheap. Each cache instance is handed its own
/// sink; nothing here is process-wide.
pub trait MetricsSink: Send + Sync {
  /// A lookup found a live entry.
  fn hit(&self);
  /// A lookup found nothing (or only an expired entry) and went to the loader.
  fn miss(&self);
  /// An entry was removed to make room under the shard's capacity.
  fn eviction(&self);
  /// An entry was found past its expiry and removed.
  fn expire(&self);
  /// The refresh hook was invoked for a successful read.
  fn refresh(&self);
}

/// A sink that ignores every event. Used when no metrics are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
  fn hit(&self) {}
  fn miss(&self) {}
  fn eviction(&self) {}
  fn expire(&self) {}
  fn refresh(&self) {}
}

/// A thread-safe metrics collector backed by atomic counters.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub struct CacheMetrics {
  hits: CachePadded<AtomicU64>,
  misses: CachePadded<AtomicU64>,
  evictions: CachePadded<AtomicU64>,
  expirations: CachePadded<AtomicU64>,
  refreshes: CachePadded<AtomicU64>,
  created_at: Instant,
}

// Manual implementation of Default to handle the non-default `Instant`.
impl Default for CacheMetrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      evictions: CachePadded::new(AtomicU64::new(0)),
      expirations: CachePadded::new(AtomicU64::new(0)),
      refreshes: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl CacheMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a point-in-time snapshot of the current counters.
  pub fn snapshot(&self) -> MetricsSnapshot {
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
      evictions: self.evictions.load(Ordering::Relaxed),
      expirations: self.expirations.load(Ordering::Relaxed),
      refreshes: self.refreshes.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

impl MetricsSink for CacheMetrics {
  fn hit(&self) {
    self.hits.fetch_add(1, Ordering::Relaxed);
  }

  fn miss(&self) {
    self.misses.fetch_add(1, Ordering::Relaxed);
  }

  fn eviction(&self) {
    self.evictions.fetch_add(1, Ordering::Relaxed);
  }

  fn expire(&self) {
    self.expirations.fetch_add(1, Ordering::Relaxed);
  }

  fn refresh(&self) {
    self.refreshes.fetch_add(1, Ordering::Relaxed);
  }
}

/// A point-in-time, public-facing snapshot of a `CacheMetrics` collector.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// The number of successful lookups.
  pub hits: u64,
  /// The number of lookups that went to the loader.
  pub misses: u64,
  /// The cache hit ratio (hits / (hits + misses)).
  pub hit_ratio: f64,
  /// The number of entries evicted due to shard capacity.
  pub evictions: u64,
  /// The number of entries removed because their expiry had passed.
  pub expirations: u64,
  /// The number of refresh hook invocations.
  pub refreshes: u64,
  /// The number of seconds since the collector was created.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("evictions", &self.evictions)
      .field("expirations", &self.expirations)
      .field("refreshes", &self.refreshes)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
