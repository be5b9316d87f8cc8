use crate::time;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The mutable timestamps of a cache entry.
///
/// Stored as atomics holding nanoseconds since a process-wide epoch, so the
/// expiration hooks can update them through a shared reference. Concurrent
/// updates race freely; the last writer wins.
#[derive(Debug)]
pub struct Timestamps {
  created_at: AtomicU64,
  last_accessed: AtomicU64,
  /// 0 means no expiry is recorded.
  expires_at: AtomicU64,
}

impl Timestamps {
  pub(crate) fn new(now: Instant, ttl: Option<Duration>) -> Self {
    let now_nanos = time::instant_to_nanos(now);
    let expires_at = ttl.map_or(0, |ttl| time::instant_to_nanos(time::deadline(now, ttl)));
    Self {
      created_at: AtomicU64::new(now_nanos),
      last_accessed: AtomicU64::new(now_nanos),
      expires_at: AtomicU64::new(expires_at),
    }
  }

  pub fn created_at(&self) -> Instant {
    time::nanos_to_instant(self.created_at.load(Ordering::Relaxed))
  }

  pub fn set_created_at(&self, at: Instant) {
    self
      .created_at
      .store(time::instant_to_nanos(at), Ordering::Relaxed);
  }

  pub fn last_accessed(&self) -> Instant {
    time::nanos_to_instant(self.last_accessed.load(Ordering::Relaxed))
  }

  pub fn set_last_accessed(&self, at: Instant) {
    self
      .last_accessed
      .store(time::instant_to_nanos(at), Ordering::Relaxed);
  }

  /// Returns the recorded expiry, or `None` if the entry has no expiry.
  pub fn expires_at(&self) -> Option<Instant> {
    match self.expires_at.load(Ordering::Relaxed) {
      0 => None,
      nanos => Some(time::nanos_to_instant(nanos)),
    }
  }

  pub fn set_expires_at(&self, at: Instant) {
    self
      .expires_at
      .store(time::instant_to_nanos(at), Ordering::Relaxed);
  }

  #[inline]
  pub fn has_expiry(&self) -> bool {
    self.expires_at.load(Ordering::Relaxed) != 0
  }
}

/// A value stored in the cache together with its key and timestamps.
///
/// Entries are shared between store snapshots through an `Arc`, so a
/// timestamp update is visible to every snapshot holding the entry.
#[derive(Debug)]
pub struct CacheEntry<V> {
  key: String,
  value: Arc<V>,
  timestamps: Timestamps,
}

impl<V> CacheEntry<V> {
  /// Creates an entry written at `now`, with an explicit expiry of
  /// `now + ttl` when a TTL is given.
  pub(crate) fn new(key: String, value: Arc<V>, now: Instant, ttl: Option<Duration>) -> Self {
    Self {
      key,
      value,
      timestamps: Timestamps::new(now, ttl),
    }
  }

  #[inline]
  pub fn key(&self) -> &str {
    &self.key
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  #[inline]
  pub(crate) fn value_ref(&self) -> &Arc<V> {
    &self.value
  }

  #[inline]
  pub fn timestamps(&self) -> &Timestamps {
    &self.timestamps
  }
}
