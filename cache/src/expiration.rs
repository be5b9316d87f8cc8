use crate::entry::Timestamps;
use crate::time;

use std::time::{Duration, Instant};

/// Decides when an entry is stale and how reads and writes move its expiry.
///
/// Expiry is only ever checked lazily, when an entry is accessed.
pub trait ExpirationStrategy: Send + Sync {
  /// Returns `true` if the entry must no longer be served at `now`.
  fn is_expired(&self, times: &Timestamps, now: Instant) -> bool;

  /// Called after every successful read.
  fn on_access(&self, times: &Timestamps, now: Instant);

  /// Called whenever an entry is written or replaced, before it is stored.
  fn on_write(&self, times: &Timestamps, now: Instant);
}

/// Sliding TTL: every successful read pushes the expiry `ttl` into the future.
///
/// A TTL given explicitly at write time is kept; the strategy only fills in
/// an expiry when none is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireAfterAccess {
  ttl: Duration,
}

impl ExpireAfterAccess {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }
}

impl ExpirationStrategy for ExpireAfterAccess {
  fn is_expired(&self, times: &Timestamps, now: Instant) -> bool {
    times.expires_at().is_some_and(|expires_at| now > expires_at)
  }

  fn on_access(&self, times: &Timestamps, now: Instant) {
    times.set_last_accessed(now);
    times.set_expires_at(time::deadline(now, self.ttl));
  }

  fn on_write(&self, times: &Timestamps, now: Instant) {
    times.set_created_at(now);
    times.set_last_accessed(now);
    if !times.has_expiry() {
      times.set_expires_at(time::deadline(now, self.ttl));
    }
  }
}
