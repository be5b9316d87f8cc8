use crate::error::CacheError;
use crate::shared::CacheShared;

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The remaining lifetime of a key, as reported by [`Cache::ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
  /// The key has an expiry that lies this far in the future.
  Remaining(Duration),
  /// The key exists and has no expiry.
  Persistent,
  /// The key is absent, or its expiry has already passed.
  Missing,
}

impl Ttl {
  /// The Redis-style integer form: remaining milliseconds, `-1` for a key
  /// without expiry, `-2` for a missing key.
  pub fn as_millis(&self) -> i64 {
    match self {
      Ttl::Remaining(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX).max(1),
      Ttl::Persistent => -1,
      Ttl::Missing => -2,
    }
  }

  pub fn remaining(&self) -> Option<Duration> {
    match self {
      Ttl::Remaining(d) => Some(*d),
      _ => None,
    }
  }
}

/// A thread-safe, sharded in-memory cache.
///
/// `Cache` is a cheap handle: clones share the same shards, loader and write
/// policy. The write policy is closed when [`close`](Cache::close) is called
/// or when the last handle is dropped.
pub struct Cache<V: Send + Sync + 'static> {
  pub(crate) shared: Arc<CacheShared<V>>,
}

impl<V: Send + Sync + 'static> Clone for Cache<V> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<V: Send + Sync + 'static> fmt::Debug for Cache<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cache")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<V: Send + Sync + 'static> Cache<V> {
  /// Retrieves a value from the cache.
  ///
  /// On a miss the configured loader is consulted. Concurrent misses for the
  /// same key share one load, and every waiting caller gets the same result.
  /// A loaded value is cached without a TTL. Without a loader a miss returns
  /// `Ok(None)`.
  pub fn get(&self, key: &str) -> Result<Option<Arc<V>>, CacheError> {
    self.shared.get(key)
  }

  /// Inserts a value with no explicit expiry.
  pub fn put(&self, key: impl Into<String>, value: V) -> Result<(), CacheError> {
    self.put_arc(key, Arc::new(value), Duration::ZERO)
  }

  /// Inserts a value that expires `ttl` from now. A zero `ttl` means no
  /// explicit expiry, exactly like [`put`](Cache::put).
  pub fn put_with_ttl(
    &self,
    key: impl Into<String>,
    value: V,
    ttl: Duration,
  ) -> Result<(), CacheError> {
    self.put_arc(key, Arc::new(value), ttl)
  }

  /// Inserts an already shared value.
  pub fn put_arc(
    &self,
    key: impl Into<String>,
    value: Arc<V>,
    ttl: Duration,
  ) -> Result<(), CacheError> {
    let key = key.into();
    let ttl = (!ttl.is_zero()).then_some(ttl);
    self.shared.insert(&key, value, ttl)
  }

  /// Removes a key from the cache. Removing an absent key is a no-op. The
  /// backing store is never touched.
  pub fn remove(&self, key: &str) {
    self.shared.remove(key);
  }

  /// Sets the key's expiry to `ttl` from now. Returns `false` if the key is
  /// not cached.
  pub fn expire(&self, key: &str, ttl: Duration) -> bool {
    self.shared.expire(key, ttl)
  }

  /// Reports how long the key has left to live.
  pub fn ttl(&self, key: &str) -> Ttl {
    self.shared.ttl(key)
  }

  /// Flushes and releases the write policy. A write-back queue is drained
  /// before this returns. Later calls do nothing, and writes made after
  /// closing fail with [`CacheError::Closed`].
  pub fn close(&self) {
    self.shared.engine.close();
  }

  /// The number of cached entries, including any that have expired but have
  /// not been accessed since.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn shard_count(&self) -> usize {
    self.shared.shards.len()
  }

  /// The total capacity the cache was built with.
  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }
}
