use crate::engine::CacheEngine;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::handles::Ttl;
use crate::loader::LoadCoordinator;
use crate::shard::{Shard, ShardSelector};
use crate::time;

use core::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The state shared by every handle to one cache.
pub(crate) struct CacheShared<V> {
  pub(crate) shards: Box<[Shard<V>]>,
  pub(crate) selector: Arc<dyn ShardSelector>,
  pub(crate) capacity: usize,
  pub(crate) per_shard_capacity: usize,
  pub(crate) engine: CacheEngine<V>,
  pub(crate) loads: LoadCoordinator<V>,
}

impl<V> fmt::Debug for CacheShared<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("shards", &self.shards.len())
      .field("capacity", &self.capacity)
      .field("per_shard_capacity", &self.per_shard_capacity)
      .field("closed", &self.engine.is_closed())
      .finish_non_exhaustive()
  }
}

impl<V: Send + Sync> CacheShared<V> {
  #[inline]
  pub(crate) fn shard_for(&self, key: &str) -> &Shard<V> {
    let index = self.selector.select(key, self.shards.len());
    &self.shards[index]
  }

  pub(crate) fn get(&self, key: &str) -> Result<Option<Arc<V>>, CacheError> {
    let shard = self.shard_for(key);

    if let Some(entry) = shard.store.get(key) {
      let now = Instant::now();
      if !self.engine.is_expired(&entry, now) {
        self.engine.metrics.hit();
        self.engine.on_read(key, &entry, now);
        shard.policy.on_get(key);
        return Ok(Some(entry.value()));
      }
      self.engine.metrics.expire();
      tracing::trace!(key, "entry expired; removing");
      self.remove_expired(shard, key, &entry);
    }

    self.engine.metrics.miss();
    if self.engine.loader.is_none() {
      return Ok(None);
    }

    self.loads.load_once(key, || {
      let loaded = self.engine.load(key)?;
      if let Some(value) = &loaded {
        if self.insert(key, value.clone(), None).is_err() {
          tracing::trace!(key, "cache closed; returning loaded value without caching");
        }
      }
      Ok(loaded)
    })
  }

  /// Stores `value` under `key`, evicting one entry first when the owning
  /// shard is full, even if `key` itself is already cached. A `ttl` gives the
  /// entry an explicit expiry.
  ///
  /// The write policy is called before the shard lock is taken. Two
  /// concurrent writes of the same key can therefore reach the backing store
  /// in the opposite order from the one in which they land in the cache.
  /// Writes from a single thread are always forwarded in program order.
  pub(crate) fn insert(
    &self,
    key: &str,
    value: Arc<V>,
    ttl: Option<Duration>,
  ) -> Result<(), CacheError> {
    if self.engine.is_closed() {
      return Err(CacheError::Closed);
    }

    let now = Instant::now();
    let entry = Arc::new(CacheEntry::new(key.to_string(), value, now, ttl));
    self.engine.on_write(&entry, now);

    let shard = self.shard_for(key);
    let _guard = shard.write_lock.lock();

    if shard.store.size() >= self.per_shard_capacity {
      if let Some(victim) = shard.policy.evict() {
        shard.store.delete(&victim);
        self.engine.metrics.eviction();
        tracing::debug!(key = %victim, "evicted entry to stay within shard capacity");
      }
    }

    shard.store.put(key.to_string(), entry);
    shard.policy.on_put(key);
    Ok(())
  }

  pub(crate) fn remove(&self, key: &str) {
    let shard = self.shard_for(key);
    let _guard = shard.write_lock.lock();
    shard.store.delete(key);
    shard.policy.remove(key);
  }

  // Drops an entry found expired on the read path, unless it was replaced in
  // the meantime.
  fn remove_expired(&self, shard: &Shard<V>, key: &str, expired: &Arc<CacheEntry<V>>) {
    let _guard = shard.write_lock.lock();
    match shard.store.get(key) {
      Some(current) if Arc::ptr_eq(&current, expired) => {
        shard.store.delete(key);
        shard.policy.remove(key);
      }
      _ => {}
    }
  }

  pub(crate) fn expire(&self, key: &str, ttl: Duration) -> bool {
    let shard = self.shard_for(key);
    let _guard = shard.write_lock.lock();
    match shard.store.get(key) {
      Some(entry) => {
        entry
          .timestamps()
          .set_expires_at(time::deadline(Instant::now(), ttl));
        true
      }
      None => false,
    }
  }

  pub(crate) fn ttl(&self, key: &str) -> Ttl {
    let Some(entry) = self.shard_for(key).store.get(key) else {
      return Ttl::Missing;
    };
    let Some(expires_at) = entry.timestamps().expires_at() else {
      return Ttl::Persistent;
    };
    match expires_at.checked_duration_since(Instant::now()) {
      Some(remaining) if !remaining.is_zero() => Ttl::Remaining(remaining),
      _ => Ttl::Missing,
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.shards.iter().map(|shard| shard.store.size()).sum()
  }
}

impl<V> Drop for CacheShared<V> {
  fn drop(&mut self) {
    self.engine.close();
  }
}
