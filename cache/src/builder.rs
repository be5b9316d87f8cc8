use crate::config::{self, CacheConfig, WritePolicyMode};
use crate::engine::CacheEngine;
use crate::error::BuildError;
use crate::expiration::{ExpirationStrategy, ExpireAfterAccess};
use crate::handles::Cache;
use crate::loader::{LoadCoordinator, Loader};
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::policy::EvictionPolicyKind;
use crate::refresh::RefreshHook;
use crate::shard::{PowerOfTwoSelector, Shard, ShardSelector};
use crate::shared::CacheShared;
use crate::write_policy::{WriteBack, WritePolicy, WriteThrough};

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

// The eviction policy as requested; a name is only resolved at build time.
#[derive(Debug, Clone)]
enum PolicyChoice {
  Kind(EvictionPolicyKind),
  Name(String),
}

enum WriteChoice<V> {
  Mode(WritePolicyMode),
  Custom(Arc<dyn WritePolicy<V>>),
}

/// A builder for creating [`Cache`] instances.
pub struct CacheBuilder<V> {
  capacity: usize,
  shards: usize,
  eviction: PolicyChoice,
  expiration: Option<Arc<dyn ExpirationStrategy>>,
  refresh: Option<Arc<dyn RefreshHook<V>>>,
  loader: Option<Arc<dyn Loader<V>>>,
  metrics: Option<Arc<dyn MetricsSink>>,
  selector: Option<Arc<dyn ShardSelector>>,
  write: Option<WriteChoice<V>>,
}

// Manual Debug implementation for CacheBuilder.
impl<V> fmt::Debug for CacheBuilder<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("capacity", &self.capacity)
      .field("shards", &self.shards)
      .field("eviction", &self.eviction)
      .field("has_expiration", &self.expiration.is_some())
      .field("has_loader", &self.loader.is_some())
      .field("has_write_policy", &self.write.is_some())
      .finish_non_exhaustive()
  }
}

impl<V> Default for CacheBuilder<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> CacheBuilder<V> {
  /// Creates a builder for an effectively unbounded LRU cache with four
  /// shards per CPU, no expiration, no loader and no write policy.
  pub fn new() -> Self {
    Self {
      capacity: usize::MAX,
      shards: config::default_shards(),
      eviction: PolicyChoice::Kind(EvictionPolicyKind::default()),
      expiration: None,
      refresh: None,
      loader: None,
      metrics: None,
      selector: None,
      write: None,
    }
  }

  /// Creates a builder preconfigured from `config`. Loader, metrics and
  /// hooks can still be added afterwards.
  pub fn from_config(config: &CacheConfig) -> Self {
    let mut builder = Self::new()
      .shards(config.shards)
      .capacity(config.capacity)
      .eviction_policy_name(config.eviction_policy.clone());
    if let Some(ms) = config.expire_after_access_ms {
      builder = builder.expire_after_access(Duration::from_millis(ms));
    }
    if let Some(mode) = config.write_policy {
      builder.write = Some(WriteChoice::Mode(mode));
    }
    builder
  }

  /// Sets the total number of entries. Each shard holds at most
  /// `capacity / shards`; any remainder goes unused.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  /// Sets the number of shards. Any count of one or more is accepted.
  pub fn shards(mut self, shards: usize) -> Self {
    self.shards = shards;
    self
  }

  /// Sets the eviction policy used by every shard.
  pub fn eviction_policy(mut self, kind: EvictionPolicyKind) -> Self {
    self.eviction = PolicyChoice::Kind(kind);
    self
  }

  /// Sets the eviction policy by identifier (`LRU`, `LFU` or `FIFO`).
  ///
  /// An unknown identifier makes [`build`](Self::build) fail with
  /// [`BuildError::UnknownEvictionPolicy`].
  pub fn eviction_policy_name(mut self, name: impl Into<String>) -> Self {
    self.eviction = PolicyChoice::Name(name.into());
    self
  }

  /// Sets the expiration strategy. Without one, entries never expire by
  /// time, even if they were given a TTL.
  pub fn expiration<S>(mut self, strategy: S) -> Self
  where
    S: ExpirationStrategy + 'static,
  {
    self.expiration = Some(Arc::new(strategy));
    self
  }

  /// Shorthand for `expiration(ExpireAfterAccess::new(ttl))`.
  pub fn expire_after_access(self, ttl: Duration) -> Self {
    self.expiration(ExpireAfterAccess::new(ttl))
  }

  /// Sets a hook that is told about every successful read.
  pub fn refresh_hook<H>(mut self, hook: H) -> Self
  where
    H: RefreshHook<V> + 'static,
  {
    self.refresh = Some(Arc::new(hook));
    self
  }

  /// Sets the loader. It is consulted on misses and, when a write policy is
  /// configured, receives the cache's writes.
  pub fn loader<L>(mut self, loader: Arc<L>) -> Self
  where
    L: Loader<V> + 'static,
  {
    let loader: Arc<dyn Loader<V>> = loader;
    self.loader = Some(loader);
    self
  }

  /// Sets the sink that receives hit, miss, eviction, expiration and
  /// refresh events.
  pub fn metrics<M>(mut self, metrics: Arc<M>) -> Self
  where
    M: MetricsSink + 'static,
  {
    let metrics: Arc<dyn MetricsSink> = metrics;
    self.metrics = Some(metrics);
    self
  }

  /// Replaces the default [`PowerOfTwoSelector`].
  pub fn selector<S>(mut self, selector: S) -> Self
  where
    S: ShardSelector + 'static,
  {
    self.selector = Some(Arc::new(selector));
    self
  }

  /// Forwards every write synchronously to the loader's `put`.
  pub fn write_through(mut self) -> Self {
    self.write = Some(WriteChoice::Mode(WritePolicyMode::WriteThrough));
    self
  }

  /// Queues writes (at most `buffer` pending) for a background worker that
  /// forwards them to the loader's `put`.
  pub fn write_back(mut self, buffer: usize) -> Self {
    self.write = Some(WriteChoice::Mode(WritePolicyMode::WriteBack { buffer }));
    self
  }

  /// Uses a custom write policy.
  pub fn write_policy<P>(mut self, policy: P) -> Self
  where
    P: WritePolicy<V> + 'static,
  {
    self.write = Some(WriteChoice::Custom(Arc::new(policy)));
    self
  }

  fn validate(&self) -> Result<EvictionPolicyKind, BuildError> {
    if self.capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }
    if self.shards == 0 {
      return Err(BuildError::ZeroShards);
    }
    if self.capacity < self.shards {
      return Err(BuildError::CapacityBelowShardCount {
        capacity: self.capacity,
        shards: self.shards,
      });
    }
    if let Some(WriteChoice::Mode(mode)) = &self.write {
      if self.loader.is_none() {
        return Err(BuildError::MissingBackingStore);
      }
      if matches!(mode, WritePolicyMode::WriteBack { buffer: 0 }) {
        return Err(BuildError::ZeroWriteBuffer);
      }
    }
    match &self.eviction {
      PolicyChoice::Kind(kind) => Ok(*kind),
      PolicyChoice::Name(name) => name.parse(),
    }
  }
}

impl<V: Send + Sync + 'static> CacheBuilder<V> {
  /// Builds the cache.
  pub fn build(self) -> Result<Cache<V>, BuildError> {
    let kind = self.validate()?;

    let write_policy: Option<Arc<dyn WritePolicy<V>>> = match (self.write, &self.loader) {
      (Some(WriteChoice::Custom(policy)), _) => Some(policy),
      (Some(WriteChoice::Mode(WritePolicyMode::WriteThrough)), Some(store)) => {
        Some(Arc::new(WriteThrough::new(store.clone())))
      }
      (Some(WriteChoice::Mode(WritePolicyMode::WriteBack { buffer })), Some(store)) => {
        Some(Arc::new(WriteBack::new(store.clone(), buffer)))
      }
      // Rejected by `validate`.
      (Some(WriteChoice::Mode(_)), None) => return Err(BuildError::MissingBackingStore),
      (None, _) => None,
    };

    let shards: Box<[Shard<V>]> = (0..self.shards).map(|_| Shard::new(kind.build())).collect();
    let engine = CacheEngine::new(
      self.expiration,
      self.refresh,
      self.loader,
      write_policy,
      self.metrics.unwrap_or_else(|| Arc::new(NoopMetrics)),
    );

    tracing::debug!(
      shards = self.shards,
      capacity = self.capacity,
      eviction = %kind,
      "building cache"
    );

    let shared = CacheShared {
      shards,
      selector: self.selector.unwrap_or_else(|| Arc::new(PowerOfTwoSelector)),
      capacity: self.capacity,
      per_shard_capacity: self.capacity / self.shards,
      engine,
      loads: LoadCoordinator::new(self.shards),
    };

    Ok(Cache {
      shared: Arc::new(shared),
    })
  }
}
