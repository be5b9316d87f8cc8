use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// The cache was configured with a capacity of zero.
  #[error("cache capacity cannot be zero")]
  ZeroCapacity,
  /// The cache was configured with zero shards, which is not allowed.
  #[error("shard count cannot be zero")]
  ZeroShards,
  /// The capacity is smaller than the shard count, which would leave every
  /// shard with a per-shard capacity of zero.
  #[error("capacity {capacity} is smaller than the shard count {shards}")]
  CapacityBelowShardCount { capacity: usize, shards: usize },
  /// The eviction policy identifier is not one of `LRU`, `LFU` or `FIFO`.
  #[error("unknown eviction policy '{0}'")]
  UnknownEvictionPolicy(String),
  /// A write-back queue was requested with a buffer size of zero.
  #[error("write-back buffer size cannot be zero")]
  ZeroWriteBuffer,
  /// A write-through or write-back mode was requested, but no loader was
  /// configured to act as the backing store.
  #[error("write policy requires a loader to act as the backing store")]
  MissingBackingStore,
}

/// Errors returned by cache operations.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
  /// The loader failed while fetching a missing key. Every caller that was
  /// waiting on the same load receives the same underlying error.
  #[error("loader failed: {0}")]
  Load(#[source] Arc<dyn StdError + Send + Sync>),
  /// The loader panicked while fetching a missing key.
  #[error("loader panicked while loading the key")]
  LoaderPanicked,
  /// The cache has been closed and no longer accepts writes.
  #[error("cache is closed")]
  Closed,
}
