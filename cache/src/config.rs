#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How writes are propagated to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum WritePolicyMode {
  /// Every write reaches the backing store before `put` returns.
  WriteThrough,
  /// Writes are queued (up to `buffer` pending) and forwarded by a background
  /// worker.
  WriteBack { buffer: usize },
}

/// A plain-data description of a cache, suitable for loading from a config
/// file. Apply it with [`CacheBuilder::from_config`](crate::CacheBuilder::from_config).
///
/// Fields left out of a deserialized config take their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CacheConfig {
  /// Number of shards. Defaults to four per CPU.
  pub shards: usize,
  /// Total number of entries, split evenly across shards.
  pub capacity: usize,
  /// `LRU`, `LFU` or `FIFO`, case-insensitive. Checked when the cache is
  /// built.
  pub eviction_policy: String,
  /// Enables the sliding expire-after-access strategy.
  pub expire_after_access_ms: Option<u64>,
  /// Requires a loader on the builder, which doubles as the backing store.
  pub write_policy: Option<WritePolicyMode>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      shards: default_shards(),
      capacity: usize::MAX,
      eviction_policy: "LRU".to_string(),
      expire_after_access_ms: None,
      write_policy: None,
    }
  }
}

pub(crate) fn default_shards() -> usize {
  num_cpus::get().max(1) * 4
}
