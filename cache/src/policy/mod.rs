pub mod fifo;
pub mod lfu;
pub mod lru;

mod key_list;

use crate::error::BuildError;

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decides which key a shard discards when it is full.
///
/// Each shard owns its own policy instance. The shard calls `on_put` and
/// `remove` while holding its write lock; `on_get` runs on the read path.
/// Implementations guard their bookkeeping internally.
pub trait EvictionPolicy: Send + Sync + fmt::Debug {
  /// Called after a key was read successfully.
  fn on_get(&self, key: &str);

  /// Called after a key was stored. Re-putting a tracked key does not
  /// change its position.
  fn on_put(&self, key: &str);

  /// Called when a key is explicitly removed (not evicted).
  fn remove(&self, key: &str);

  /// Chooses a victim, stops tracking it and returns it. The caller is
  /// responsible for deleting it from the store. Returns `None` when no key
  /// is tracked.
  fn evict(&self) -> Option<String>;

  /// The number of tracked keys.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Identifies one of the built-in eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum EvictionPolicyKind {
  /// Least recently used.
  #[default]
  Lru,
  /// Least frequently used.
  Lfu,
  /// First in, first out.
  Fifo,
}

impl EvictionPolicyKind {
  /// Creates a fresh policy instance of this kind.
  pub fn build(self) -> Box<dyn EvictionPolicy> {
    match self {
      EvictionPolicyKind::Lru => Box::new(lru::Lru::new()),
      EvictionPolicyKind::Lfu => Box::new(lfu::Lfu::new()),
      EvictionPolicyKind::Fifo => Box::new(fifo::Fifo::new()),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      EvictionPolicyKind::Lru => "LRU",
      EvictionPolicyKind::Lfu => "LFU",
      EvictionPolicyKind::Fifo => "FIFO",
    }
  }
}

impl fmt::Display for EvictionPolicyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EvictionPolicyKind {
  type Err = BuildError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "LRU" => Ok(EvictionPolicyKind::Lru),
      "LFU" => Ok(EvictionPolicyKind::Lfu),
      "FIFO" => Ok(EvictionPolicyKind::Fifo),
      _ => Err(BuildError::UnknownEvictionPolicy(s.to_string())),
    }
  }
}
