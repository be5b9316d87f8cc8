use crate::policy::EvictionPolicy;
use crate::store::CowStore;

use core::fmt;

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use xxhash_rust::xxh32::xxh32;

/// Maps a key to the index of the shard that owns it.
///
/// Implementations must be pure: the same key and shard count always give
/// the same index, so a key never migrates between shards.
pub trait ShardSelector: Send + Sync {
  /// Returns an index in `0..shard_count`. `shard_count` is never zero.
  fn select(&self, key: &str, shard_count: usize) -> usize;
}

/// The default selector.
///
/// Despite the name, borrowed from the "power of two choices" balancing
/// scheme, it makes a single deterministic choice: a 32-bit xxHash of the
/// key modulo the shard count. No shard load is consulted.
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerOfTwoSelector;

impl ShardSelector for PowerOfTwoSelector {
  #[inline]
  fn select(&self, key: &str, shard_count: usize) -> usize {
    xxh32(key.as_bytes(), 0) as usize % shard_count
  }
}

/// One independently locked partition of the cache.
///
/// Reads go straight to the store. Every mutation of the store happens with
/// `write_lock` held and is paired with the matching policy call, so the
/// policy tracks exactly the keys present in the store.
pub(crate) struct Shard<V> {
  pub(crate) store: CowStore<V>,
  pub(crate) policy: Box<dyn EvictionPolicy>,
  pub(crate) write_lock: CachePadded<Mutex<()>>,
}

impl<V> fmt::Debug for Shard<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Shard")
      .field("size", &self.store.size())
      .field("policy", &self.policy)
      .finish_non_exhaustive()
  }
}

impl<V> Shard<V> {
  pub(crate) fn new(policy: Box<dyn EvictionPolicy>) -> Self {
    Self {
      store: CowStore::new(),
      policy,
      write_lock: CachePadded::new(Mutex::new(())),
    }
  }
}
