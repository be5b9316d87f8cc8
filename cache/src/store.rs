use crate::entry::CacheEntry;

use core::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::HashMap;
use arc_swap::ArcSwap;

type Snapshot<V> = HashMap<String, Arc<CacheEntry<V>>>;

/// A copy-on-write key → entry map for one shard.
///
/// Readers load the current snapshot without locking and always see one
/// complete, immutable map. Every mutation copies the whole map, applies the
/// change and publishes the copy atomically. Mutations must be serialized by
/// the caller (the shard's write lock); concurrent writers would lose updates.
pub(crate) struct CowStore<V> {
  data: ArcSwap<Snapshot<V>>,
  // Tracked separately so callers never need to touch the snapshot for it.
  size: AtomicUsize,
}

impl<V> fmt::Debug for CowStore<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CowStore")
      .field("size", &self.size())
      .finish()
  }
}

impl<V> CowStore<V> {
  pub(crate) fn new() -> Self {
    Self {
      data: ArcSwap::from_pointee(HashMap::default()),
      size: AtomicUsize::new(0),
    }
  }

  /// Looks up an entry in the current snapshot. Never blocks.
  #[inline]
  pub(crate) fn get(&self, key: &str) -> Option<Arc<CacheEntry<V>>> {
    self.data.load().get(key).cloned()
  }

  /// Inserts or replaces an entry by publishing a new snapshot.
  pub(crate) fn put(&self, key: String, entry: Arc<CacheEntry<V>>) {
    let current = self.data.load_full();
    let mut next: Snapshot<V> = HashMap::with_capacity_and_hasher(
      current.len() + 1,
      current.hasher().clone(),
    );
    next.extend(current.iter().map(|(k, v)| (k.clone(), v.clone())));
    next.insert(key, entry);

    let len = next.len();
    self.data.store(Arc::new(next));
    self.size.store(len, Ordering::Release);
  }

  /// Removes an entry by publishing a new snapshot without it. Deleting an
  /// absent key leaves the current snapshot in place.
  pub(crate) fn delete(&self, key: &str) -> Option<Arc<CacheEntry<V>>> {
    let current = self.data.load_full();
    let removed = current.get(key)?.clone();

    let mut next: Snapshot<V> =
      HashMap::with_capacity_and_hasher(current.len(), current.hasher().clone());
    next.extend(
      current
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| (k.clone(), v.clone())),
    );

    let len = next.len();
    self.data.store(Arc::new(next));
    self.size.store(len, Ordering::Release);
    Some(removed)
  }

  /// The number of entries in the most recently published snapshot.
  #[inline]
  pub(crate) fn size(&self) -> usize {
    self.size.load(Ordering::Acquire)
  }
}
