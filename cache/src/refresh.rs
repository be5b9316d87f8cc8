use crate::entry::CacheEntry;

/// A hook that is told about every successful read.
///
/// The cache only reports the read; any refresh-ahead logic (for example
/// reloading an entry that is close to its expiry) belongs to the hook.
/// It is called synchronously on the reading thread, after the expiration
/// strategy has updated the entry's timestamps.
pub trait RefreshHook<V>: Send + Sync {
  fn on_read(&self, key: &str, entry: &CacheEntry<V>);
}
