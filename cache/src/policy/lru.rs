use super::key_list::KeyList;
use super::EvictionPolicy;

use parking_lot::Mutex;

/// An eviction policy that evicts the least recently used key.
#[derive(Debug, Default)]
pub struct Lru {
  // Head is the most recently used key, tail the least.
  list: Mutex<KeyList<String>>,
}

impl Lru {
  pub fn new() -> Self {
    Self::default()
  }
}

impl EvictionPolicy for Lru {
  /// A read makes the key the most recently used.
  fn on_get(&self, key: &str) {
    self.list.lock().move_to_front(key);
  }

  /// New keys enter as the most recently used. Re-putting a tracked key
  /// leaves its recency alone; only reads refresh it.
  fn on_put(&self, key: &str) {
    let mut list = self.list.lock();
    if !list.contains(key) {
      list.push_front(key.to_string());
    }
  }

  fn remove(&self, key: &str) {
    self.list.lock().remove(key);
  }

  fn evict(&self) -> Option<String> {
    self.list.lock().pop_back()
  }

  fn len(&self) -> usize {
    self.list.lock().len()
  }
}
