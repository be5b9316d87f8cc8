use super::key_list::KeyList;
use super::EvictionPolicy;

use parking_lot::Mutex;

/// An eviction policy that evicts keys in the order they were first inserted.
#[derive(Debug, Default)]
pub struct Fifo {
  // Head is the newest key, tail the oldest.
  list: Mutex<KeyList<String>>,
}

impl Fifo {
  pub fn new() -> Self {
    Self::default()
  }
}

impl EvictionPolicy for Fifo {
  /// A FIFO policy does not care about access patterns. This is a no-op.
  fn on_get(&self, _key: &str) {}

  /// Only the first insertion of a key counts; re-puts keep its place.
  fn on_put(&self, key: &str) {
    let mut list = self.list.lock();
    if !list.contains(key) {
      list.push_front(key.to_string());
    }
  }

  /// Unlinks the key in place, so the order of the remaining keys holds.
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn evicts_oldest_first() {
    let policy = Fifo::new();
    policy.on_put("1");
    policy.on_put("2");
    policy.on_put("3");

    assert_eq!(policy.evict().as_deref(), Some("1"));
    assert_eq!(policy.evict().as_deref(), Some("2"));
    assert_eq!(policy.evict().as_deref(), Some("3"));
    assert_eq!(policy.evict(), None);
  }

  #[test]
  fn access_is_a_noop() {
    let policy = Fifo::new();
    policy.on_put("1");
    policy.on_put("2");

    let keys_before = policy.list.lock().keys_as_vec();
    policy.on_get("1");
    let keys_after = policy.list.lock().keys_as_vec();

    assert_eq!(keys_before, keys_after, "Access should not change FIFO order");
  }

  #[test]
  fn re_put_existing_key_is_a_noop() {
    let policy = Fifo::new();
    policy.on_put("1");
    policy.on_put("2");
    policy.on_put("1");

    assert_eq!(policy.len(), 2);
    assert_eq!(policy.evict().as_deref(), Some("1"));
  }

  #[test]
  fn remove_preserves_order_of_the_rest() {
    let policy = Fifo::new();
    policy.on_put("1");
    policy.on_put("2");
    policy.on_put("3");

    policy.remove("2");

    assert_eq!(
      policy.list.lock().keys_as_vec(),
      vec!["3".to_string(), "1".to_string()]
    );
    assert_eq!(policy.evict().as_deref(), Some("1"));
    assert_eq!(policy.evict().as_deref(), Some("3"));
  }
}
