use std::borrow::Borrow;
use std::hash::Hash;

use ahash::HashMap;
use generational_arena::{Arena, Index};

#[derive(Debug)]
struct Node<K> {
  key: K,
  next: Option<Index>,
  prev: Option<Index>,
}

/// An ordered set of keys backed by an arena-allocated doubly linked list.
///
/// The head is the newest (or most recently used) key, the tail the oldest.
/// Lookup, move-to-front, removal and pop-back are all O(1).
#[derive(Debug)]
pub(super) struct KeyList<K: Eq + Hash + Clone> {
  nodes: Arena<Node<K>>,
  lookup: HashMap<K, Index>,
  head: Option<Index>,
  tail: Option<Index>,
}

impl<K: Eq + Hash + Clone> Default for KeyList<K> {
  fn default() -> Self {
    Self {
      nodes: Arena::new(),
      lookup: HashMap::default(),
      head: None,
      tail: None,
    }
  }
}

impl<K: Eq + Hash + Clone> KeyList<K> {
  pub fn new() -> Self {
    Self::default()
  }

  // Detaches a node from its neighbours without freeing it.
  fn unlink(&mut self, index: Index) {
    let node = &self.nodes[index];
    let prev_idx = node.prev;
    let next_idx = node.next;

    if let Some(prev) = prev_idx {
      self.nodes[prev].next = next_idx;
    } else {
      self.head = next_idx;
    }

    if let Some(next) = next_idx {
      self.nodes[next].prev = prev_idx;
    } else {
      self.tail = prev_idx;
    }
  }

  // Links an already allocated node in as the new head.
  fn link_front(&mut self, index: Index) {
    let old_head = self.head;
    self.nodes[index].next = old_head;
    self.nodes[index].prev = None;
    self.head = Some(index);

    if let Some(old) = old_head {
      self.nodes[old].prev = Some(index);
    }

    if self.tail.is_none() {
      self.tail = Some(index);
    }
  }

  pub fn len(&self) -> usize {
    self.lookup.len()
  }

  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.lookup.contains_key(key)
  }

  /// Inserts a new key at the head. Returns `false`, leaving the list
  /// untouched, if the key is already tracked.
  pub fn push_front(&mut self, key: K) -> bool {
    if self.lookup.contains_key(&key) {
      return false;
    }
    let index = self.nodes.insert(Node {
      key: key.clone(),
      next: None,
      prev: None,
    });
    self.lookup.insert(key, index);
    self.link_front(index);
    true
  }

  pub fn move_to_front<Q>(&mut self, key: &Q)
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    if let Some(&index) = self.lookup.get(key) {
      if self.head != Some(index) {
        self.unlink(index);
        self.link_front(index);
      }
    }
  }

  /// Removes and returns the tail (oldest) key.
  pub fn pop_back(&mut self) -> Option<K> {
    let tail = self.tail?;
    self.unlink(tail);
    let node = self.nodes.remove(tail)?;
    self.lookup.remove(&node.key);
    Some(node.key)
  }

  pub fn remove<Q>(&mut self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    match self.lookup.remove(key) {
      Some(index) => {
        self.unlink(index);
        self.nodes.remove(index);
        true
      }
      None => false,
    }
  }

  // A helper for tests, to get the order of keys from head to tail.
  #[cfg(test)]
  pub(crate) fn keys_as_vec(&self) -> Vec<K> {
    let mut keys = Vec::new();
    let mut current = self.head;
    while let Some(index) = current {
      keys.push(self.nodes[index].key.clone());
      current = self.nodes[index].next;
    }
    keys
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_list_is_empty() {
    let list = KeyList::<String>::new();
    assert_eq!(list.len(), 0);
    assert!(list.keys_as_vec().is_empty());
    assert!(!list.contains("a"));
  }

  #[test]
  fn push_front_orders_newest_first() {
    let mut list = KeyList::new();
    assert!(list.push_front(1));
    assert!(list.push_front(2));
    assert!(list.push_front(3));
    assert_eq!(list.keys_as_vec(), vec![3, 2, 1]);
  }

  #[test]
  fn push_front_existing_key_is_ignored() {
    let mut list = KeyList::new();
    list.push_front(1);
    list.push_front(2);
    assert!(!list.push_front(1));
    assert_eq!(list.keys_as_vec(), vec![2, 1]);
    assert_eq!(list.len(), 2);
  }

  #[test]
  fn move_to_front_reorders() {
    let mut list = KeyList::new();
    list.push_front(1);
    list.push_front(2);
    list.push_front(3);
    list.move_to_front(&1);
    assert_eq!(list.keys_as_vec(), vec![1, 3, 2]);
    // Moving the head is a no-op.
    list.move_to_front(&1);
    assert_eq!(list.keys_as_vec(), vec![1, 3, 2]);
  }

  #[test]
  fn pop_back_returns_oldest() {
    let mut list = KeyList::new();
    list.push_front(1);
    list.push_front(2);
    assert_eq!(list.pop_back(), Some(1));
    assert_eq!(list.pop_back(), Some(2));
    assert_eq!(list.pop_back(), None);
    assert_eq!(list.len(), 0);
  }

  #[test]
  fn remove_from_middle_keeps_order() {
    let mut list = KeyList::new();
    list.push_front(1);
    list.push_front(2);
    list.push_front(3);
    assert!(list.remove(&2));
    assert!(!list.remove(&2));
    assert_eq!(list.keys_as_vec(), vec![3, 1]);
    assert_eq!(list.pop_back(), Some(1));
    assert_eq!(list.pop_back(), Some(3));
  }

  #[test]
  fn borrowed_lookups_work_for_string_keys() {
    let mut list = KeyList::new();
    list.push_front("a".to_string());
    list.push_front("b".to_string());
    assert!(list.contains("a"));
    list.move_to_front("a");
    assert_eq!(list.keys_as_vec(), vec!["a".to_string(), "b".to_string()]);
    assert!(list.remove("b"));
  }
}
