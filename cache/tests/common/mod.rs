#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use sharded_cache::{BoxError, Cache, CacheBuilder, Loader, ShardSelector};

// A selector that lets a test decide which shard a key lands on.
// Keys of the form "<shard>:<anything>" go to shard `<shard> % shard_count`;
// anything else goes to shard 0.
#[derive(Clone, Copy, Default)]
pub struct ShardControllingSelector;

impl ShardSelector for ShardControllingSelector {
  fn select(&self, key: &str, shard_count: usize) -> usize {
    key
      .split_once(':')
      .and_then(|(shard, _)| shard.parse::<usize>().ok())
      .map_or(0, |shard| shard % shard_count)
  }
}

/// An in-memory backing store that counts how often it is called.
#[derive(Default)]
pub struct TestStore {
  data: Mutex<HashMap<String, String>>,
  load_calls: AtomicUsize,
  put_calls: AtomicUsize,
  load_delay: Option<Duration>,
  fail_loads: bool,
}

impl TestStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
    let store = Self::new();
    {
      let mut data = store.data.lock();
      for (key, value) in entries {
        data.insert(key.to_string(), value.to_string());
      }
    }
    store
  }

  /// Makes every load sleep first, so concurrent misses overlap.
  pub fn slow(mut self, delay: Duration) -> Self {
    self.load_delay = Some(delay);
    self
  }

  pub fn failing(mut self) -> Self {
    self.fail_loads = true;
    self
  }

  pub fn load_calls(&self) -> usize {
    self.load_calls.load(Ordering::SeqCst)
  }

  pub fn put_calls(&self) -> usize {
    self.put_calls.load(Ordering::SeqCst)
  }

  pub fn value(&self, key: &str) -> Option<String> {
    self.data.lock().get(key).cloned()
  }

  pub fn len(&self) -> usize {
    self.data.lock().len()
  }
}

impl Loader<String> for TestStore {
  fn load(&self, key: &str) -> Result<Option<String>, BoxError> {
    self.load_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.load_delay {
      thread::sleep(delay);
    }
    if self.fail_loads {
      return Err(format!("backing store unavailable for '{key}'").into());
    }
    Ok(self.data.lock().get(key).cloned())
  }

  fn put(&self, key: &str, value: &String) -> Result<(), BoxError> {
    self.put_calls.fetch_add(1, Ordering::SeqCst);
    self.data.lock().insert(key.to_string(), value.clone());
    Ok(())
  }
}

pub fn build_test_cache(shards: usize) -> Cache<String> {
  CacheBuilder::new()
    .shards(shards)
    .selector(ShardControllingSelector)
    .build()
    .unwrap()
}

// Helper to build a bounded cache with a controllable shard layout.
pub fn build_test_cache_with_cap(shards: usize, capacity: usize) -> Cache<String> {
  CacheBuilder::new()
    .shards(shards)
    .capacity(capacity)
    .selector(ShardControllingSelector)
    .build()
    .unwrap()
}

pub fn build_loading_cache(store: Arc<TestStore>) -> Cache<String> {
  CacheBuilder::new().shards(4).loader(store).build().unwrap()
}
