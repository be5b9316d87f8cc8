use super::EvictionPolicy;

use ahash::{HashMap, HashSet};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct LfuState {
  // Access count per tracked key.
  freqs: HashMap<String, u64>,
  // Keys grouped by access count. Empty buckets are removed eagerly.
  buckets: HashMap<u64, HashSet<String>>,
  // Lowest count with a non-empty bucket. May go stale after an explicit
  // removal; `evict` re-derives it in that case.
  min_freq: u64,
}

impl LfuState {
  // Moves `key` from bucket `from` to bucket `to`.
  fn promote(&mut self, key: &str, from: u64, to: u64) {
    let owned = match self.buckets.get_mut(&from) {
      Some(bucket) => {
        let owned = bucket.take(key);
        if bucket.is_empty() {
          self.buckets.remove(&from);
          if self.min_freq == from {
            self.min_freq = to;
          }
        }
        owned
      }
      None => None,
    };
    let owned = owned.unwrap_or_else(|| key.to_string());
    self.buckets.entry(to).or_default().insert(owned);
  }
}

/// An eviction policy that evicts a key with the lowest access count.
///
/// Ties inside the lowest bucket are broken by set iteration order, which is
/// randomized per instance; recency plays no part.
#[derive(Debug, Default)]
pub struct Lfu {
  state: Mutex<LfuState>,
}

impl Lfu {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  fn frequency(&self, key: &str) -> Option<u64> {
    self.state.lock().freqs.get(key).copied()
  }
}

impl EvictionPolicy for Lfu {
  fn on_get(&self, key: &str) {
    let mut state = self.state.lock();
    let Some(freq) = state.freqs.get_mut(key) else {
      return;
    };
    let old = *freq;
    *freq += 1;
    state.promote(key, old, old + 1);
  }

  fn on_put(&self, key: &str) {
    let mut state = self.state.lock();
    if state.freqs.contains_key(key) {
      return;
    }
    state.freqs.insert(key.to_string(), 1);
    state.buckets.entry(1).or_default().insert(key.to_string());
    state.min_freq = 1;
  }

  fn remove(&self, key: &str) {
    let mut state = self.state.lock();
    let Some(freq) = state.freqs.remove(key) else {
      return;
    };
    if let Some(bucket) = state.buckets.get_mut(&freq) {
      bucket.remove(key);
      if bucket.is_empty() {
        state.buckets.remove(&freq);
      }
    }
  }

  fn evict(&self) -> Option<String> {
    let mut state = self.state.lock();
    if state.freqs.is_empty() {
      return None;
    }
    if !state.buckets.contains_key(&state.min_freq) {
      state.min_freq = *state.buckets.keys().min()?;
    }

    let min_freq = state.min_freq;
    let bucket = state.buckets.get_mut(&min_freq)?;
    let victim = bucket.iter().next()?.clone();
    bucket.remove(&victim);
    if bucket.is_empty() {
      state.buckets.remove(&min_freq);
    }
    state.freqs.remove(&victim);
    Some(victim)
  }

  fn len(&self) -> usize {
    self.state.lock().freqs.len()
  }
}
