use crate::error::CacheError;

use std::collections::VecDeque;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::thread::{self, Thread};

use ahash::HashMap;
use parking_lot::Mutex;

/// The error type a `Loader` reports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The backing store the cache sits in front of.
///
/// A single collaborator serves both directions: `load` is called on a cache
/// miss, `put` by the write-through and write-back policies.
pub trait Loader<V>: Send + Sync {
  /// Fetches the value for a missing key. `Ok(None)` means the backing store
  /// has no value; nothing is cached in that case.
  fn load(&self, key: &str) -> Result<Option<V>, BoxError>;

  /// Persists a value written to the cache.
  fn put(&self, key: &str, value: &V) -> Result<(), BoxError>;
}

/// The outcome of a load, shared by every caller waiting on it.
pub(crate) type LoadResult<V> = Result<Option<Arc<V>>, CacheError>;

/// The internal state of a value being loaded.
enum State<V> {
  Computing,
  Complete(LoadResult<V>),
}

struct Inner<V> {
  state: State<V>,
  waiters: VecDeque<Thread>,
}

/// A single in-flight load that any number of threads can wait on.
pub(crate) struct LoadFuture<V> {
  inner: Mutex<Inner<V>>,
}

impl<V> LoadFuture<V> {
  /// Creates a new `LoadFuture` in the "Computing" state.
  fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        state: State::Computing,
        waiters: VecDeque::new(),
      }),
    }
  }

  /// Completes the future, waking all waiters.
  fn complete(&self, result: LoadResult<V>) {
    let mut inner = self.inner.lock();
    inner.state = State::Complete(result);
    for waiter in inner.waiters.drain(..) {
      waiter.unpark();
    }
  }

  /// Blocks the current thread until the future completes.
  fn wait(&self) -> LoadResult<V> {
    let mut inner = self.inner.lock();
    loop {
      match &inner.state {
        State::Complete(result) => return result.clone(),
        State::Computing => {
          inner.waiters.push_back(thread::current());
          drop(inner); // Unlock before parking.
          thread::park();
          inner = self.inner.lock();
        }
      }
    }
  }
}

/// Collapses concurrent loads of the same key into one.
///
/// The in-flight table is cache-wide and striped by key hash so unrelated
/// keys rarely contend on the same lock.
pub(crate) struct LoadCoordinator<V> {
  pending: Box<[Mutex<HashMap<String, Arc<LoadFuture<V>>>>]>,
  hasher: ahash::RandomState,
}

impl<V> LoadCoordinator<V> {
  /// Creates a coordinator with at least `stripes` lock stripes, rounded up
  /// to a power of two.
  pub(crate) fn new(stripes: usize) -> Self {
    let stripes = stripes.max(1).next_power_of_two();
    Self {
      pending: (0..stripes).map(|_| Mutex::new(HashMap::default())).collect(),
      hasher: ahash::RandomState::new(),
    }
  }

  fn stripe(&self, key: &str) -> &Mutex<HashMap<String, Arc<LoadFuture<V>>>> {
    let hash = self.hasher.hash_one(key);
    &self.pending[hash as usize & (self.pending.len() - 1)]
  }

  /// Runs `load` for `key` unless a load for the same key is already in
  /// flight, in which case the caller waits for that load's result instead.
  ///
  /// The leader runs `load` on its own thread. No lock is held while it runs.
  pub(crate) fn load_once<F>(&self, key: &str, load: F) -> LoadResult<V>
  where
    F: FnOnce() -> LoadResult<V>,
  {
    let (future, is_leader) = {
      let mut pending = self.stripe(key).lock();
      match pending.get(key) {
        Some(existing) => (existing.clone(), false),
        None => {
          let future = Arc::new(LoadFuture::new());
          pending.insert(key.to_string(), future.clone());
          (future, true)
        }
      }
    }; // The stripe lock is released here.

    if !is_leader {
      return future.wait();
    }

    let mut guard = LeaderGuard {
      coordinator: self,
      key,
      future: &future,
      finished: false,
    };
    let result = load();
    guard.finish(result.clone());
    result
  }

  #[cfg(test)]
  fn in_flight(&self) -> usize {
    self.pending.iter().map(|stripe| stripe.lock().len()).sum()
  }
}

// Retires the leader's entry from the in-flight table and completes the
// shared future, even when the load panics.
struct LeaderGuard<'a, V> {
  coordinator: &'a LoadCoordinator<V>,
  key: &'a str,
  future: &'a LoadFuture<V>,
  finished: bool,
}

impl<V> LeaderGuard<'_, V> {
  fn finish(&mut self, result: LoadResult<V>) {
    self.finished = true;
    self.coordinator.stripe(self.key).lock().remove(self.key);
    self.future.complete(result);
  }
}

impl<V> Drop for LeaderGuard<'_, V> {
  fn drop(&mut self) {
    if !self.finished {
      tracing::warn!(key = self.key, "loader panicked; releasing waiting callers");
      self.finish(Err(CacheError::LoaderPanicked));
    }
  }
}
