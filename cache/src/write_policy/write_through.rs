use super::WritePolicy;
use crate::loader::Loader;

use std::fmt;
use std::sync::Arc;

/// Forwards every write to the backing store on the writer's thread.
pub struct WriteThrough<V> {
  store: Arc<dyn Loader<V>>,
}

impl<V> WriteThrough<V> {
  pub fn new(store: Arc<dyn Loader<V>>) -> Self {
    Self { store }
  }
}

impl<V> fmt::Debug for WriteThrough<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WriteThrough").finish_non_exhaustive()
  }
}

impl<V: Send + Sync> WritePolicy<V> for WriteThrough<V> {
  fn on_write(&self, key: &str, value: &Arc<V>) {
    if let Err(e) = self.store.put(key, value) {
      tracing::warn!(key, error = %e, "write-through to backing store failed");
    }
  }

  fn close(&self) {}
}
