mod write_back;
mod write_through;

pub use write_back::WriteBack;
pub use write_through::WriteThrough;

use std::sync::Arc;

/// Propagates cache writes to the backing store.
///
/// Errors from the backing store are never surfaced to the writer; a write
/// policy logs them and moves on.
pub trait WritePolicy<V>: Send + Sync {
  /// Called after an entry without an expiry was written.
  fn on_write(&self, key: &str, value: &Arc<V>);

  /// Flushes pending writes and releases resources. Must be idempotent.
  fn close(&self);
}
