use super::WritePolicy;
use crate::loader::Loader;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use fibre::mpsc;
use fibre::TrySendError;
use parking_lot::Mutex;

type PendingWrite<V> = (String, Arc<V>);

/// Queues writes and forwards them to the backing store on a dedicated
/// worker thread.
///
/// The queue is bounded. When it is full, or the policy has been closed, the
/// write is dropped and counted in [`WriteBack::dropped`]. Writes accepted
/// before [`close`](WritePolicy::close) are all forwarded before `close`
/// returns.
pub struct WriteBack<V: Send + Sync + 'static> {
  sender: mpsc::BoundedSender<PendingWrite<V>>,
  worker: Mutex<Option<JoinHandle<()>>>,
  dropped: AtomicU64,
}

impl<V: Send + Sync + 'static> WriteBack<V> {
  /// Spawns the worker thread. `buffer` is the queue capacity and must be at
  /// least one; zero is raised to one.
  pub fn new(store: Arc<dyn Loader<V>>, buffer: usize) -> Self {
    let (tx, rx): (
      mpsc::BoundedSender<PendingWrite<V>>,
      mpsc::BoundedReceiver<PendingWrite<V>>,
    ) = mpsc::bounded(buffer.max(1));

    let worker = thread::Builder::new()
      .name("cache-write-back".to_string())
      .spawn(move || {
        tracing::debug!("write-back worker started");
        // Ends once the sender is closed and the queue is drained.
        while let Ok((key, value)) = rx.recv() {
          if let Err(e) = store.put(&key, &value) {
            tracing::warn!(key = %key, error = %e, "write-back to backing store failed");
          }
        }
        tracing::debug!("write-back worker stopped");
      });

    let worker = match worker {
      Ok(handle) => Some(handle),
      Err(e) => {
        // Without a worker every write is dropped.
        tracing::warn!(error = %e, "failed to spawn write-back worker");
        let _ = tx.close();
        None
      }
    };

    Self {
      sender: tx,
      worker: Mutex::new(worker),
      dropped: AtomicU64::new(0),
    }
  }

  /// The number of writes discarded because the queue was full or closed.
  pub fn dropped(&self) -> u64 {
    self.dropped.load(Ordering::Relaxed)
  }
}

impl<V: Send + Sync + 'static> fmt::Debug for WriteBack<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WriteBack")
      .field("capacity", &self.sender.capacity())
      .field("queued", &self.sender.len())
      .field("dropped", &self.dropped())
      .finish()
  }
}

impl<V: Send + Sync + 'static> WritePolicy<V> for WriteBack<V> {
  fn on_write(&self, key: &str, value: &Arc<V>) {
    match self.sender.try_send((key.to_string(), value.clone())) {
      Ok(()) => {}
      Err(TrySendError::Full(_)) => {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key, "write-back queue full; dropping write");
      }
      Err(TrySendError::Closed(_)) => {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key, "write-back closed; dropping write");
      }
    }
  }

  fn close(&self) {
    // Stop accepting, then wait for the worker to drain what was accepted.
    let _ = self.sender.close();
    if let Some(handle) = self.worker.lock().take() {
      if handle.join().is_err() {
        tracing::warn!("write-back worker panicked");
      }
    }
  }
}

impl<V: Send + Sync + 'static> Drop for WriteBack<V> {
  fn drop(&mut self) {
    self.close();
  }
}
