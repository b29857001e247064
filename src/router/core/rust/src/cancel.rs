/* src/router/core/rust/src/cancel.rs */

use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation handle shared between a navigation attempt and the loaders it
/// started. Cancelling is idempotent; clones observe the same flag.
#[derive(Clone, Debug)]
pub struct CancelToken {
  tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(false);
    Self { tx: Arc::new(tx) }
  }

  pub fn cancel(&self) {
    self.tx.send_if_modified(|cancelled| {
      if *cancelled {
        return false;
      }
      *cancelled = true;
      true
    });
  }

  pub fn is_cancelled(&self) -> bool {
    *self.tx.borrow()
  }

  /// Resolves once `cancel` has been called on any clone.
  pub async fn cancelled(&self) {
    let mut rx = self.tx.subscribe();
    // The sender lives as long as `self`, so `wait_for` cannot observe a closed channel.
    let _ = rx.wait_for(|cancelled| *cancelled).await;
  }
}

impl Default for CancelToken {
  fn default() -> Self {
    Self::new()
  }
}
