/* src/router/core/rust/src/deferred.rs */

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::errors::RouterError;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SlotState {
  #[default]
  Pending,
  Ready(Value),
  Failed(RouterError),
}

impl SlotState {
  pub fn is_pending(&self) -> bool {
    matches!(self, Self::Pending)
  }
}

/// Single-assignment slot for a deferred loader value.
///
/// The slot starts `Pending` and moves to `Ready` or `Failed` exactly once;
/// later `settle` calls are ignored. Consumers either read the current state
/// or subscribe and are woken on the transition.
#[derive(Clone, Debug)]
pub struct Deferred {
  tx: Arc<watch::Sender<SlotState>>,
}

impl Deferred {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(SlotState::Pending);
    Self { tx: Arc::new(tx) }
  }

  /// Returns `false` if the slot was already settled.
  pub fn settle(&self, result: Result<Value, RouterError>) -> bool {
    self.tx.send_if_modified(|state| {
      if !state.is_pending() {
        return false;
      }
      *state = match result {
        Ok(value) => SlotState::Ready(value),
        Err(err) => SlotState::Failed(err),
      };
      true
    })
  }

  pub fn state(&self) -> SlotState {
    self.tx.borrow().clone()
  }

  pub fn is_settled(&self) -> bool {
    !self.tx.borrow().is_pending()
  }

  pub fn subscribe(&self) -> watch::Receiver<SlotState> {
    self.tx.subscribe()
  }

  /// Wait for the slot to settle and return the final state.
  pub async fn settled(&self) -> SlotState {
    let mut rx = self.tx.subscribe();
    match rx.wait_for(|state| !state.is_pending()).await {
      Ok(state) => state.clone(),
      // The sender is owned by `self`; a closed channel can only mean the
      // slot was never settled.
      Err(_) => SlotState::Pending,
    }
  }
}

impl Default for Deferred {
  fn default() -> Self {
    Self::new()
  }
}
