/* src/router/core/rust/src/loader.rs */

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::task::JoinSet;

use crate::cancel::CancelToken;
use crate::deferred::{Deferred, SlotState};
use crate::errors::{RouterError, message_from_body};
use crate::handler::{LoaderArgs, LoaderMode};
use crate::matcher::MatchedChain;

#[derive(Debug, Clone)]
pub enum LoaderValue {
  Ready(Value),
  Pending(Deferred),
  Failed(RouterError),
}

#[derive(Debug, Clone)]
pub struct LoaderResult {
  pub node_id: String,
  pub value: LoaderValue,
}

impl LoaderResult {
  /// Current state, looking through a deferred slot.
  pub fn state(&self) -> SlotState {
    match &self.value {
      LoaderValue::Ready(v) => SlotState::Ready(v.clone()),
      LoaderValue::Pending(slot) => slot.state(),
      LoaderValue::Failed(e) => SlotState::Failed(e.clone()),
    }
  }

  /// Ready data, if any (including a settled deferred slot).
  pub fn data(&self) -> Option<Value> {
    match self.state() {
      SlotState::Ready(v) => Some(v),
      _ => None,
    }
  }

  pub fn deferred(&self) -> Option<&Deferred> {
    match &self.value {
      LoaderValue::Pending(slot) => Some(slot),
      _ => None,
    }
  }
}

/// Loader results of one chain, keyed by route node id.
pub type LoaderResults = BTreeMap<String, LoaderResult>;

/// A failed navigation step and where it should be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFailure {
  /// Route whose loader or action failed; `None` when nothing matched.
  pub node_id: Option<String>,
  /// Nearest route at or above `node_id` with an error boundary.
  pub boundary: Option<String>,
  pub error: RouterError,
}

impl RouteFailure {
  pub fn at(chain: &MatchedChain, position: usize, error: RouterError) -> Self {
    Self {
      node_id: chain.entries().get(position).map(|m| m.node.id.clone()),
      boundary: chain.boundary_for(position),
      error,
    }
  }

  pub fn unrouted(error: RouterError) -> Self {
    Self { node_id: None, boundary: None, error }
  }
}

#[derive(Debug)]
pub enum LoadOutcome {
  Loaded(LoaderResults),
  Failed(RouteFailure),
  Cancelled,
}

/// Treat `{"isError": true, "message": ...}` values as fetch failures.
pub fn normalize_loader_value(result: Result<Value, RouterError>) -> Result<Value, RouterError> {
  let value = result?;
  if value.get("isError").and_then(Value::as_bool) == Some(true) {
    let status = value
      .get("status")
      .and_then(Value::as_u64)
      .and_then(|s| u16::try_from(s).ok())
      .unwrap_or(500);
    let message = message_from_body(&value, "loader reported an error");
    return Err(RouterError::fetch_failed(status, message).with_payload(value));
  }
  Ok(value)
}

/// Run every loader of `chain` concurrently.
///
/// Eager loaders are awaited; the outcome is produced only after all of them
/// settle. Deferred loaders get a `Pending` slot right away and settle it from
/// a detached task. If `cancel` fires first, pending eager loaders are aborted.
pub async fn run_loaders(chain: &MatchedChain, cancel: &CancelToken) -> LoadOutcome {
  run_selected(chain, cancel, None).await
}

/// Re-run the eager loaders of `chain`, keeping deferred slots and other
/// entries from `previous`.
pub async fn revalidate(
  chain: &MatchedChain,
  previous: &LoaderResults,
  cancel: &CancelToken,
) -> LoadOutcome {
  run_selected(chain, cancel, Some(previous)).await
}

async fn run_selected(
  chain: &MatchedChain,
  cancel: &CancelToken,
  previous: Option<&LoaderResults>,
) -> LoadOutcome {
  let mut results = previous.cloned().unwrap_or_default();
  let mut join_set = JoinSet::new();

  for (position, entry) in chain.entries().iter().enumerate() {
    let Some(loader) = entry.node.loader.as_ref() else {
      continue;
    };
    let node_id = entry.node.id.clone();
    let args = LoaderArgs {
      params: entry.params.clone(),
      path: chain.path().to_string(),
      cancel: cancel.clone(),
    };
    let handler = loader.handler.clone();

    match loader.mode {
      LoaderMode::Deferred => {
        if previous.is_some() && results.contains_key(&node_id) {
          continue;
        }
        tracing::debug!(node = %node_id, loader = %loader.name, "starting deferred loader");
        let slot = Deferred::new();
        let writer = slot.clone();
        let id = node_id.clone();
        tokio::spawn(async move {
          // A panicking loader still settles its slot.
          let raw = tokio::spawn(handler(args))
            .await
            .unwrap_or_else(|e| Err(RouterError::fetch_failed(500, e.to_string())));
          let settled = normalize_loader_value(raw);
          if let Err(ref e) = settled {
            tracing::warn!(node = %id, error = %e, "deferred loader failed");
          }
          writer.settle(settled);
        });
        results.insert(node_id.clone(), LoaderResult { node_id, value: LoaderValue::Pending(slot) });
      }
      LoaderMode::Eager => {
        tracing::debug!(node = %node_id, loader = %loader.name, "starting loader");
        join_set.spawn(async move {
          let settled = normalize_loader_value(handler(args).await);
          (position, node_id, settled)
        });
      }
    }
  }

  let mut failures: Vec<(usize, RouterError)> = Vec::new();
  loop {
    let next = tokio::select! {
      biased;
      () = cancel.cancelled() => None,
      joined = join_set.join_next() => Some(joined),
    };
    let Some(joined) = next else {
      join_set.abort_all();
      return LoadOutcome::Cancelled;
    };
    let Some(joined) = joined else {
      break;
    };
    match joined {
      Ok((_, node_id, Ok(value))) => {
        results.insert(node_id.clone(), LoaderResult { node_id, value: LoaderValue::Ready(value) });
      }
      Ok((position, node_id, Err(err))) => {
        tracing::warn!(node = %node_id, error = %err, "loader failed");
        failures.push((position, err));
      }
      // JoinError: the loader task panicked.
      Err(e) => failures.push((usize::MAX, RouterError::fetch_failed(500, e.to_string()))),
    }
  }

  // The shallowest failure wins; its boundary covers the deeper ones.
  if let Some((position, err)) = failures.into_iter().min_by_key(|(p, _)| *p) {
    let position = position.min(chain.len().saturating_sub(1));
    return LoadOutcome::Failed(RouteFailure::at(chain, position, err));
  }
  LoadOutcome::Loaded(results)
}
