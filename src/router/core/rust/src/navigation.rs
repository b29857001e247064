/* src/router/core/rust/src/navigation.rs */

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::action::{ActionDispatcher, ActionOutcome, Dispatch, Submission};
use crate::cancel::CancelToken;
use crate::errors::RouterError;
use crate::loader::{self, LoadOutcome, LoaderResults, RouteFailure, run_loaders};
use crate::location::{apply_relative, normalize_path};
use crate::matcher::{MatchedChain, RelativeMode, match_path, resolve_relative};
use crate::route::RouteTree;

/// Oldest entries are dropped past this many committed locations.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  #[default]
  Idle,
  Loading,
  Submitting,
  Redirecting,
  Error,
}

/// Snapshot of the navigation controller, published on every transition.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
  pub status: Status,
  /// Last committed location.
  pub location: Option<String>,
  /// Location being loaded while `status` is `Loading` or `Redirecting`.
  pub pending_location: Option<String>,
  /// Last successfully loaded chain; kept when a later attempt fails.
  pub chain: Option<MatchedChain>,
  pub results: LoaderResults,
  pub error: Option<RouteFailure>,
  /// Value returned by an action that neither redirected nor revalidated.
  pub action_data: Option<Value>,
}

impl NavigationState {
  /// Ready loader data for a route in the active chain.
  pub fn route_data(&self, id: &str) -> Option<Value> {
    self.results.get(id)?.data()
  }

  pub fn is_idle(&self) -> bool {
    self.status == Status::Idle
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
  Committed,
  Failed(RouteFailure),
  /// A newer navigation, submission or revalidation started first; nothing
  /// was written.
  Superseded,
}

struct Attempt {
  generation: u64,
  cancel: CancelToken,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum HistoryOp {
  Push,
  Pop,
}

/// Owns the navigation state machine for one route tree.
///
/// Every `navigate`, `submit` and `revalidate` starts a new attempt and
/// cancels the previous one. State is written only while the attempt is
/// still the latest, so a superseded attempt settles as `Superseded`
/// without touching the published state.
pub struct Navigator {
  tree: Arc<RouteTree>,
  state: watch::Sender<NavigationState>,
  generation: AtomicU64,
  active: Mutex<Option<CancelToken>>,
  dispatcher: ActionDispatcher,
  history: Mutex<VecDeque<String>>,
}

impl Navigator {
  pub fn new(tree: Arc<RouteTree>) -> Self {
    let (state, _rx) = watch::channel(NavigationState::default());
    Self {
      tree,
      state,
      generation: AtomicU64::new(0),
      active: Mutex::new(None),
      dispatcher: ActionDispatcher::new(),
      history: Mutex::new(VecDeque::new()),
    }
  }

  pub fn tree(&self) -> &Arc<RouteTree> {
    &self.tree
  }

  pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
    self.state.subscribe()
  }

  pub fn snapshot(&self) -> NavigationState {
    self.state.borrow().clone()
  }

  /// Committed locations, oldest first, at most `HISTORY_LIMIT` of them.
  pub fn history(&self) -> Vec<String> {
    self.history.lock().iter().cloned().collect()
  }

  pub async fn navigate(&self, path: &str) -> Settlement {
    let attempt = self.begin();
    self.load_location(&attempt, path, HistoryOp::Push).await
  }

  /// Navigate to a target relative to the active chain.
  pub async fn navigate_relative(&self, to: &str, mode: RelativeMode) -> Settlement {
    let target = match &self.state.borrow().chain {
      Some(chain) => resolve_relative(chain, to, mode),
      None => apply_relative("/", to),
    };
    self.navigate(&target).await
  }

  /// Go back to the previously committed location. `None` when there is no
  /// earlier entry.
  pub async fn back(&self) -> Option<Settlement> {
    let target = {
      let history = self.history.lock();
      history.len().checked_sub(2).map(|i| history[i].clone())?
    };
    let attempt = self.begin();
    Some(self.load_location(&attempt, &target, HistoryOp::Pop).await)
  }

  /// Submit a mutation to the active chain.
  ///
  /// Resolution errors (`NoAction`, `NotFound`) are returned as `Err` before
  /// any attempt starts, so the published state is left untouched.
  pub async fn submit(&self, submission: Submission) -> Result<Settlement, RouterError> {
    let (chain, results) = {
      let state = self.state.borrow();
      (state.chain.clone(), state.results.clone())
    };
    let Some(chain) = chain else {
      return Err(RouterError::no_action("no active route to submit to"));
    };
    ActionDispatcher::resolve_target(&self.tree, &chain, submission.target.as_deref())?;

    let attempt = self.begin();
    if !self.commit(attempt.generation, |s| {
      s.status = Status::Submitting;
      s.action_data = None;
    }) {
      return Ok(Settlement::Superseded);
    }

    let dispatch = match self
      .dispatcher
      .submit(&self.tree, &chain, &results, submission, &attempt.cancel)
      .await
    {
      Ok(dispatch) => dispatch,
      Err(err) => {
        tracing::debug!(path = %chain.path(), error = %err, "submission rejected");
        self.commit(attempt.generation, |s| s.status = Status::Idle);
        return Err(err);
      }
    };

    let settlement = match dispatch {
      Dispatch::Superseded => Settlement::Superseded,
      Dispatch::Failed(failure) => self.fail(attempt.generation, failure),
      Dispatch::Completed(ActionOutcome::Redirect(to)) => {
        let target = resolve_relative(&chain, &to, RelativeMode::Route);
        tracing::debug!(from = %chain.path(), to = %target, "action redirect");
        if !self.commit(attempt.generation, |s| {
          s.status = Status::Redirecting;
          s.pending_location = Some(target.clone());
        }) {
          return Ok(Settlement::Superseded);
        }
        self.load_location(&attempt, &target, HistoryOp::Push).await
      }
      Dispatch::Completed(ActionOutcome::Revalidate) => {
        self.reload(&attempt, chain, &results).await
      }
      Dispatch::Completed(ActionOutcome::Data(value)) => self.settle_idle(&attempt, Some(value)),
      Dispatch::Completed(ActionOutcome::NoOp) => self.settle_idle(&attempt, None),
    };
    Ok(settlement)
  }

  /// Re-run the eager loaders of the active chain. With no active chain
  /// there is nothing to reload and the call commits immediately.
  pub async fn revalidate(&self) -> Settlement {
    let attempt = self.begin();
    let (chain, results) = {
      let state = self.state.borrow();
      (state.chain.clone(), state.results.clone())
    };
    match chain {
      Some(chain) => self.reload(&attempt, chain, &results).await,
      None => self.settle_idle(&attempt, None),
    }
  }

  fn begin(&self) -> Attempt {
    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let cancel = CancelToken::new();
    if let Some(previous) = self.active.lock().replace(cancel.clone()) {
      previous.cancel();
    }
    Attempt { generation, cancel }
  }

  /// Apply `update` only if `generation` is still the latest attempt.
  fn commit(&self, generation: u64, update: impl FnOnce(&mut NavigationState)) -> bool {
    self.state.send_if_modified(|state| {
      if self.generation.load(Ordering::SeqCst) != generation {
        return false;
      }
      update(state);
      true
    })
  }

  async fn load_location(&self, attempt: &Attempt, path: &str, op: HistoryOp) -> Settlement {
    let location = normalize_path(path);
    let generation = attempt.generation;
    tracing::debug!(path = %location, generation, "navigating");
    if !self.commit(generation, |s| {
      s.status = Status::Loading;
      s.pending_location = Some(location.clone());
    }) {
      return Settlement::Superseded;
    }

    let chain = match match_path(&self.tree, &location) {
      Ok(chain) => chain,
      Err(err) => return self.fail(generation, RouteFailure::unrouted(err)),
    };

    match run_loaders(&chain, &attempt.cancel).await {
      LoadOutcome::Cancelled => {
        tracing::debug!(path = %location, generation, "navigation superseded");
        Settlement::Superseded
      }
      LoadOutcome::Failed(failure) => self.fail(generation, failure),
      LoadOutcome::Loaded(results) => {
        let committed = self.commit(generation, |s| {
          s.status = Status::Idle;
          s.location = Some(location.clone());
          s.pending_location = None;
          s.chain = Some(chain);
          s.results = results;
          s.error = None;
          s.action_data = None;
          let mut history = self.history.lock();
          if op == HistoryOp::Pop {
            history.pop_back();
          } else {
            if history.len() == HISTORY_LIMIT {
              history.pop_front();
            }
            history.push_back(location.clone());
          }
        });
        if committed {
          tracing::info!(path = %location, generation, "navigation committed");
          Settlement::Committed
        } else {
          tracing::debug!(path = %location, generation, "navigation superseded");
          Settlement::Superseded
        }
      }
    }
  }

  async fn reload(&self, attempt: &Attempt, chain: MatchedChain, previous: &LoaderResults) -> Settlement {
    let generation = attempt.generation;
    if !self.commit(generation, |s| s.status = Status::Loading) {
      return Settlement::Superseded;
    }
    match loader::revalidate(&chain, previous, &attempt.cancel).await {
      LoadOutcome::Cancelled => Settlement::Superseded,
      LoadOutcome::Failed(failure) => self.fail(generation, failure),
      LoadOutcome::Loaded(results) => {
        let path = chain.path().to_string();
        if self.commit(generation, |s| {
          s.status = Status::Idle;
          s.pending_location = None;
          s.chain = Some(chain);
          s.results = results;
          s.error = None;
          s.action_data = None;
        }) {
          tracing::info!(path = %path, generation, "revalidated");
          Settlement::Committed
        } else {
          Settlement::Superseded
        }
      }
    }
  }

  fn settle_idle(&self, attempt: &Attempt, action_data: Option<Value>) -> Settlement {
    if self.commit(attempt.generation, |s| {
      s.status = Status::Idle;
      s.pending_location = None;
      s.error = None;
      s.action_data = action_data;
    }) {
      Settlement::Committed
    } else {
      Settlement::Superseded
    }
  }

  /// Move to `Error`, keeping the last good chain and results.
  fn fail(&self, generation: u64, failure: RouteFailure) -> Settlement {
    let recorded = failure.clone();
    if self.commit(generation, |s| {
      s.status = Status::Error;
      s.pending_location = None;
      s.error = Some(recorded);
    }) {
      tracing::warn!(
        node = failure.node_id.as_deref().unwrap_or("-"),
        boundary = failure.boundary.as_deref().unwrap_or("-"),
        error = %failure.error,
        "navigation failed"
      );
      Settlement::Failed(failure)
    } else {
      Settlement::Superseded
    }
  }
}
