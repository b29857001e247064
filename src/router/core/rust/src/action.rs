/* src/router/core/rust/src/action.rs */

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cancel::CancelToken;
use crate::errors::RouterError;
use crate::handler::ActionArgs;
use crate::loader::{LoaderResults, RouteFailure};
use crate::location::Params;
use crate::matcher::MatchedChain;
use crate::route::{RouteNode, RouteTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
  Post,
  Put,
  Patch,
  Delete,
}

impl Method {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Post => "POST",
      Self::Put => "PUT",
      Self::Patch => "PATCH",
      Self::Delete => "DELETE",
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Method {
  type Err = RouterError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_uppercase().as_str() {
      "POST" => Ok(Self::Post),
      "PUT" => Ok(Self::Put),
      "PATCH" => Ok(Self::Patch),
      "DELETE" => Ok(Self::Delete),
      _ => Err(RouterError::no_action(format!("unsupported submission method '{s}'"))),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
  #[default]
  Json,
  /// Form data that may carry file parts; the payload is an object of fields.
  Multipart,
}

/// A mutation request against the active chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
  pub method: Method,
  pub payload: Value,
  pub encoding: Encoding,
  /// Route id whose action should run; defaults to the deepest chain entry
  /// that has one.
  pub target: Option<String>,
}

impl Submission {
  pub fn new(method: Method, payload: Value) -> Self {
    Self { method, payload, encoding: Encoding::Json, target: None }
  }

  pub fn post(payload: Value) -> Self {
    Self::new(Method::Post, payload)
  }

  pub fn put(payload: Value) -> Self {
    Self::new(Method::Put, payload)
  }

  pub fn patch(payload: Value) -> Self {
    Self::new(Method::Patch, payload)
  }

  pub fn delete() -> Self {
    Self::new(Method::Delete, Value::Null)
  }

  pub fn multipart(mut self) -> Self {
    self.encoding = Encoding::Multipart;
    self
  }

  pub fn target(mut self, id: impl Into<String>) -> Self {
    self.target = Some(id.into());
    self
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
  /// Navigate to this location (absolute, or relative to the submitting route).
  Redirect(String),
  /// Re-run the eager loaders of the active chain.
  Revalidate,
  /// Stay put and expose the value as action data (e.g. validation errors).
  Data(Value),
  NoOp,
}

/// Route whose action handles a submission.
#[derive(Debug, Clone)]
pub struct ActionTarget {
  pub node: Arc<RouteNode>,
  pub params: Params,
  /// Nearest route at or above the target with an error boundary.
  pub boundary: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
  Completed(ActionOutcome),
  /// A newer submission started before this one settled; its result is dropped.
  Superseded,
  Failed(RouteFailure),
}

/// Runs actions with last-submission-wins semantics.
#[derive(Debug, Default)]
pub struct ActionDispatcher {
  latest: AtomicU64,
}

impl ActionDispatcher {
  pub fn new() -> Self {
    Self::default()
  }

  /// Pick the route whose action handles a submission: the explicit target
  /// if given, else the deepest chain entry with an action.
  pub fn resolve_target(
    tree: &RouteTree,
    chain: &MatchedChain,
    target: Option<&str>,
  ) -> Result<ActionTarget, RouterError> {
    let node = match target {
      Some(id) => {
        let node = tree.lookup(id)?;
        if node.action.is_none() {
          return Err(RouterError::no_action(format!("route '{id}' has no action")));
        }
        node
      }
      None => chain
        .entries()
        .iter()
        .rev()
        .find(|m| m.node.action.is_some())
        .map(|m| m.node.clone())
        .ok_or_else(|| {
          RouterError::no_action(format!("no route in '{}' has an action", chain.path()))
        })?,
    };

    let params = chain.get(&node.id).map(|m| m.params.clone()).unwrap_or_else(|| chain.params());
    let boundary = match chain.position(&node.id) {
      Some(position) => chain.boundary_for(position),
      None => nearest_boundary(tree, &node)?,
    };
    Ok(ActionTarget { node, params, boundary })
  }

  /// Run the action for `submission`. Resolution errors are returned as
  /// `Err`; handler errors become `Dispatch::Failed` with kind `ActionFailed`.
  pub async fn submit(
    &self,
    tree: &RouteTree,
    chain: &MatchedChain,
    results: &LoaderResults,
    submission: Submission,
    cancel: &CancelToken,
  ) -> Result<Dispatch, RouterError> {
    let target = Self::resolve_target(tree, chain, submission.target.as_deref())?;
    let Some(action) = target.node.action.clone() else {
      return Err(RouterError::no_action(format!("route '{}' has no action", target.node.id)));
    };
    let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

    tracing::debug!(
      node = %target.node.id,
      action = %action.name,
      method = %submission.method,
      ticket,
      "submitting"
    );
    let args = ActionArgs {
      params: target.params.clone(),
      path: chain.path().to_string(),
      method: submission.method,
      payload: submission.payload,
      encoding: submission.encoding,
      route_data: results.clone(),
      cancel: cancel.clone(),
    };
    let result = (action.handler)(args).await;

    if self.latest.load(Ordering::SeqCst) != ticket {
      tracing::debug!(node = %target.node.id, ticket, "submission superseded");
      return Ok(Dispatch::Superseded);
    }
    Ok(match result {
      Ok(outcome) => Dispatch::Completed(outcome),
      Err(err) => {
        tracing::warn!(node = %target.node.id, error = %err, "action failed");
        Dispatch::Failed(RouteFailure {
          node_id: Some(target.node.id.clone()),
          boundary: target.boundary,
          error: err.into_action_failed(),
        })
      }
    })
  }
}

fn nearest_boundary(tree: &RouteTree, node: &RouteNode) -> Result<Option<String>, RouterError> {
  if node.error_boundary.is_some() {
    return Ok(Some(node.id.clone()));
  }
  let ancestors = tree.ancestors(&node.id)?;
  Ok(ancestors.iter().rev().find(|n| n.error_boundary.is_some()).map(|n| n.id.clone()))
}
