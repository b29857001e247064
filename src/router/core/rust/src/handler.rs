/* src/router/core/rust/src/handler.rs */

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::action::{ActionOutcome, Encoding, Method};
use crate::cancel::CancelToken;
use crate::errors::RouterError;
use crate::loader::LoaderResults;
use crate::location::Params;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Input handed to a loader when its route node is part of a matched chain.
#[derive(Clone, Debug)]
pub struct LoaderArgs {
  pub params: Params,
  /// Normalized location being navigated to.
  pub path: String,
  pub cancel: CancelToken,
}

/// Input handed to an action on submission.
#[derive(Clone, Debug)]
pub struct ActionArgs {
  pub params: Params,
  pub path: String,
  pub method: Method,
  pub payload: Value,
  pub encoding: Encoding,
  /// Loader results of the active chain, keyed by node id, so an action can
  /// read an ancestor's data without re-fetching it.
  pub route_data: LoaderResults,
  pub cancel: CancelToken,
}

pub type LoaderFn = Arc<dyn Fn(LoaderArgs) -> BoxFuture<Result<Value, RouterError>> + Send + Sync>;

pub type ActionFn =
  Arc<dyn Fn(ActionArgs) -> BoxFuture<Result<ActionOutcome, RouterError>> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderMode {
  /// Navigation waits for the value.
  #[default]
  Eager,
  /// Navigation settles without it; the value streams into a `Deferred` slot.
  Deferred,
}

#[derive(Clone)]
pub struct LoaderDef {
  pub name: String,
  pub mode: LoaderMode,
  pub handler: LoaderFn,
}

impl LoaderDef {
  pub fn new<F, Fut>(name: impl Into<String>, mode: LoaderMode, f: F) -> Self
  where
    F: Fn(LoaderArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, RouterError>> + Send + 'static,
  {
    Self { name: name.into(), mode, handler: Arc::new(move |args| Box::pin(f(args))) }
  }

  pub fn eager<F, Fut>(name: impl Into<String>, f: F) -> Self
  where
    F: Fn(LoaderArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, RouterError>> + Send + 'static,
  {
    Self::new(name, LoaderMode::Eager, f)
  }

  pub fn deferred<F, Fut>(name: impl Into<String>, f: F) -> Self
  where
    F: Fn(LoaderArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, RouterError>> + Send + 'static,
  {
    Self::new(name, LoaderMode::Deferred, f)
  }

  /// Same handler, different execution mode.
  pub fn with_mode(&self, mode: LoaderMode) -> Self {
    Self { name: self.name.clone(), mode, handler: self.handler.clone() }
  }
}

impl std::fmt::Debug for LoaderDef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LoaderDef").field("name", &self.name).field("mode", &self.mode).finish()
  }
}

#[derive(Clone)]
pub struct ActionDef {
  pub name: String,
  pub handler: ActionFn,
}

impl ActionDef {
  pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
  where
    F: Fn(ActionArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ActionOutcome, RouterError>> + Send + 'static,
  {
    Self { name: name.into(), handler: Arc::new(move |args| Box::pin(f(args))) }
  }
}

impl std::fmt::Debug for ActionDef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActionDef").field("name", &self.name).finish()
  }
}

/// Named loaders and actions that a route manifest refers to by string.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
  loaders: HashMap<String, LoaderDef>,
  actions: HashMap<String, ActionDef>,
}

impl HandlerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn loader(mut self, def: LoaderDef) -> Self {
    self.insert_loader(def);
    self
  }

  pub fn action(mut self, def: ActionDef) -> Self {
    self.insert_action(def);
    self
  }

  pub fn insert_loader(&mut self, def: LoaderDef) {
    self.loaders.insert(def.name.clone(), def);
  }

  pub fn insert_action(&mut self, def: ActionDef) {
    self.actions.insert(def.name.clone(), def);
  }

  pub fn get_loader(&self, name: &str) -> Result<&LoaderDef, RouterError> {
    self.loaders.get(name).ok_or_else(|| RouterError::config(format!("unknown loader '{name}'")))
  }

  pub fn get_action(&self, name: &str) -> Result<&ActionDef, RouterError> {
    self.actions.get(name).ok_or_else(|| RouterError::config(format!("unknown action '{name}'")))
  }

  pub fn loader_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }

  pub fn action_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::errors::ErrorKind;

  #[tokio::test]
  async fn loader_def_wraps_closure() {
    let def = LoaderDef::eager("events", |args: LoaderArgs| async move {
      Ok::<_, RouterError>(json!({ "path": args.path }))
    });
    assert_eq!(def.mode, LoaderMode::Eager);
    let args =
      LoaderArgs { params: Params::new(), path: "/events".into(), cancel: CancelToken::new() };
    let value = (def.handler)(args).await.unwrap();
    assert_eq!(value["path"], "/events");
  }

  #[test]
  fn with_mode_shares_handler() {
    let def = LoaderDef::eager("events", |_| async { Ok::<_, RouterError>(json!(null)) });
    let deferred = def.with_mode(LoaderMode::Deferred);
    assert_eq!(deferred.mode, LoaderMode::Deferred);
    assert!(Arc::ptr_eq(&def.handler, &deferred.handler));
  }

  #[test]
  fn registry_lookup() {
    let registry = HandlerRegistry::new()
      .loader(LoaderDef::eager("events", |_| async { Ok::<_, RouterError>(json!([])) }))
      .action(ActionDef::new("events.mutate", |_| async {
        Ok::<_, RouterError>(ActionOutcome::NoOp)
      }));
    assert!(registry.get_loader("events").is_ok());
    assert!(registry.get_action("events.mutate").is_ok());
    assert_eq!(registry.get_loader("missing").unwrap_err().kind(), ErrorKind::Config);
    assert_eq!(registry.loader_names(), vec!["events"]);
    assert_eq!(registry.action_names(), vec!["events.mutate"]);
  }

  #[test]
  fn loader_mode_deserializes_lowercase() {
    let mode: LoaderMode = serde_json::from_value(json!("deferred")).unwrap();
    assert_eq!(mode, LoaderMode::Deferred);
  }
}
