/* src/router/core/rust/src/route/config.rs */

use serde::Deserialize;

use crate::errors::RouterError;
use crate::handler::{ActionDef, HandlerRegistry, LoaderDef, LoaderMode};

/// Error view attached to a route; failures below it render here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpec {
  pub view: String,
}

impl ErrorSpec {
  pub fn new(view: impl Into<String>) -> Self {
    Self { view: view.into() }
  }
}

/// In-code route definition carrying live loader/action handles.
#[derive(Debug, Clone, Default)]
pub struct RouteDef {
  pub id: Option<String>,
  pub path: Option<String>,
  pub index: bool,
  pub loader: Option<LoaderDef>,
  pub action: Option<ActionDef>,
  pub error_boundary: Option<ErrorSpec>,
  pub children: Vec<RouteDef>,
}

impl RouteDef {
  pub fn new(path: impl Into<String>) -> Self {
    Self { path: Some(path.into()), ..Self::default() }
  }

  pub fn index() -> Self {
    Self { index: true, ..Self::default() }
  }

  /// Route without a path segment; only contributes nesting.
  pub fn layout() -> Self {
    Self::default()
  }

  pub fn id(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn loader(mut self, loader: LoaderDef) -> Self {
    self.loader = Some(loader);
    self
  }

  pub fn action(mut self, action: ActionDef) -> Self {
    self.action = Some(action);
    self
  }

  pub fn error_boundary(mut self, view: impl Into<String>) -> Self {
    self.error_boundary = Some(ErrorSpec::new(view));
    self
  }

  pub fn child(mut self, child: RouteDef) -> Self {
    self.children.push(child);
    self
  }

  pub fn children(mut self, children: impl IntoIterator<Item = RouteDef>) -> Self {
    self.children.extend(children);
    self
  }
}

/// Loader reference inside a route manifest: a bare name, or a name with an
/// explicit `defer` flag overriding the registered mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LoaderRef {
  Name(String),
  Spec {
    name: String,
    #[serde(default)]
    defer: Option<bool>,
  },
}

/// Serialized route entry as found in a route manifest (JSON).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub path: Option<String>,
  #[serde(default)]
  pub index: bool,
  #[serde(default)]
  pub loader: Option<LoaderRef>,
  #[serde(default)]
  pub action: Option<String>,
  #[serde(default)]
  pub error_boundary: Option<String>,
  #[serde(default)]
  pub children: Vec<RouteConfig>,
}

impl RouteConfig {
  /// Replace handler names with the registered handles.
  pub fn resolve(&self, registry: &HandlerRegistry) -> Result<RouteDef, RouterError> {
    let loader = match &self.loader {
      None => None,
      Some(LoaderRef::Name(name)) => Some(registry.get_loader(name)?.clone()),
      Some(LoaderRef::Spec { name, defer }) => {
        let def = registry.get_loader(name)?;
        Some(match defer {
          Some(true) => def.with_mode(LoaderMode::Deferred),
          Some(false) => def.with_mode(LoaderMode::Eager),
          None => def.clone(),
        })
      }
    };
    let action = match &self.action {
      Some(name) => Some(registry.get_action(name)?.clone()),
      None => None,
    };
    let children =
      self.children.iter().map(|c| c.resolve(registry)).collect::<Result<Vec<_>, _>>()?;

    Ok(RouteDef {
      id: self.id.clone(),
      path: self.path.clone(),
      index: self.index,
      loader,
      action,
      error_boundary: self.error_boundary.as_deref().map(ErrorSpec::new),
      children,
    })
  }
}

/// Parse a JSON route manifest: a top-level array of route entries.
pub fn parse_manifest(json: &str) -> Result<Vec<RouteConfig>, RouterError> {
  serde_json::from_str(json).map_err(|e| RouterError::config(format!("invalid route manifest: {e}")))
}
