/* src/cli/core/src/app.rs */

// Wire a config file into a route tree: backend resources become named
// handlers, the JSON manifest refers to them by name.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use waypoint_backend::{Resource, ResourceClient, register_resource};
use waypoint_router::{HandlerRegistry, RouteTree, parse_manifest};

use crate::config::WaypointConfig;

pub fn build_registry(config: &WaypointConfig) -> Result<HandlerRegistry> {
  let client = ResourceClient::new(&config.backend.base_url, config.backend.timeout())
    .context("failed to create backend client")?;
  let mut registry = HandlerRegistry::new();
  for name in &config.backend.resources {
    let resource = Resource::new(name.as_str());
    tracing::debug!(resource = %name, collection = %resource.plural(), "registering resource");
    register_resource(&mut registry, &client, &resource);
  }
  Ok(registry)
}

pub fn build_tree(config: &WaypointConfig, base_dir: &Path) -> Result<Arc<RouteTree>> {
  let registry = build_registry(config)?;
  let routes_path = config.routes_path(base_dir);
  let manifest = std::fs::read_to_string(&routes_path)
    .with_context(|| format!("failed to read {}", routes_path.display()))?;
  let configs = parse_manifest(&manifest).with_context(|| format!("in {}", routes_path.display()))?;
  let tree = RouteTree::from_config(&configs, &registry)
    .with_context(|| format!("invalid route tree in {}", routes_path.display()))?;
  Ok(Arc::new(tree))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::parse_waypoint_config;

  const MANIFEST: &str = r#"[
    {
      "path": "/",
      "id": "root",
      "errorBoundary": "ErrorPage",
      "children": [
        { "index": true, "id": "home" },
        {
          "path": "events",
          "id": "events",
          "loader": "events",
          "children": [
            { "index": true },
            { "path": ":eventId", "id": "event-detail", "loader": "event", "action": "events.mutate" }
          ]
        }
      ]
    }
  ]"#;

  #[test]
  fn builds_tree_from_manifest_and_resources() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("routes.json"), MANIFEST).unwrap();
    let config =
      parse_waypoint_config("[project]\nname = \"events-app\"\n[backend]\nresources = [\"event\"]\n")
        .unwrap();

    let tree = build_tree(&config, tmp.path()).unwrap();
    assert_eq!(tree.len(), 5);
    let detail = tree.lookup("event-detail").unwrap();
    assert_eq!(detail.loader.as_ref().unwrap().name, "event");
    assert_eq!(detail.action.as_ref().unwrap().name, "events.mutate");
  }

  #[test]
  fn unknown_handler_names_the_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("routes.json"), MANIFEST).unwrap();
    let config = parse_waypoint_config("[project]\nname = \"events-app\"\n").unwrap();

    let err = build_tree(&config, tmp.path()).unwrap_err();
    assert!(err.to_string().contains("routes.json"));
    assert!(format!("{err:#}").contains("unknown loader 'events'"));
  }

  #[test]
  fn demo_project_builds() {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../demo/events-app");
    let config = crate::config::load_waypoint_config(&base.join("waypoint.toml")).unwrap();
    let tree = build_tree(&config, &base).unwrap();
    let chain = waypoint_router::match_path(&tree, "/events/e1/edit").unwrap();
    assert_eq!(chain.node_ids(), vec!["root", "events", "event-edit"]);
  }

  #[test]
  fn missing_manifest_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = parse_waypoint_config("[project]\nname = \"events-app\"\n").unwrap();
    let err = build_tree(&config, tmp.path()).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
  }
}
