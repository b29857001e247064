/* src/cli/core/src/config/tests.rs */

use std::path::Path;

use super::*;

fn write_config(dir: &Path, content: &str) {
  std::fs::write(dir.join("waypoint.toml"), content).unwrap();
}

#[test]
fn defaults_fill_optional_sections() {
  let config = parse_waypoint_config("[project]\nname = \"events-app\"\n").unwrap();
  assert_eq!(config.project.name, "events-app");
  assert_eq!(config.backend.base_url, "http://localhost:8080");
  assert_eq!(config.backend.timeout_ms, 10_000);
  assert!(config.backend.resources.is_empty());
  assert_eq!(config.router.routes, "routes.json");
  assert_eq!(config.log.filter, "info");
}

#[test]
fn full_config() {
  let config = parse_waypoint_config(
    r#"
[project]
name = "events-app"

[backend]
base_url = "https://api.example.com/"
timeout_ms = 2500
resources = ["event", "meal"]

[router]
routes = "app/routes.json"

[log]
filter = "waypoint_router=debug"
"#,
  )
  .unwrap();
  assert_eq!(config.backend.timeout().as_millis(), 2500);
  assert_eq!(config.backend.resources, vec!["event", "meal"]);
  assert_eq!(config.routes_path(Path::new("/srv/app")), Path::new("/srv/app/app/routes.json"));
  assert_eq!(config.log.filter, "waypoint_router=debug");
}

#[test]
fn rejects_invalid_backend() {
  let err = parse_waypoint_config(
    "[project]\nname = \"x\"\n[backend]\nbase_url = \"localhost:8080\"\n",
  )
  .unwrap_err();
  assert!(format!("{err:#}").contains("base_url"));

  let err =
    parse_waypoint_config("[project]\nname = \"x\"\n[backend]\ntimeout_ms = 0\n").unwrap_err();
  assert!(format!("{err:#}").contains("timeout_ms"));

  let err = parse_waypoint_config("[project]\nname = \"x\"\n[backend]\nresources = [\"\"]\n")
    .unwrap_err();
  assert!(format!("{err:#}").contains("resources"));
}

#[test]
fn missing_project_is_parse_error() {
  assert!(parse_waypoint_config("[router]\nroutes = \"r.json\"\n").is_err());
}

#[test]
fn discovery_walks_upward() {
  let tmp = tempfile::tempdir().unwrap();
  write_config(tmp.path(), "[project]\nname = \"events-app\"\n");
  let nested = tmp.path().join("src/pages/events");
  std::fs::create_dir_all(&nested).unwrap();

  let found = find_waypoint_config(&nested).unwrap();
  assert_eq!(found, tmp.path().canonicalize().unwrap().join("waypoint.toml"));
  let config = load_waypoint_config(&found).unwrap();
  assert_eq!(config.project.name, "events-app");
}

#[test]
fn discovery_fails_without_config() {
  let tmp = tempfile::tempdir().unwrap();
  let nested = tmp.path().join("app/src");
  std::fs::create_dir_all(&nested).unwrap();
  let err = loader::find_config_below(&nested, Some(tmp.path())).unwrap_err();
  assert!(err.to_string().contains("waypoint.toml not found"));
}

#[test]
fn discovery_stops_at_ceiling() {
  let tmp = tempfile::tempdir().unwrap();
  write_config(tmp.path(), "[project]\nname = \"outer\"\n");
  let inner = tmp.path().join("inner");
  let nested = inner.join("src");
  std::fs::create_dir_all(&nested).unwrap();

  assert!(loader::find_config_below(&nested, Some(&inner)).is_err());
  let found = loader::find_config_below(&nested, None).unwrap();
  assert_eq!(found, tmp.path().canonicalize().unwrap().join("waypoint.toml"));
}

#[test]
fn load_reports_path_on_error() {
  let tmp = tempfile::tempdir().unwrap();
  write_config(tmp.path(), "[project\n");
  let err = load_waypoint_config(&tmp.path().join("waypoint.toml")).unwrap_err();
  assert!(err.to_string().contains("waypoint.toml"));
}
