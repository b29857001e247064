/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::WaypointConfig;

const CONFIG_FILE: &str = "waypoint.toml";

/// Walk upward from `start` to find `waypoint.toml`, like Cargo.toml discovery
pub fn find_waypoint_config(start: &Path) -> Result<PathBuf> {
  find_config_below(start, None)
}

/// Same walk, but never above `ceiling`.
pub(super) fn find_config_below(start: &Path, ceiling: Option<&Path>) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  let ceiling =
    ceiling.map(Path::canonicalize).transpose().context("failed to canonicalize ceiling")?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if ceiling.as_deref() == Some(dir.as_path()) || !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

pub fn load_waypoint_config(path: &Path) -> Result<WaypointConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  parse_waypoint_config(&content).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_waypoint_config(content: &str) -> Result<WaypointConfig> {
  let config: WaypointConfig = toml::from_str(content).context("failed to parse TOML")?;
  config.validate()?;
  Ok(config)
}
