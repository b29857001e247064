/* src/cli/core/src/config/types.rs */

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WaypointConfig {
  pub project: ProjectConfig,
  #[serde(default)]
  pub backend: BackendConfig,
  #[serde(default)]
  pub router: RouterSection,
  #[serde(default)]
  pub log: LogSection,
}

impl WaypointConfig {
  pub fn validate(&self) -> Result<()> {
    if self.project.name.trim().is_empty() {
      bail!("project.name must not be empty");
    }
    self.backend.validate()
  }

  /// Route manifest path, relative paths resolved against `base_dir`.
  pub fn routes_path(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.router.routes)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  #[serde(default)]
  pub resources: Vec<String>,
}

impl Default for BackendConfig {
  fn default() -> Self {
    Self { base_url: default_base_url(), timeout_ms: default_timeout_ms(), resources: Vec::new() }
  }
}

impl BackendConfig {
  pub fn validate(&self) -> Result<()> {
    if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
      bail!("backend.base_url must start with http:// or https:// (got \"{}\")", self.base_url);
    }
    if self.timeout_ms == 0 {
      bail!("backend.timeout_ms must be greater than 0");
    }
    if self.resources.iter().any(|r| r.trim().is_empty()) {
      bail!("backend.resources must not contain empty names");
    }
    Ok(())
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterSection {
  #[serde(default = "default_routes")]
  pub routes: String,
}

impl Default for RouterSection {
  fn default() -> Self {
    Self { routes: default_routes() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
  #[serde(default = "default_filter")]
  pub filter: String,
}

impl Default for LogSection {
  fn default() -> Self {
    Self { filter: default_filter() }
  }
}

fn default_base_url() -> String {
  waypoint_backend::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
  10_000
}

fn default_routes() -> String {
  "routes.json".to_string()
}

fn default_filter() -> String {
  "info".to_string()
}
