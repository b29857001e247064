/* src/cli/core/src/main.rs */

mod app;
mod config;
mod navigate;
mod render;
mod routes;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waypoint_router::Navigator;

use config::{WaypointConfig, find_waypoint_config, load_waypoint_config};
use navigate::SubmitArgs;

#[derive(Parser)]
#[command(name = "waypoint", about = "Inspect and drive a waypoint route tree")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the route tree
  Routes {
    /// Path to waypoint.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Show the chain of routes matching a path
  Match {
    path: String,
    /// Path to waypoint.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Navigate to one or more paths in order, running their loaders
  Navigate {
    #[arg(required = true)]
    paths: Vec<String>,
    /// Wait for deferred loaders before printing each state
    #[arg(long)]
    wait_deferred: bool,
    /// Path to waypoint.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Navigate to a path and submit to its action
  Submit {
    path: String,
    /// POST, PUT, PATCH or DELETE
    #[arg(short, long, default_value = "POST")]
    method: String,
    /// JSON payload
    #[arg(short, long)]
    data: Option<String>,
    /// Route id whose action should handle the submission
    #[arg(short, long)]
    target: Option<String>,
    /// Send the payload as multipart form data
    #[arg(long)]
    multipart: bool,
    /// Wait for deferred loaders before printing the state
    #[arg(long)]
    wait_deferred: bool,
    /// Path to waypoint.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

/// Resolve config path (explicit or auto-detected) and parse it
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, WaypointConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_waypoint_config(&cwd)?
    }
  };
  let config = load_waypoint_config(&path)?;
  Ok((path, config))
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn load(explicit: Option<PathBuf>, cmd: &str) -> Result<Navigator> {
  let (config_path, config) = resolve_config(explicit)?;
  init_tracing(&config.log.filter);
  ui::banner(cmd, &config.project.name);
  let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
  let tree = app::build_tree(&config, base_dir)?;
  tracing::debug!(routes = tree.len(), config = %config_path.display(), "loaded route tree");
  Ok(Navigator::new(tree))
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Command::Routes { config } => {
      let nav = load(config, "routes")?;
      routes::print_routes(nav.tree());
    }
    Command::Match { path, config } => {
      let nav = load(config, "match")?;
      routes::print_match(nav.tree(), &path)?;
    }
    Command::Navigate { paths, wait_deferred, config } => {
      let nav = load(config, "navigate")?;
      navigate::run_navigate(&nav, &paths, wait_deferred).await?;
    }
    Command::Submit { path, method, data, target, multipart, wait_deferred, config } => {
      let nav = load(config, "submit")?;
      let args = SubmitArgs { path, method, data, target, multipart };
      navigate::run_submit(&nav, &args, wait_deferred).await?;
    }
  }

  Ok(())
}
