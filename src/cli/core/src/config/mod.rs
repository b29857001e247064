/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{find_waypoint_config, load_waypoint_config, parse_waypoint_config};
pub use types::WaypointConfig;
