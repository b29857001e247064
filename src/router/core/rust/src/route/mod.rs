/* src/router/core/rust/src/route/mod.rs */

// Route descriptor tree: declarative definitions (in code or from a JSON
// manifest) validated into an immutable arena of nodes.

mod config;
mod segment;
mod tree;


pub use config::{ErrorSpec, LoaderRef, RouteConfig, RouteDef, parse_manifest};
pub use segment::Segment;
pub use tree::{RouteNode, RouteTree};
