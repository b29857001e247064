/* src/cli/core/src/routes.rs */

use anyhow::Result;
use waypoint_router::{RouteNode, RouteTree, match_path};

use crate::render;
use crate::ui::{self, CYAN, DIM, RESET};

fn describe(node: &RouteNode) -> String {
  let mut parts = vec![format!("id={}", node.id)];
  if let Some(loader) = &node.loader {
    parts.push(format!("loader={} ({:?})", loader.name, loader.mode).to_lowercase());
  }
  if let Some(action) = &node.action {
    parts.push(format!("action={}", action.name));
  }
  if let Some(boundary) = &node.error_boundary {
    parts.push(format!("boundary={}", boundary.view));
  }
  parts.join(" ")
}

fn label(node: &RouteNode) -> String {
  if node.is_index {
    "(index)".to_string()
  } else if node.is_layout() {
    "(layout)".to_string()
  } else {
    node.path.clone()
  }
}

/// Print the route tree, one node per line, indented by depth.
pub fn print_routes(tree: &RouteTree) {
  for (depth, node) in tree.walk() {
    let indent = "  ".repeat(depth);
    ui::detail(&format!(
      "{indent}{CYAN}{}{RESET}  {DIM}{}  {}{RESET}",
      label(&node),
      node.pattern,
      describe(&node)
    ));
  }
  ui::blank();
  ui::ok(&format!("{} routes", tree.len()));
}

pub fn print_match(tree: &RouteTree, path: &str) -> Result<()> {
  let chain = match_path(tree, path)?;
  ui::arrow(chain.path());
  for entry in chain.entries() {
    ui::detail(&format!("{CYAN}{}{RESET}  {DIM}{}{RESET}", entry.node.id, entry.pathname));
  }
  ui::json(&render::chain_json(&chain));
  Ok(())
}
