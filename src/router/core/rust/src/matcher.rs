/* src/router/core/rust/src/matcher.rs */

use std::sync::Arc;

use crate::errors::RouterError;
use crate::location::{Params, apply_relative, join_segments, normalize_path, split_segments};
use crate::route::{RouteNode, RouteTree, Segment};

/// One node of a matched chain with the params captured up to (and
/// including) it and the URL prefix it consumed.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
  pub node: Arc<RouteNode>,
  pub params: Params,
  pub pathname: String,
}

impl PartialEq for MatchedRoute {
  fn eq(&self, other: &Self) -> bool {
    self.node.id == other.node.id && self.params == other.params && self.pathname == other.pathname
  }
}

/// Root-to-leaf chain of route nodes matching a location.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedChain {
  path: String,
  entries: Vec<MatchedRoute>,
}

impl MatchedChain {
  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn entries(&self) -> &[MatchedRoute] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn leaf(&self) -> Option<&MatchedRoute> {
    self.entries.last()
  }

  /// Params of the deepest entry (the full set for this location).
  pub fn params(&self) -> Params {
    self.leaf().map(|m| m.params.clone()).unwrap_or_default()
  }

  pub fn node_ids(&self) -> Vec<&str> {
    self.entries.iter().map(|m| m.node.id.as_str()).collect()
  }

  pub fn position(&self, id: &str) -> Option<usize> {
    self.entries.iter().position(|m| m.node.id == id)
  }

  pub fn get(&self, id: &str) -> Option<&MatchedRoute> {
    self.entries.iter().find(|m| m.node.id == id)
  }

  /// Id of the nearest entry at or above `position` with an error boundary.
  pub fn boundary_for(&self, position: usize) -> Option<String> {
    let end = position.min(self.entries.len().checked_sub(1)?);
    self.entries[..=end]
      .iter()
      .rev()
      .find(|m| m.node.error_boundary.is_some())
      .map(|m| m.node.id.clone())
  }
}

/// Resolve `path` against the route tree.
///
/// Siblings are tried static > dynamic > pathless layout > catch-all, by the
/// kinds of all their segments and then declaration order. A branch that
/// cannot consume the rest of the path is abandoned and the next candidate
/// tried. Index children only match once the path is fully consumed.
pub fn match_path(tree: &RouteTree, path: &str) -> Result<MatchedChain, RouterError> {
  let normalized = normalize_path(path);
  let segments = split_segments(&normalized);
  let mut entries = Vec::new();

  let mut cursor = Cursor { tree, segments: &segments, entries: &mut entries };
  if cursor.descend(tree.root_indices(), 0, &Params::new()) {
    Ok(MatchedChain { path: normalized.clone(), entries })
  } else {
    Err(RouterError::no_match(&normalized))
  }
}

struct Cursor<'a> {
  tree: &'a RouteTree,
  segments: &'a [&'a str],
  entries: &'a mut Vec<MatchedRoute>,
}

impl Cursor<'_> {
  fn descend(&mut self, candidates: &[usize], consumed: usize, params: &Params) -> bool {
    for idx in ranked(self.tree, candidates) {
      let node = self.tree.node(idx).clone();
      if node.is_index {
        continue;
      }
      let mut captured = params.clone();
      let Some(used) = consume(&node.segments, &self.segments[consumed..], &mut captured) else {
        continue;
      };
      let next = consumed + used;
      let pathname = join_segments(self.segments[..next].iter().copied());
      self.entries.push(MatchedRoute { node: node.clone(), params: captured.clone(), pathname });

      if next == self.segments.len() {
        self.terminate(&node, &captured);
        return true;
      }
      if self.descend(&node.children, next, &captured) {
        return true;
      }
      self.entries.pop();
    }
    false
  }

  /// The path is used up at `node`: extend into its index route, if any,
  /// possibly through pathless layouts.
  fn terminate(&mut self, node: &RouteNode, params: &Params) -> bool {
    let pathname = self.entries.last().map(|m| m.pathname.clone()).unwrap_or_else(|| "/".into());
    for &c in &node.children {
      let child = self.tree.node(c);
      if child.is_index {
        self.entries.push(MatchedRoute {
          node: child.clone(),
          params: params.clone(),
          pathname: pathname.clone(),
        });
        return true;
      }
    }
    for &c in &node.children {
      let child = self.tree.node(c).clone();
      if !child.is_layout() {
        continue;
      }
      self.entries.push(MatchedRoute {
        node: child.clone(),
        params: params.clone(),
        pathname: pathname.clone(),
      });
      if self.terminate(&child, params) {
        return true;
      }
      self.entries.pop();
    }
    false
  }
}

/// A pathless layout ranks as its best-ranked descendant.
fn rank_key(tree: &RouteTree, node: &RouteNode) -> Vec<u8> {
  if !node.segments.is_empty() {
    return node.segments.iter().map(Segment::rank).collect();
  }
  node
    .children
    .iter()
    .map(|&c| tree.node(c))
    .filter(|child| !child.is_index)
    .map(|child| rank_key(tree, child))
    .max()
    .unwrap_or_else(|| vec![1])
}

fn ranked(tree: &RouteTree, candidates: &[usize]) -> Vec<usize> {
  let mut order = candidates.to_vec();
  // Stable: ties keep declaration order.
  order.sort_by_key(|&i| std::cmp::Reverse(rank_key(tree, tree.node(i))));
  order
}

/// Consume `pattern` from the front of `path`, returning the number of path
/// segments used.
fn consume(pattern: &[Segment], path: &[&str], params: &mut Params) -> Option<usize> {
  let mut used = 0;
  for segment in pattern {
    match segment {
      Segment::Static(s) => {
        if path.get(used) != Some(&s.as_str()) {
          return None;
        }
        used += 1;
      }
      Segment::Param(name) => {
        let value = path.get(used)?;
        params.insert(name.clone(), (*value).to_string());
        used += 1;
      }
      Segment::Splat => {
        params.insert("*".to_string(), path[used..].join("/"));
        used = path.len();
      }
    }
  }
  Some(used)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelativeMode {
  /// `..` climbs the matched route hierarchy.
  #[default]
  Route,
  /// `..` drops one URL segment.
  Path,
}

/// Resolve a link target relative to the active chain.
///
/// In route mode `..` moves to the parent route's pathname, skipping index
/// and layout entries that share a pathname with their parent, so a node
/// that consumed several segments (`:eventId/edit`) is left in one step.
pub fn resolve_relative(chain: &MatchedChain, to: &str, mode: RelativeMode) -> String {
  if to.starts_with('/') {
    return normalize_path(to);
  }
  if mode == RelativeMode::Path || chain.is_empty() {
    return apply_relative(chain.path(), to);
  }

  let mut route_paths: Vec<&str> = Vec::with_capacity(chain.len());
  for entry in chain.entries() {
    if route_paths.last() != Some(&entry.pathname.as_str()) {
      route_paths.push(&entry.pathname);
    }
  }

  let mut extra: Vec<&str> = Vec::new();
  for part in split_segments(to) {
    match part {
      "." => {}
      ".." => {
        if extra.pop().is_none() {
          route_paths.pop();
        }
      }
      other => extra.push(other),
    }
  }

  let base = route_paths.last().copied().unwrap_or("/");
  join_segments(split_segments(base).into_iter().chain(extra))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::EventsApp;
  use crate::route::RouteDef;

  fn ids(chain: &MatchedChain) -> Vec<&str> {
    chain.node_ids()
  }

  #[test]
  fn matches_nested_param_route() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events/e1").unwrap();
    assert_eq!(ids(&chain), vec!["root", "events", "event-detail"]);
    assert_eq!(chain.params().get("eventId").map(String::as_str), Some("e1"));
    assert_eq!(chain.leaf().unwrap().pathname, "/events/e1");
    assert_eq!(chain.entries()[1].pathname, "/events");
  }

  #[test]
  fn top_level_events_tree() {
    let tree = RouteTree::build(vec![
      RouteDef::new("/events")
        .id("events")
        .children([RouteDef::index().id("events-index"), RouteDef::new(":eventId").id("event")]),
    ])
    .unwrap();
    let chain = match_path(&tree, "/events/e1").unwrap();
    assert_eq!(ids(&chain), vec!["events", "event"]);
    assert_eq!(chain.entries()[1].params.get("eventId").map(String::as_str), Some("e1"));
    assert_eq!(chain.entries()[1].params.len(), 1);
  }

  #[test]
  fn events_index_and_home_index() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events").unwrap();
    assert_eq!(ids(&chain), vec!["root", "events", "events-index"]);
    let chain = match_path(&app.tree, "/").unwrap();
    assert_eq!(ids(&chain), vec!["root", "home"]);
  }

  #[test]
  fn static_beats_dynamic() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events/new").unwrap();
    assert_eq!(ids(&chain), vec!["root", "events", "event-new"]);
    assert!(chain.params().is_empty());
  }

  #[test]
  fn multi_segment_child_via_backtracking() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events/e1/edit").unwrap();
    assert_eq!(ids(&chain), vec!["root", "events", "event-edit"]);
    assert_eq!(chain.params().get("eventId").map(String::as_str), Some("e1"));
  }

  #[test]
  fn unmatched_trailing_path_is_no_match() {
    let app = EventsApp::new();
    let err = match_path(&app.tree, "/events/e1/comments").unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::NoMatch);
    assert!(match_path(&app.tree, "/meals").is_err());
  }

  #[test]
  fn deterministic() {
    let app = EventsApp::new();
    for path in ["/", "/events", "/events/e1", "/events/new", "/events/e1/edit"] {
      assert_eq!(match_path(&app.tree, path).unwrap(), match_path(&app.tree, path).unwrap());
    }
  }

  #[test]
  fn ignores_trailing_slash_and_query() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events/e1/?tab=info").unwrap();
    assert_eq!(chain.path(), "/events/e1");
    assert_eq!(ids(&chain), vec!["root", "events", "event-detail"]);
  }

  #[test]
  fn splat_catches_the_rest() {
    let tree = RouteTree::build(vec![RouteDef::new("/").id("root").children([
      RouteDef::new("docs").id("docs"),
      RouteDef::new("*").id("catch-all"),
    ])])
    .unwrap();
    let chain = match_path(&tree, "/docs").unwrap();
    assert_eq!(ids(&chain), vec!["root", "docs"]);
    let chain = match_path(&tree, "/a/b/c").unwrap();
    assert_eq!(ids(&chain), vec!["root", "catch-all"]);
    assert_eq!(chain.params().get("*").map(String::as_str), Some("a/b/c"));
  }

  #[test]
  fn pathless_layout_is_transparent() {
    let tree = RouteTree::build(vec![RouteDef::new("/").id("root").children([
      RouteDef::layout().id("auth").children([RouteDef::index().id("auth-home")]),
      RouteDef::layout().id("shell").child(RouteDef::new("about").id("about")),
    ])])
    .unwrap();
    let chain = match_path(&tree, "/about").unwrap();
    assert_eq!(ids(&chain), vec!["root", "shell", "about"]);
    let chain = match_path(&tree, "/").unwrap();
    assert_eq!(ids(&chain), vec!["root", "auth", "auth-home"]);
  }

  #[test]
  fn static_route_inside_layout_beats_param_sibling() {
    let tree = RouteTree::build(vec![RouteDef::new("/").id("root").children([
      RouteDef::new(":slug").id("slug"),
      RouteDef::layout().id("shell").child(RouteDef::new("about").id("about")),
    ])])
    .unwrap();
    let chain = match_path(&tree, "/about").unwrap();
    assert_eq!(ids(&chain), vec!["root", "shell", "about"]);
    assert!(chain.params().is_empty());

    let chain = match_path(&tree, "/contact").unwrap();
    assert_eq!(ids(&chain), vec!["root", "slug"]);
    assert_eq!(chain.params().get("slug").map(String::as_str), Some("contact"));
  }

  #[test]
  fn layout_without_index_terminates_at_itself() {
    let tree = RouteTree::build(vec![
      RouteDef::new("events").id("events").child(RouteDef::new(":eventId").id("event")),
    ])
    .unwrap();
    let chain = match_path(&tree, "/events").unwrap();
    assert_eq!(ids(&chain), vec!["events"]);
  }

  #[test]
  fn boundary_lookup_walks_up() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events/e1").unwrap();
    assert_eq!(chain.boundary_for(2).as_deref(), Some("event-detail"));
    assert_eq!(chain.boundary_for(1).as_deref(), Some("root"));
    assert_eq!(chain.boundary_for(99).as_deref(), Some("event-detail"));
  }

  #[test]
  fn route_relative_up_from_param_route() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events/e1").unwrap();
    assert_eq!(resolve_relative(&chain, "..", RelativeMode::Route), "/events");
    assert_eq!(resolve_relative(&chain, "edit", RelativeMode::Route), "/events/e1/edit");
    assert_eq!(resolve_relative(&chain, "../new", RelativeMode::Route), "/events/new");
    assert_eq!(resolve_relative(&chain, "../..", RelativeMode::Route), "/");
    assert_eq!(resolve_relative(&chain, "/events", RelativeMode::Route), "/events");
  }

  #[test]
  fn route_relative_skips_multi_segment_node() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events/e1/edit").unwrap();
    assert_eq!(resolve_relative(&chain, "..", RelativeMode::Route), "/events");
    assert_eq!(resolve_relative(&chain, "..", RelativeMode::Path), "/events/e1");
  }

  #[test]
  fn route_relative_from_index_goes_to_grandparent() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/events").unwrap();
    assert_eq!(resolve_relative(&chain, "..", RelativeMode::Route), "/");
    assert_eq!(resolve_relative(&chain, "e2", RelativeMode::Route), "/events/e2");
  }

  #[test]
  fn relative_never_climbs_above_root() {
    let app = EventsApp::new();
    let chain = match_path(&app.tree, "/").unwrap();
    assert_eq!(resolve_relative(&chain, "../../events", RelativeMode::Route), "/events");
  }
}
