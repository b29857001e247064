/* src/router/core/rust/src/route/tree.rs */

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::config::{ErrorSpec, RouteConfig, RouteDef};
use super::segment::{Segment, parse_path};
use crate::errors::RouterError;
use crate::handler::{ActionDef, HandlerRegistry, LoaderDef};
use crate::location::join_segments;

#[derive(Debug)]
pub struct RouteNode {
  pub id: String,
  /// Path as declared ("" for index and layout routes).
  pub path: String,
  /// Full absolute pattern, e.g. `/events/:eventId`.
  pub pattern: String,
  pub segments: Vec<Segment>,
  pub is_index: bool,
  pub loader: Option<LoaderDef>,
  pub action: Option<ActionDef>,
  pub error_boundary: Option<ErrorSpec>,
  pub(crate) parent: Option<usize>,
  pub(crate) children: Vec<usize>,
}

impl RouteNode {
  pub fn is_layout(&self) -> bool {
    !self.is_index && self.segments.is_empty() && self.path.is_empty()
  }

  pub fn has_children(&self) -> bool {
    !self.children.is_empty()
  }
}

/// Immutable route tree. Nodes live in an arena and are shared as `Arc`s
/// with matched chains.
#[derive(Debug)]
pub struct RouteTree {
  nodes: Vec<Arc<RouteNode>>,
  roots: Vec<usize>,
  by_id: HashMap<String, usize>,
}

struct Builder {
  nodes: Vec<RouteNode>,
  by_id: HashMap<String, usize>,
}

impl Builder {
  fn insert(
    &mut self,
    def: RouteDef,
    parent: Option<usize>,
    parent_pattern: &str,
    position: usize,
  ) -> Result<usize, RouterError> {
    let raw = def.path.clone().unwrap_or_default();
    let relative = relativize(&raw, parent.map(|_| parent_pattern))?;
    let segments = parse_path(relative)?;

    if def.index {
      if !segments.is_empty() {
        return Err(RouterError::config(format!(
          "index route under '{parent_pattern}' cannot have its own path '{raw}'"
        )));
      }
      if !def.children.is_empty() {
        return Err(RouterError::config(format!(
          "index route under '{parent_pattern}' cannot have children"
        )));
      }
    }

    let parent_segments = parse_path(parent_pattern)?;
    if parent_segments.last() == Some(&Segment::Splat) && !segments.is_empty() {
      return Err(RouterError::config(format!(
        "route '{raw}' cannot be nested below catch-all '{parent_pattern}'"
      )));
    }
    let mut parts: Vec<String> = parent_segments.iter().map(Segment::as_pattern).collect();
    parts.extend(segments.iter().map(Segment::as_pattern));
    let pattern = join_segments(parts.iter().map(String::as_str));

    let declared_path = raw.trim().to_string();
    let id = match def.id {
      Some(id) => id,
      None if def.index => format!("{pattern}?index"),
      None if declared_path.is_empty() => format!("{pattern}#{position}"),
      None => pattern.clone(),
    };
    if id.is_empty() {
      return Err(RouterError::config("route id must not be empty"));
    }

    let idx = self.nodes.len();
    if self.by_id.insert(id.clone(), idx).is_some() {
      return Err(RouterError::config(format!("duplicate route id '{id}'")));
    }

    self.nodes.push(RouteNode {
      id,
      path: if def.index { String::new() } else { declared_path },
      pattern: pattern.clone(),
      segments,
      is_index: def.index,
      loader: def.loader,
      action: def.action,
      error_boundary: def.error_boundary,
      parent,
      children: Vec::new(),
    });

    let mut children = Vec::with_capacity(def.children.len());
    for (pos, child) in def.children.into_iter().enumerate() {
      children.push(self.insert(child, Some(idx), &pattern, pos)?);
    }
    self.check_siblings(&children, &pattern)?;
    self.nodes[idx].children = children;
    Ok(idx)
  }

  /// At most one index route; no two siblings with the same normalized path.
  fn check_siblings(&self, siblings: &[usize], parent_pattern: &str) -> Result<(), RouterError> {
    let mut index_count = 0;
    let mut seen = HashSet::new();
    for &i in siblings {
      let node = &self.nodes[i];
      if node.is_index {
        index_count += 1;
        if index_count > 1 {
          return Err(RouterError::config(format!(
            "more than one index route under '{parent_pattern}'"
          )));
        }
        continue;
      }
      if node.segments.is_empty() {
        continue;
      }
      let key: Vec<&str> = node.segments.iter().map(Segment::normalized).collect();
      let key = key.join("/");
      if !seen.insert(key) {
        return Err(RouterError::config(format!(
          "ambiguous sibling routes under '{parent_pattern}': '{}' collides with an earlier sibling",
          node.path
        )));
      }
    }
    Ok(())
  }
}

/// Turn a declared path into one relative to its parent. Absolute child paths
/// must start with the parent's pattern.
fn relativize<'a>(raw: &'a str, parent_pattern: Option<&str>) -> Result<&'a str, RouterError> {
  let raw = raw.trim();
  let Some(parent) = parent_pattern else {
    return Ok(raw);
  };
  if !raw.starts_with('/') {
    return Ok(raw);
  }
  if parent == "/" {
    return Ok(raw);
  }
  let trimmed = raw.trim_end_matches('/');
  match trimmed.strip_prefix(parent) {
    Some("") => Ok(""),
    Some(rest) if rest.starts_with('/') => Ok(rest),
    _ => Err(RouterError::config(format!(
      "absolute route path '{raw}' is not nested under its parent '{parent}'"
    ))),
  }
}

impl RouteTree {
  pub fn build(defs: Vec<RouteDef>) -> Result<Self, RouterError> {
    let mut builder = Builder { nodes: Vec::new(), by_id: HashMap::new() };
    let mut roots = Vec::with_capacity(defs.len());
    for (pos, def) in defs.into_iter().enumerate() {
      roots.push(builder.insert(def, None, "/", pos)?);
    }
    builder.check_siblings(&roots, "/")?;

    tracing::debug!(routes = builder.nodes.len(), "route tree built");
    Ok(Self {
      nodes: builder.nodes.into_iter().map(Arc::new).collect(),
      roots,
      by_id: builder.by_id,
    })
  }

  /// Build from a parsed route manifest, resolving handler names.
  pub fn from_config(
    configs: &[RouteConfig],
    registry: &HandlerRegistry,
  ) -> Result<Self, RouterError> {
    let defs = configs.iter().map(|c| c.resolve(registry)).collect::<Result<Vec<_>, _>>()?;
    Self::build(defs)
  }

  pub fn lookup(&self, id: &str) -> Result<Arc<RouteNode>, RouterError> {
    self
      .by_id
      .get(id)
      .map(|&i| self.nodes[i].clone())
      .ok_or_else(|| RouterError::not_found(format!("no route with id '{id}'")))
  }

  pub fn parent(&self, id: &str) -> Result<Option<Arc<RouteNode>>, RouterError> {
    let node = self.lookup(id)?;
    Ok(node.parent.map(|p| self.nodes[p].clone()))
  }

  /// Ancestors of `id` from the root down, excluding the node itself.
  pub fn ancestors(&self, id: &str) -> Result<Vec<Arc<RouteNode>>, RouterError> {
    let node = self.lookup(id)?;
    let mut out = Vec::new();
    let mut current = node.parent;
    while let Some(i) = current {
      out.push(self.nodes[i].clone());
      current = self.nodes[i].parent;
    }
    out.reverse();
    Ok(out)
  }

  pub fn roots(&self) -> impl Iterator<Item = &Arc<RouteNode>> {
    self.roots.iter().map(|&i| &self.nodes[i])
  }

  pub fn children<'a>(&'a self, node: &'a RouteNode) -> impl Iterator<Item = &'a Arc<RouteNode>> {
    node.children.iter().map(|&i| &self.nodes[i])
  }

  /// Depth-first listing with depths, in declaration order.
  pub fn walk(&self) -> Vec<(usize, Arc<RouteNode>)> {
    let mut out = Vec::with_capacity(self.nodes.len());
    let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (0, i)).collect();
    while let Some((depth, i)) = stack.pop() {
      let node = &self.nodes[i];
      out.push((depth, node.clone()));
      stack.extend(node.children.iter().rev().map(|&c| (depth + 1, c)));
    }
    out
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub(crate) fn root_indices(&self) -> &[usize] {
    &self.roots
  }

  pub(crate) fn node(&self, idx: usize) -> &Arc<RouteNode> {
    &self.nodes[idx]
  }
}
