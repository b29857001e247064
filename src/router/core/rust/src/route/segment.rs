/* src/router/core/rust/src/route/segment.rs */

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::RouterError;

static PARAM_NAME: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("param name regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Static(String),
  /// `:name` or `[name]`
  Param(String),
  /// `*`, captures the rest of the path under the `*` param.
  Splat,
}

impl Segment {
  /// Match precedence: static beats dynamic beats catch-all.
  pub(crate) fn rank(&self) -> u8 {
    match self {
      Self::Static(_) => 3,
      Self::Param(_) => 2,
      Self::Splat => 0,
    }
  }

  /// Form used to detect sibling collisions: param names do not matter.
  pub(crate) fn normalized(&self) -> &str {
    match self {
      Self::Static(s) => s,
      Self::Param(_) => ":",
      Self::Splat => "*",
    }
  }

  pub(crate) fn as_pattern(&self) -> String {
    match self {
      Self::Static(s) => s.clone(),
      Self::Param(name) => format!(":{name}"),
      Self::Splat => "*".to_string(),
    }
  }
}

fn parse_segment(raw: &str) -> Result<Segment, RouterError> {
  if raw == "*" {
    return Ok(Segment::Splat);
  }
  let name = raw
    .strip_prefix(':')
    .or_else(|| raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')));
  match name {
    Some(name) if PARAM_NAME.is_match(name) => Ok(Segment::Param(name.to_string())),
    Some(name) => Err(RouterError::config(format!("invalid param name '{name}' in segment '{raw}'"))),
    None if raw.contains([':', '*', '[', ']']) => {
      Err(RouterError::config(format!("malformed path segment '{raw}'")))
    }
    None => Ok(Segment::Static(raw.to_string())),
  }
}

/// Parse a route path (relative or absolute) into segments.
pub(crate) fn parse_path(path: &str) -> Result<Vec<Segment>, RouterError> {
  let segments = path
    .split('/')
    .filter(|s| !s.is_empty())
    .map(parse_segment)
    .collect::<Result<Vec<_>, _>>()?;

  if let Some(pos) = segments.iter().position(|s| *s == Segment::Splat)
    && pos + 1 != segments.len()
  {
    return Err(RouterError::config(format!("'*' must be the last segment in '{path}'")));
  }

  let mut seen = std::collections::HashSet::new();
  for segment in &segments {
    if let Segment::Param(name) = segment
      && !seen.insert(name.as_str())
    {
      return Err(RouterError::config(format!("duplicate param ':{name}' in '{path}'")));
    }
  }
  Ok(segments)
}
