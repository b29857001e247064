/* src/router/core/rust/src/location.rs */

use std::collections::BTreeMap;

/// Path parameters captured by the matcher, keyed by marker name.
pub type Params = BTreeMap<String, String>;

/// Strip query string and fragment.
pub fn strip_search(path: &str) -> &str {
  let end = path.find(['?', '#']).unwrap_or(path.len());
  &path[..end]
}

/// Split a URL path into its non-empty segments.
pub fn split_segments(path: &str) -> Vec<&str> {
  strip_search(path).split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical form: leading slash, no trailing slash, no empty segments.
pub fn normalize_path(path: &str) -> String {
  join_segments(split_segments(path))
}

pub fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
  let mut out = String::new();
  for segment in segments {
    out.push('/');
    out.push_str(segment);
  }
  if out.is_empty() {
    out.push('/');
  }
  out
}

/// Apply `.`/`..`/plain segments of a relative target to `base`.
pub(crate) fn apply_relative(base: &str, to: &str) -> String {
  let mut segments: Vec<&str> = split_segments(base);
  for part in split_segments(to) {
    match part {
      "." => {}
      ".." => {
        segments.pop();
      }
      other => segments.push(other),
    }
  }
  join_segments(segments)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_variants() {
    assert_eq!(normalize_path(""), "/");
    assert_eq!(normalize_path("/"), "/");
    assert_eq!(normalize_path("events/"), "/events");
    assert_eq!(normalize_path("//events//e1/"), "/events/e1");
    assert_eq!(normalize_path("/events?sort=date#top"), "/events");
  }

  #[test]
  fn split_ignores_search() {
    assert_eq!(split_segments("/events/e1?x=1"), vec!["events", "e1"]);
    assert!(split_segments("/").is_empty());
  }

  #[test]
  fn apply_relative_segments() {
    assert_eq!(apply_relative("/events/e1", ".."), "/events");
    assert_eq!(apply_relative("/events/e1", "edit"), "/events/e1/edit");
    assert_eq!(apply_relative("/events/e1", "./edit"), "/events/e1/edit");
    assert_eq!(apply_relative("/events", "../../.."), "/");
    assert_eq!(apply_relative("/events/e1", "../e2"), "/events/e2");
  }
}
