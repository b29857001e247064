/* src/router/core/rust/src/errors.rs */

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
  Config,
  NoMatch,
  FetchFailed,
  NoAction,
  ActionFailed,
  NotFound,
}

impl ErrorKind {
  pub fn code(self) -> &'static str {
    match self {
      Self::Config => "CONFIG_ERROR",
      Self::NoMatch => "NO_MATCH",
      Self::FetchFailed => "FETCH_FAILED",
      Self::NoAction => "NO_ACTION",
      Self::ActionFailed => "ACTION_FAILED",
      Self::NotFound => "NOT_FOUND",
    }
  }

  fn default_status(self) -> u16 {
    match self {
      Self::NoMatch | Self::NotFound => 404,
      Self::NoAction => 405,
      Self::Config | Self::FetchFailed | Self::ActionFailed => 500,
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// Error raised anywhere in the router. Cheap to clone so it can sit inside
/// shared loader slots and navigation snapshots.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RouterError {
  kind: ErrorKind,
  message: String,
  status: u16,
  payload: Option<serde_json::Value>,
}

impl RouterError {
  pub fn new(kind: ErrorKind, message: impl Into<String>, status: u16) -> Self {
    Self { kind, message: message.into(), status, payload: None }
  }

  pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self::new(kind, message, kind.default_status())
  }

  pub fn config(msg: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::Config, msg)
  }

  pub fn no_match(path: &str) -> Self {
    Self::with_kind(ErrorKind::NoMatch, format!("no route matches '{path}'"))
  }

  pub fn fetch_failed(status: u16, msg: impl Into<String>) -> Self {
    Self::new(ErrorKind::FetchFailed, msg, status)
  }

  pub fn no_action(msg: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::NoAction, msg)
  }

  pub fn action_failed(status: u16, msg: impl Into<String>) -> Self {
    Self::new(ErrorKind::ActionFailed, msg, status)
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::NotFound, msg)
  }

  /// Attach a structured body (backend response, validation detail) to the error.
  pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
    self.payload = Some(payload);
    self
  }

  /// Re-tag as `ActionFailed`, keeping status, message and payload.
  pub fn into_action_failed(self) -> Self {
    Self { kind: ErrorKind::ActionFailed, ..self }
  }

  pub fn kind(&self) -> ErrorKind {
    self.kind
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> u16 {
    self.status
  }

  pub fn payload(&self) -> Option<&serde_json::Value> {
    self.payload.as_ref()
  }
}

/// Pull a human-readable message out of a JSON error body (`{"message": "..."}`),
/// falling back to `fallback` when the body has none.
pub fn message_from_body(body: &serde_json::Value, fallback: &str) -> String {
  body.get("message").and_then(serde_json::Value::as_str).unwrap_or(fallback).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_status_per_kind() {
    assert_eq!(RouterError::config("x").status(), 500);
    assert_eq!(RouterError::no_match("/x").status(), 404);
    assert_eq!(RouterError::no_action("x").status(), 405);
    assert_eq!(RouterError::not_found("x").status(), 404);
  }

  #[test]
  fn explicit_status_is_kept() {
    let err = RouterError::fetch_failed(503, "backend down");
    assert_eq!(err.kind(), ErrorKind::FetchFailed);
    assert_eq!(err.status(), 503);
    assert_eq!(err.message(), "backend down");
  }

  #[test]
  fn display_format() {
    let err = RouterError::fetch_failed(500, "Could not fetch events.");
    assert_eq!(err.to_string(), "FETCH_FAILED: Could not fetch events.");
    assert_eq!(RouterError::no_match("/nope").to_string(), "NO_MATCH: no route matches '/nope'");
  }

  #[test]
  fn into_action_failed_keeps_detail() {
    let body = serde_json::json!({"message": "title required"});
    let err = RouterError::fetch_failed(422, "title required").with_payload(body.clone());
    let err = err.into_action_failed();
    assert_eq!(err.kind(), ErrorKind::ActionFailed);
    assert_eq!(err.status(), 422);
    assert_eq!(err.payload(), Some(&body));
  }

  #[test]
  fn message_from_body_fallback() {
    let body = serde_json::json!({"message": "Could not save event"});
    assert_eq!(message_from_body(&body, "default"), "Could not save event");
    assert_eq!(message_from_body(&serde_json::Value::Null, "default"), "default");
  }
}
