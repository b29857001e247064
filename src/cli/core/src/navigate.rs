/* src/cli/core/src/navigate.rs */

use anyhow::{Context, Result, bail};
use futures_util::future::join_all;
use serde_json::Value;
use waypoint_router::{Method, NavigationState, Navigator, Settlement, Submission};

use crate::render;
use crate::ui;

pub struct SubmitArgs {
  pub path: String,
  pub method: String,
  pub data: Option<String>,
  pub target: Option<String>,
  pub multipart: bool,
}

/// Wait until every deferred slot in the current state has settled.
async fn settle_deferred(state: &NavigationState) {
  let slots: Vec<_> = state.results.values().filter_map(|r| r.deferred().cloned()).collect();
  if slots.is_empty() {
    return;
  }
  ui::detail(&format!("waiting for {} deferred loader(s)", slots.len()));
  join_all(slots.iter().map(waypoint_router::Deferred::settled)).await;
}

async fn report(nav: &Navigator, label: &str, settlement: &Settlement, wait_deferred: bool) {
  match settlement {
    Settlement::Committed => ui::ok(label),
    Settlement::Superseded => ui::warn(&format!("{label} (superseded)")),
    Settlement::Failed(failure) => ui::fail(&format!("{label}: {}", failure.error)),
  }
  if wait_deferred {
    settle_deferred(&nav.snapshot()).await;
  }
  ui::json(&render::state_json(&nav.snapshot()));
}

/// Navigate to each path in order, printing the settled state after each.
pub async fn run_navigate(nav: &Navigator, paths: &[String], wait_deferred: bool) -> Result<()> {
  let mut failed = 0usize;
  for path in paths {
    ui::arrow(path);
    let settlement = nav.navigate(path).await;
    if matches!(settlement, Settlement::Failed(_)) {
      failed += 1;
    }
    report(nav, &format!("navigated to {path}"), &settlement, wait_deferred).await;
    ui::blank();
  }
  if failed > 0 {
    bail!("{failed} of {} navigations failed", paths.len());
  }
  Ok(())
}

fn build_submission(args: &SubmitArgs) -> Result<Submission> {
  let method: Method = args.method.parse()?;
  let payload = match &args.data {
    Some(raw) => serde_json::from_str(raw).context("--data must be valid JSON")?,
    None if method == Method::Delete => Value::Null,
    None => Value::Object(serde_json::Map::new()),
  };
  let mut submission = Submission::new(method, payload);
  if args.multipart {
    submission = submission.multipart();
  }
  if let Some(target) = &args.target {
    submission = submission.target(target.as_str());
  }
  Ok(submission)
}

/// Navigate to `args.path`, then submit to its action.
pub async fn run_submit(nav: &Navigator, args: &SubmitArgs, wait_deferred: bool) -> Result<()> {
  let submission = build_submission(args)?;

  ui::arrow(&args.path);
  match nav.navigate(&args.path).await {
    Settlement::Committed => ui::ok(&format!("navigated to {}", args.path)),
    Settlement::Failed(failure) => bail!("navigation to {} failed: {}", args.path, failure.error),
    Settlement::Superseded => bail!("navigation to {} was superseded", args.path),
  }

  ui::arrow(&format!("{} {}", submission.method, args.path));
  let settlement = nav.submit(submission).await.context("submission rejected")?;
  report(nav, "submitted", &settlement, wait_deferred).await;
  if let Settlement::Failed(failure) = settlement {
    bail!("submission failed: {}", failure.error);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(method: &str, data: Option<&str>) -> SubmitArgs {
    SubmitArgs {
      path: "/events/e1".into(),
      method: method.into(),
      data: data.map(str::to_string),
      target: None,
      multipart: false,
    }
  }

  #[test]
  fn delete_defaults_to_empty_payload() {
    let submission = build_submission(&args("delete", None)).unwrap();
    assert_eq!(submission.method, Method::Delete);
    assert!(submission.payload.is_null());
  }

  #[test]
  fn data_is_parsed_as_json() {
    let submission = build_submission(&args("patch", Some(r#"{"title":"Retro"}"#))).unwrap();
    assert_eq!(submission.payload["title"], "Retro");
    assert!(build_submission(&args("post", Some("{oops"))).is_err());
  }

  #[test]
  fn rejects_unknown_method() {
    let err = build_submission(&args("get", None)).unwrap_err();
    assert!(err.to_string().contains("unsupported submission method"));
  }

  #[test]
  fn target_and_multipart_flags() {
    let mut a = args("post", None);
    a.target = Some("event-new".into());
    a.multipart = true;
    let submission = build_submission(&a).unwrap();
    assert_eq!(submission.target.as_deref(), Some("event-new"));
    assert_eq!(submission.encoding, waypoint_router::Encoding::Multipart);
    assert!(submission.payload.is_object());
  }
}
