/* src/router/core/rust/src/fixtures.rs */

// Shared test app: the events SPA route tree with instrumented handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::json;

use crate::action::{ActionOutcome, Method};
use crate::errors::RouterError;
use crate::handler::{ActionArgs, ActionDef, LoaderArgs, LoaderDef};
use crate::route::{RouteDef, RouteTree};

pub(crate) struct EventsApp {
  pub(crate) tree: Arc<RouteTree>,
  /// Times the `/events` list loader ran.
  pub(crate) events_calls: Arc<AtomicUsize>,
  /// Times the event detail loader ran.
  pub(crate) detail_calls: Arc<AtomicUsize>,
  /// Non-zero makes the `/events` loader fail with that status.
  pub(crate) events_fail_status: Arc<AtomicU16>,
  /// Methods the detail action received, in order.
  pub(crate) submissions: Arc<Mutex<Vec<Method>>>,
}

impl EventsApp {
  pub(crate) fn new() -> Self {
    let events_calls = Arc::new(AtomicUsize::new(0));
    let detail_calls = Arc::new(AtomicUsize::new(0));
    let events_fail_status = Arc::new(AtomicU16::new(0));
    let submissions = Arc::new(Mutex::new(Vec::new()));

    let events_loader = {
      let calls = events_calls.clone();
      let fail = events_fail_status.clone();
      LoaderDef::eager("events", move |_args: LoaderArgs| {
        let calls = calls.clone();
        let fail = fail.clone();
        async move {
          let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
          match fail.load(Ordering::SeqCst) {
            0 => Ok(json!({ "events": [{ "id": "e1", "title": "Launch" }], "call": n })),
            status => Err(RouterError::fetch_failed(status, "Could not fetch events.")),
          }
        }
      })
    };

    let detail_loader = {
      let calls = detail_calls.clone();
      LoaderDef::eager("event", move |args: LoaderArgs| {
        let calls = calls.clone();
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          let id = args.params.get("eventId").cloned().unwrap_or_default();
          Ok::<_, RouterError>(json!({ "event": { "id": id } }))
        }
      })
    };

    let detail_action = {
      let seen = submissions.clone();
      ActionDef::new("events.mutate", move |args: ActionArgs| {
        let seen = seen.clone();
        async move {
          seen.lock().push(args.method);
          match args.method {
            Method::Delete => Ok(ActionOutcome::Redirect("/events".into())),
            Method::Patch => Ok(ActionOutcome::Revalidate),
            Method::Put => Err(RouterError::action_failed(500, "Could not save event")),
            Method::Post => Ok(ActionOutcome::Data(json!({ "errors": { "title": "required" } }))),
          }
        }
      })
    };

    let create_action = ActionDef::new("events.create", |_args: ActionArgs| async {
      Ok::<_, RouterError>(ActionOutcome::Redirect("/events".into()))
    });

    let tree = RouteTree::build(vec![
      RouteDef::new("/").id("root").error_boundary("ErrorPage").children([
        RouteDef::index().id("home"),
        RouteDef::new("events").id("events").loader(events_loader).children([
          RouteDef::index().id("events-index"),
          RouteDef::new(":eventId")
            .id("event-detail")
            .loader(detail_loader)
            .action(detail_action)
            .error_boundary("EventError"),
          RouteDef::new("new").id("event-new").action(create_action),
          RouteDef::new(":eventId/edit").id("event-edit"),
        ]),
      ]),
    ])
    .expect("events tree");

    Self { tree: Arc::new(tree), events_calls, detail_calls, events_fail_status, submissions }
  }

  pub(crate) fn events_calls(&self) -> usize {
    self.events_calls.load(Ordering::SeqCst)
  }

  pub(crate) fn detail_calls(&self) -> usize {
    self.detail_calls.load(Ordering::SeqCst)
  }

  pub(crate) fn fail_events_with(&self, status: u16) {
    self.events_fail_status.store(status, Ordering::SeqCst);
  }
}
