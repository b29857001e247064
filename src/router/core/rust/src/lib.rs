/* src/router/core/rust/src/lib.rs */

pub mod action;
pub mod cancel;
pub mod deferred;
pub mod errors;
pub mod handler;
pub mod loader;
pub mod location;
pub mod matcher;
pub mod navigation;
pub mod route;

#[cfg(test)]
mod fixtures;

// Re-exports for ergonomic use
pub use action::{ActionDispatcher, ActionOutcome, ActionTarget, Dispatch, Encoding, Method, Submission};
pub use cancel::CancelToken;
pub use deferred::{Deferred, SlotState};
pub use errors::{ErrorKind, RouterError, message_from_body};
pub use handler::{
  ActionArgs, ActionDef, ActionFn, BoxFuture, HandlerRegistry, LoaderArgs, LoaderDef, LoaderFn,
  LoaderMode,
};
pub use loader::{
  LoadOutcome, LoaderResult, LoaderResults, LoaderValue, RouteFailure, normalize_loader_value,
  revalidate, run_loaders,
};
pub use location::{Params, normalize_path};
pub use matcher::{MatchedChain, MatchedRoute, RelativeMode, match_path, resolve_relative};
pub use navigation::{HISTORY_LIMIT, NavigationState, Navigator, Settlement, Status};
pub use route::{ErrorSpec, LoaderRef, RouteConfig, RouteDef, RouteNode, RouteTree, Segment, parse_manifest};
