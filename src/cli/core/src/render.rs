/* src/cli/core/src/render.rs */

// JSON views of router state for terminal output.

use serde_json::{Map, Value, json};
use waypoint_router::{
  LoaderResult, MatchedChain, NavigationState, RouteFailure, RouterError, SlotState,
};

pub fn error_json(err: &RouterError) -> Value {
  json!({
    "code": err.kind().code(),
    "status": err.status(),
    "message": err.message(),
    "payload": err.payload(),
  })
}

pub fn failure_json(failure: &RouteFailure) -> Value {
  json!({
    "nodeId": failure.node_id,
    "boundary": failure.boundary,
    "error": error_json(&failure.error),
  })
}

pub fn chain_json(chain: &MatchedChain) -> Value {
  let entries: Vec<Value> = chain
    .entries()
    .iter()
    .map(|m| json!({ "id": m.node.id, "pathname": m.pathname, "params": m.params }))
    .collect();
  json!({ "path": chain.path(), "entries": entries })
}

pub fn result_json(result: &LoaderResult) -> Value {
  let deferred = result.deferred().is_some();
  match result.state() {
    SlotState::Pending => json!({ "state": "pending", "deferred": deferred }),
    SlotState::Ready(value) => json!({ "state": "ready", "deferred": deferred, "value": value }),
    SlotState::Failed(err) => {
      json!({ "state": "failed", "deferred": deferred, "error": error_json(&err) })
    }
  }
}

pub fn state_json(state: &NavigationState) -> Value {
  let data: Map<String, Value> =
    state.results.iter().map(|(id, result)| (id.clone(), result_json(result))).collect();
  json!({
    "status": state.status,
    "location": state.location,
    "pendingLocation": state.pending_location,
    "chain": state.chain.as_ref().map(chain_json),
    "data": data,
    "error": state.error.as_ref().map(failure_json),
    "actionData": state.action_data,
  })
}
