//! Connectivity server - JSON-RPC over stdin/stdout
//!
//! One request per line in, one response per line out. Logging goes to
//! stderr so stdout carries only protocol traffic.
//!
//! # Module Structure
//! - `protocol` - JSON-RPC request/response types
//! - `state` - Server state management
//! - `handlers` - Request handlers organized by functionality

pub mod handlers;
pub mod protocol;
pub mod state;

pub use protocol::{error_codes, ErrorResponse, Request, Response};
pub use state::ServerState;

use handlers::*;
use tracing::debug;

/// Route one request to its handler
pub fn dispatch(state: &mut ServerState, request: Request) -> Response {
    debug!("Request: {}", request.method);
    let Request { id, method, params } = request;

    match method.as_str() {
        "Load" => handle_load(state, id, params),
        "LoadBoard" => handle_load_board(state, id, params),
        "SetSettings" => handle_set_settings(state, id, params),
        "Rebuild" => handle_rebuild(state, id),
        "GetClusters" => handle_get_clusters(state, id),
        "GetConflicts" => handle_get_conflicts(state, id),
        "GetDangling" => handle_get_dangling(state, id),
        "GetReport" => handle_get_report(state, id),
        "GetFeature" => handle_get_feature(state, id, params),
        "MoveFeature" => handle_move_feature(state, id, params),
        "DeleteFeature" => handle_delete_feature(state, id, params),
        "UpsertFeature" => handle_upsert_feature(state, id, params),
        "ApplyNets" => handle_apply_nets(state, id),
        _ => Response::error(id, error_codes::METHOD_NOT_FOUND, format!("Method not found: {}", method)),
    }
}

/// Parse one input line and answer it
///
/// Returns `None` for blank lines. Malformed JSON gets a parse error with a
/// null id.
pub fn handle_line(state: &mut ServerState, line: &str) -> Option<Response> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return Some(Response::error(None, error_codes::PARSE_ERROR, format!("Parse error: {}", e)));
        }
    };
    let id = value.get("id").cloned();
    match serde_json::from_value::<Request>(value) {
        Ok(request) => Some(dispatch(state, request)),
        Err(e) => Some(Response::error(id, error_codes::INVALID_REQUEST, format!("Invalid request: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(state: &mut ServerState, line: &str) -> serde_json::Value {
        let response = handle_line(state, line).unwrap();
        serde_json::to_value(&response).unwrap()
    }

    const BOARD: &str = r#"{"id": 1, "method": "LoadBoard", "params": {"board": {"features": [
        {"id": 1, "net": 5, "kind": "pad", "position": {"x": 0.0, "y": 0.0},
         "shape": {"type": "circle", "center": {"x": 0.0, "y": 0.0}, "radius": 0.5},
         "layers": {"top": 0, "bottom": 0}},
        {"id": 2, "kind": "track", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 3.0, "y": 0.0}, "width": 0.2, "layer": 0}
    ]}}}"#;

    #[test]
    fn test_requires_board() {
        let mut state = ServerState::new();
        let r = call(&mut state, r#"{"id": 7, "method": "GetReport"}"#);
        assert_eq!(r["id"], 7);
        assert_eq!(r["error"]["code"], error_codes::NO_BOARD_LOADED);
    }

    #[test]
    fn test_parse_and_method_errors() {
        let mut state = ServerState::new();
        assert!(handle_line(&mut state, "   ").is_none());
        let r = call(&mut state, "{not json");
        assert_eq!(r["error"]["code"], error_codes::PARSE_ERROR);
        let r = call(&mut state, r#"{"id": 1, "method": "Frobnicate"}"#);
        assert_eq!(r["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_load_edit_rebuild_cycle() {
        let mut state = ServerState::new();
        let r = call(&mut state, BOARD);
        assert_eq!(r["result"]["rebuild"]["clusters"], 1);

        let r = call(&mut state, r#"{"id": 2, "method": "GetFeature", "params": {"id": 2}}"#);
        assert_eq!(r["result"]["resolved_net"], 5);

        let r = call(&mut state, r#"{"id": 3, "method": "MoveFeature", "params": {"id": 2, "dx": 10.0, "dy": 0.0}}"#);
        assert_eq!(r["result"]["status"], "ok");
        let r = call(&mut state, r#"{"id": 4, "method": "Rebuild"}"#);
        assert_eq!(r["result"]["rebuild"]["clusters"], 2);

        let r = call(&mut state, r#"{"id": 5, "method": "DeleteFeature", "params": {"id": 42}}"#);
        assert_eq!(r["error"]["code"], error_codes::FEATURE_NOT_FOUND);
    }

    #[test]
    fn test_invalid_settings_rejected_everywhere() {
        let mut state = ServerState::new();
        let r = call(&mut state, r#"{"id": 1, "method": "Load",
            "params": {"path": "/nonexistent/board.json", "settings": {"contact_epsilon": -1.0}}}"#);
        assert_eq!(r["error"]["code"], error_codes::INVALID_PARAMS);
        assert_eq!(state.settings, crate::connectivity::ConnectivitySettings::default());

        let r = call(&mut state, r#"{"id": 2, "method": "SetSettings", "params": {"settings": {"arc_tolerance": 0.0}}}"#);
        assert_eq!(r["error"]["code"], error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_apply_nets_writes_board() {
        let mut state = ServerState::new();
        call(&mut state, BOARD);
        let r = call(&mut state, r#"{"id": 2, "method": "ApplyNets"}"#);
        assert_eq!(r["result"]["changed"], 1);
        let board = state.board.as_ref().unwrap();
        assert_eq!(board.get(2).unwrap().net().0, 5);
    }
}
