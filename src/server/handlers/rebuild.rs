//! Rebuild handler

use crate::server::handlers::no_board_loaded;
use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;

/// Handle Rebuild request - rescans only the items touched since the last cycle
pub fn handle_rebuild(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    if !state.is_board_loaded() {
        return no_board_loaded(id);
    }

    match state.engine.rebuild(None) {
        Ok(stats) => {
            state.last_rebuild = Some(stats.clone());
            Response::success(id, serde_json::json!({
                "status": "ok",
                "rebuild": stats
            }))
        }
        Err(e) => Response::error(id, error_codes::REBUILD_FAILED, e.to_string()),
    }
}
