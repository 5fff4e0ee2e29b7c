//! Board handlers: Load, LoadBoard, SetSettings, ApplyNets

use crate::board::Board;
use crate::connectivity::ConnectivitySettings;
use crate::server::handlers::no_board_loaded;
use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use serde::Deserialize;
use std::time::Instant;
use tracing::{info, warn};

/// Handle Load request - reads a board snapshot from disk and builds it
pub fn handle_load(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct LoadParams {
        path: String,
        #[serde(default)]
        settings: Option<ConnectivitySettings>,
    }

    let params: LoadParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {path: string, settings?: object}".to_string());
        }
    };

    if let Some(Err(e)) = params.settings.as_ref().map(ConnectivitySettings::validate) {
        return Response::error(id, error_codes::INVALID_PARAMS, format!("Invalid settings: {}", e));
    }

    info!("Loading board: {}", params.path);
    let start = Instant::now();

    let board = match Board::from_json_file(&params.path) {
        Ok(board) => board,
        Err(e) => {
            warn!("Load failed: {:#}", e);
            return Response::error(id, error_codes::LOAD_FAILED, format!("Failed to load board: {:#}", e));
        }
    };

    if let Some(settings) = params.settings {
        state.settings = settings;
    }
    let feature_count = board.features.len();
    let stats = state.install_board(board, Some(params.path));

    info!("Board loaded in {:.2?}", start.elapsed());

    Response::success(id, serde_json::json!({
        "status": "ok",
        "features": feature_count,
        "items": state.engine.registry().len(),
        "rebuild": stats
    }))
}

/// Handle LoadBoard request - takes the snapshot inline
pub fn handle_load_board(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    let value = match params.and_then(|p| p.get("board").cloned()) {
        Some(v) => v,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {board: object}".to_string());
        }
    };

    let board = match Board::from_json_value(value) {
        Ok(board) => board,
        Err(e) => {
            return Response::error(id, error_codes::LOAD_FAILED, format!("Invalid board: {:#}", e));
        }
    };

    let feature_count = board.features.len();
    let stats = state.install_board(board, None);

    Response::success(id, serde_json::json!({
        "status": "ok",
        "features": feature_count,
        "items": state.engine.registry().len(),
        "rebuild": stats
    }))
}

/// Handle SetSettings request - replaces the settings and rebuilds from scratch
pub fn handle_set_settings(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct SettingsParams {
        settings: ConnectivitySettings,
    }

    let params: SettingsParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {settings: object}".to_string());
        }
    };

    if let Err(e) = params.settings.validate() {
        return Response::error(id, error_codes::INVALID_PARAMS, format!("Invalid settings: {}", e));
    }

    info!("Settings changed: {:?}", params.settings);
    state.settings = params.settings;

    let stats = match state.board.as_ref() {
        Some(board) => Some(state.engine.set_settings(state.settings.clone(), board)),
        None => {
            state.engine = crate::connectivity::ConnectivityEngine::new(state.settings.clone());
            None
        }
    };
    if stats.is_some() {
        state.last_rebuild = stats.clone();
    }

    Response::success(id, serde_json::json!({
        "status": "ok",
        "settings": &state.settings,
        "rebuild": stats
    }))
}

/// Handle ApplyNets request - writes resolved nets back onto the board
pub fn handle_apply_nets(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    let board = match state.board.as_mut() {
        Some(board) => board,
        None => return no_board_loaded(id),
    };

    let changed = state.engine.apply_nets(board);
    info!("Applied nets to {} features", changed);

    Response::success(id, serde_json::json!({
        "status": "ok",
        "changed": changed
    }))
}
