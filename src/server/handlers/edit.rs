//! Edit handlers: MoveFeature, DeleteFeature, UpsertFeature
//!
//! Edits only mark items dirty; the graph is brought up to date by the next
//! Rebuild request.

use crate::board::{Feature, FeatureId};
use crate::connectivity::{ConnectivityError, ConnectivityResult};
use crate::geometry::Point;
use crate::server::handlers::no_board_loaded;
use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use serde::Deserialize;
use tracing::debug;

/// Features without copper (a zone with no fills) have no items to edit
fn tolerate_empty(result: ConnectivityResult<()>) -> ConnectivityResult<()> {
    match result {
        Err(ConnectivityError::UnknownFeature(feature)) => {
            debug!("Feature {} has no copper items", feature);
            Ok(())
        }
        other => other,
    }
}

/// Handle MoveFeature request - translates a feature by (dx, dy)
pub fn handle_move_feature(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct MoveParams {
        id: FeatureId,
        dx: f64,
        dy: f64,
    }

    let params: MoveParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {id: number, dx: number, dy: number}".to_string());
        }
    };

    let board = match state.board.as_mut() {
        Some(board) => board,
        None => return no_board_loaded(id),
    };
    let feature = match board.get_mut(params.id) {
        Some(f) => f,
        None => {
            return Response::error(id, error_codes::FEATURE_NOT_FOUND,
                format!("Feature {} not found", params.id));
        }
    };

    let delta = Point::new(params.dx, params.dy);
    feature.translate(delta);
    if let Err(e) = tolerate_empty(state.engine.move_feature(params.id, delta)) {
        return Response::error(id, error_codes::INTERNAL_ERROR, e.to_string());
    }

    Response::success(id, serde_json::json!({ "status": "ok", "moved_id": params.id }))
}

/// Handle DeleteFeature request
pub fn handle_delete_feature(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct DeleteParams {
        id: FeatureId,
    }

    let params: DeleteParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {id: number}".to_string());
        }
    };

    let board = match state.board.as_mut() {
        Some(board) => board,
        None => return no_board_loaded(id),
    };
    if board.remove(params.id).is_none() {
        return Response::error(id, error_codes::FEATURE_NOT_FOUND,
            format!("Feature {} not found", params.id));
    }
    if let Err(e) = tolerate_empty(state.engine.remove_feature(params.id)) {
        return Response::error(id, error_codes::INTERNAL_ERROR, e.to_string());
    }

    Response::success(id, serde_json::json!({ "status": "ok", "deleted_id": params.id }))
}

/// Handle UpsertFeature request - adds a new feature or replaces an existing one
pub fn handle_upsert_feature(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct UpsertParams {
        feature: Feature,
    }

    let params: UpsertParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {feature: object}".to_string());
        }
    };

    let board = match state.board.as_mut() {
        Some(board) => board,
        None => return no_board_loaded(id),
    };

    let feature = params.feature;
    let result = if state.engine.registry().contains_feature(feature.id) {
        state.engine.update_feature(&feature)
    } else {
        state.engine.add_feature(&feature)
    };
    if let Err(e) = result {
        return Response::error(id, error_codes::INTERNAL_ERROR, e.to_string());
    }

    let feature_id = feature.id;
    let replaced = board.insert(feature).is_some();

    Response::success(id, serde_json::json!({
        "status": "ok",
        "id": feature_id,
        "replaced": replaced
    }))
}
