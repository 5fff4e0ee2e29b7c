//! Query handlers: GetClusters, GetConflicts, GetDangling, GetReport, GetFeature

use crate::board::FeatureId;
use crate::server::handlers::no_board_loaded;
use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use serde::Deserialize;

/// Handle GetClusters request
pub fn handle_get_clusters(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    if !state.is_board_loaded() {
        return no_board_loaded(id);
    }
    let report = state.engine.report();
    Response::from_serialize(id, &report.clusters)
}

/// Handle GetConflicts request - clusters shorting two or more nets
pub fn handle_get_conflicts(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    if !state.is_board_loaded() {
        return no_board_loaded(id);
    }
    let report = state.engine.report();
    Response::from_serialize(id, &report.conflicts)
}

/// Handle GetDangling request - anchors without a connection
pub fn handle_get_dangling(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    if !state.is_board_loaded() {
        return no_board_loaded(id);
    }
    Response::from_serialize(id, &state.engine.dangling_anchors())
}

/// Handle GetReport request - the full connectivity report
pub fn handle_get_report(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    if !state.is_board_loaded() {
        return no_board_loaded(id);
    }
    Response::from_serialize(id, &state.engine.report())
}

/// Handle GetFeature request - resolved net, cluster and anchors of one feature
pub fn handle_get_feature(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct FeatureParams {
        id: FeatureId,
    }

    let params: FeatureParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(id, error_codes::INVALID_PARAMS,
                "Invalid params: expected {id: number}".to_string());
        }
    };

    let board = match state.board.as_ref() {
        Some(board) => board,
        None => return no_board_loaded(id),
    };
    let feature = match board.get(params.id) {
        Some(f) => f,
        None => {
            return Response::error(id, error_codes::FEATURE_NOT_FOUND,
                format!("Feature {} not found", params.id));
        }
    };

    let anchors: Vec<serde_json::Value> = state
        .engine
        .anchor_status(params.id)
        .into_iter()
        .map(|(position, dangling, connected)| serde_json::json!({
            "position": position,
            "dangling": dangling,
            "connected_items": connected
        }))
        .collect();

    Response::success(id, serde_json::json!({
        "id": params.id,
        "kind": feature.kind_name(),
        "net": feature.net(),
        "resolved_net": state.engine.resolved_net(params.id),
        "cluster": state.engine.cluster_for_feature(params.id).map(|c| c.id()),
        "anchors": anchors
    }))
}
