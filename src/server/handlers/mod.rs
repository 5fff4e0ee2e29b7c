//! Handler module declarations and re-exports

pub mod board;
pub mod edit;
pub mod query;
pub mod rebuild;

pub use board::*;
pub use edit::*;
pub use query::*;
pub use rebuild::*;

use crate::server::protocol::{error_codes, Response};

pub(crate) fn no_board_loaded(id: Option<serde_json::Value>) -> Response {
    Response::error(id, error_codes::NO_BOARD_LOADED, "No board loaded. Call Load first.".to_string())
}
