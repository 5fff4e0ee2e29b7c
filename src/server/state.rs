//! Server state management for the connectivity server

use crate::board::Board;
use crate::connectivity::{ConnectivityEngine, ConnectivitySettings, RebuildStats};

/// In-memory state: the board snapshot and the engine built from it
pub struct ServerState {
    pub board_path: Option<String>,
    pub board: Option<Board>,
    pub engine: ConnectivityEngine,
    pub settings: ConnectivitySettings,
    pub last_rebuild: Option<RebuildStats>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::with_settings(ConnectivitySettings::default())
    }

    pub fn with_settings(settings: ConnectivitySettings) -> Self {
        Self {
            board_path: None,
            board: None,
            engine: ConnectivityEngine::new(settings.clone()),
            settings,
            last_rebuild: None,
        }
    }

    /// Replace the board and build its connectivity from scratch
    pub fn install_board(&mut self, board: Board, path: Option<String>) -> RebuildStats {
        self.engine = ConnectivityEngine::new(self.settings.clone());
        let stats = self.engine.build(&board);
        self.board = Some(board);
        self.board_path = path;
        self.last_rebuild = Some(stats.clone());
        stats
    }

    /// Check if a board is loaded
    pub fn is_board_loaded(&self) -> bool {
        self.board.is_some()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
