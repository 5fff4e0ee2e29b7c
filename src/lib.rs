//! Copper connectivity for printed circuit boards
//!
//! Groups touching copper (pads, tracks, arcs, vias and filled zones) into
//! electrical clusters, resolves the net each cluster carries, reports
//! shorts between nets and finds dangling track ends and vias.
//!
//! # Modules
//! - `geometry` - Shapes, exact contact tests, triangulation and R-tree entries
//! - `board` - Board features and JSON snapshots
//! - `connectivity` - The incremental connectivity engine
//! - `server` - JSON-RPC front end used by the `connectivity_server` binary

pub mod board;
pub mod connectivity;
pub mod geometry;
pub mod server;

pub use board::{Board, Feature, FeatureId, FeatureKind, ZoneFill};
pub use connectivity::{
    ConnectivityEngine, ConnectivityError, ConnectivityReport, ConnectivityResult, ConnectivitySettings, NetCode,
};
