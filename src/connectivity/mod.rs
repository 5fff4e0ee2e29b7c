//! Copper connectivity engine
//!
//! Builds the touch graph of a board's copper, partitions it into clusters
//! and resolves which net each cluster carries.
//!
//! # Submodules
//! - `types` - Net codes, handles, item kinds and settings
//! - `error` - Error type for engine operations
//! - `anchor` - Connectable points of an item
//! - `item` - Connectivity items and their exact contact test
//! - `zone` - Triangulated zone fragments
//! - `registry` - Item arena, R-tree and adjacency maintenance
//! - `discovery` - Parallel contact search and serial commit
//! - `cluster` - Breadth-first cluster traversal
//! - `resolve` - Net voting, conflicts and propagation
//! - `dangling` - Anchor tagging and dangling detection
//! - `engine` - Build / edit / rebuild entry points
//! - `report` - Serializable report for DRC and ratsnest consumers

mod anchor;
mod cluster;
mod dangling;
mod discovery;
mod engine;
mod error;
mod item;
mod registry;
mod report;
mod resolve;
mod types;
mod zone;

pub use anchor::{Anchor, UNCONNECTED_TAG};
pub use cluster::{cluster_membership, find_clusters, Cluster};
pub use dangling::{assign_anchor_clusters, find_dangling_anchors, DanglingAnchor};
pub use discovery::{commit_contacts, discover_contacts, ContactSet};
pub use engine::{ConnectivityEngine, RebuildStats};
pub use error::{ConnectivityError, ConnectivityResult};
pub use item::{items_from_feature, ConnectivityItem, ItemGeometry};
pub use registry::ItemRegistry;
pub use report::{ClusterReport, ConflictReport, ConnectivityReport, NetRank, ReportSummary};
pub use resolve::{propagate_nets, resolve_cluster, NetAssignment};
pub use types::{ClusterId, ConnectivitySettings, ItemId, ItemKind, NetCode};
pub use zone::ZoneLayerFragment;
