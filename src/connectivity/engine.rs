//! Connectivity engine entry points
//!
//! Contains the rebuild cycle and the incremental edit operations:
//! - Full build from a board snapshot
//! - Add / update / move / remove of single features
//! - Rebuild of only what changed since the last commit

use super::cluster::{cluster_membership, find_clusters, Cluster};
use super::dangling::{assign_anchor_clusters, find_dangling_anchors, DanglingAnchor};
use super::discovery::{commit_contacts, discover_contacts};
use super::error::{ConnectivityError, ConnectivityResult};
use super::item::items_from_feature;
use super::registry::ItemRegistry;
use super::report::ConnectivityReport;
use super::resolve::{propagate_nets, resolve_cluster, NetAssignment};
use super::types::{ClusterId, ConnectivitySettings, ItemId, NetCode};
use crate::board::{Board, Feature, FeatureId, DEFAULT_COPPER_LAYERS};
use crate::geometry::Point;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info};

/// Counters from one rebuild cycle
#[derive(Clone, Debug, Default, Serialize)]
pub struct RebuildStats {
    pub purged: usize,
    pub scanned: usize,
    pub contacts: usize,
    pub clusters: usize,
    pub conflicts: usize,
    pub propagated: usize,
    pub elapsed_ms: f64,
}

pub struct ConnectivityEngine {
    registry: ItemRegistry,
    copper_layer_count: u8,
    clusters: Vec<Cluster>,
    membership: HashMap<ItemId, ClusterId>,
    assignments: Vec<NetAssignment>,
}

impl ConnectivityEngine {
    pub fn new(settings: ConnectivitySettings) -> Self {
        Self {
            registry: ItemRegistry::new(settings),
            copper_layer_count: DEFAULT_COPPER_LAYERS,
            clusters: Vec::new(),
            membership: HashMap::new(),
            assignments: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ConnectivitySettings {
        self.registry.settings()
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    /// Wrap every feature of the board and run a full rebuild
    pub fn build(&mut self, board: &Board) -> RebuildStats {
        let start = std::time::Instant::now();
        self.registry.clear();
        self.clusters.clear();
        self.membership.clear();
        self.assignments.clear();
        self.copper_layer_count = board.copper_layer_count;

        for feature in board.iter() {
            self.insert_items(feature);
        }

        info!(
            "Wrapped {} features into {} items in {:?}",
            board.features.len(),
            self.registry.len(),
            start.elapsed()
        );

        // No cancel flag, so the cycle cannot fail
        self.rebuild(None).unwrap_or_default()
    }

    /// Replace every setting and rebuild from scratch on the next cycle
    pub fn set_settings(&mut self, settings: ConnectivitySettings, board: &Board) -> RebuildStats {
        self.registry = ItemRegistry::new(settings);
        self.build(board)
    }

    fn insert_items(&mut self, feature: &Feature) {
        for item in items_from_feature(feature, self.registry.settings(), self.copper_layer_count) {
            self.registry.add(item);
        }
    }

    fn feature_items(&self, feature: FeatureId) -> ConnectivityResult<Vec<ItemId>> {
        let ids = self.registry.items_for_feature(feature);
        let live: Vec<ItemId> = ids
            .iter()
            .copied()
            .filter(|id| self.registry.get(*id).map(|item| item.is_valid()).unwrap_or(false))
            .collect();
        if ids.is_empty() {
            Err(ConnectivityError::UnknownFeature(feature))
        } else {
            Ok(live)
        }
    }

    /// Register a new feature; its items start dirty
    pub fn add_feature(&mut self, feature: &Feature) -> ConnectivityResult<()> {
        if self.registry.contains_feature(feature.id) {
            return Err(ConnectivityError::DuplicateFeature(feature.id));
        }
        self.insert_items(feature);
        debug!("Added feature {} ({})", feature.id, feature.kind_name());
        Ok(())
    }

    /// Geometry or net edit: the old items are soft-deleted and replaced
    pub fn update_feature(&mut self, feature: &Feature) -> ConnectivityResult<()> {
        for id in self.feature_items(feature.id)? {
            self.registry.mark_invalid(id);
        }
        self.insert_items(feature);
        debug!("Updated feature {} ({})", feature.id, feature.kind_name());
        Ok(())
    }

    /// Translate a feature's items and anchors in place
    pub fn move_feature(&mut self, feature: FeatureId, delta: Point) -> ConnectivityResult<()> {
        for id in self.feature_items(feature)? {
            self.registry.translate_item(id, delta);
        }
        debug!("Moved feature {} by ({:.4}, {:.4})", feature, delta.x, delta.y);
        Ok(())
    }

    /// Soft-delete a feature's items; they are purged on the next rebuild
    pub fn remove_feature(&mut self, feature: FeatureId) -> ConnectivityResult<()> {
        for id in self.feature_items(feature)? {
            self.registry.mark_invalid(id);
        }
        debug!("Removed feature {}", feature);
        Ok(())
    }

    /// One rebuild cycle
    ///
    /// Discover (parallel, read-only), purge, commit, cluster, resolve,
    /// analyse anchors. If `cancel` is raised during discovery nothing is
    /// purged or committed, every dirty item stays dirty for the next
    /// attempt, and the previous clusters are dropped.
    pub fn rebuild(&mut self, cancel: Option<&AtomicBool>) -> ConnectivityResult<RebuildStats> {
        let start = std::time::Instant::now();
        let mut stats = RebuildStats::default();

        // Discovery skips invalid items, so purging after it changes nothing
        // the contact set refers to.
        let contacts = match discover_contacts(&self.registry, cancel) {
            Ok(contacts) => contacts,
            Err(e) => {
                self.clusters.clear();
                self.membership.clear();
                self.assignments.clear();
                info!("Rebuild cancelled; clusters dropped until the next rebuild");
                return Err(e);
            }
        };
        stats.purged = self.registry.purge_invalid();
        stats.scanned = contacts.scanned.len();
        stats.contacts = contacts.pairs.len();
        commit_contacts(&mut self.registry, &contacts);

        let mut clusters = find_clusters(&self.registry);
        for cluster in &mut clusters {
            resolve_cluster(cluster, &self.registry);
        }
        self.assignments = propagate_nets(&clusters, &mut self.registry);
        assign_anchor_clusters(&mut self.registry, &clusters);

        stats.clusters = clusters.len();
        stats.conflicts = clusters.iter().filter(|c| c.is_conflicting()).count();
        stats.propagated = self.assignments.len();
        self.membership = cluster_membership(&clusters);
        self.clusters = clusters;

        #[cfg(debug_assertions)]
        if let Err(e) = self.registry.verify() {
            tracing::error!("{}", e);
        }

        stats.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(
            "Rebuild: {} purged, {} scanned, {} contacts, {} clusters ({} conflicting), {} nets propagated in {:.2}ms",
            stats.purged,
            stats.scanned,
            stats.contacts,
            stats.clusters,
            stats.conflicts,
            stats.propagated,
            stats.elapsed_ms
        );

        Ok(stats)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().filter(|c| c.is_conflicting())
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.0 as usize)
    }

    /// Cluster holding the feature's first live item
    pub fn cluster_for_feature(&self, feature: FeatureId) -> Option<&Cluster> {
        self.registry
            .items_for_feature(feature)
            .iter()
            .find_map(|id| self.membership.get(id))
            .and_then(|cid| self.cluster(*cid))
    }

    /// Net the feature ends up on after the last rebuild
    pub fn resolved_net(&self, feature: FeatureId) -> Option<NetCode> {
        self.registry
            .items_for_feature(feature)
            .iter()
            .filter_map(|id| self.registry.get(*id))
            .find(|item| item.is_valid())
            .map(|item| item.net())
    }

    /// Net changes made by the last rebuild
    pub fn assignments(&self) -> &[NetAssignment] {
        &self.assignments
    }

    pub fn dangling_anchors(&self) -> Vec<DanglingAnchor> {
        find_dangling_anchors(&self.registry)
    }

    /// Dangling flag and connection count of each anchor of a feature
    pub fn anchor_status(&self, feature: FeatureId) -> Vec<(Point, bool, usize)> {
        self.registry
            .items_for_feature(feature)
            .iter()
            .filter_map(|id| self.registry.get(*id))
            .filter(|item| item.is_valid())
            .flat_map(|item| {
                item.anchors().iter().map(|a| {
                    (a.position(), a.is_dangling(&self.registry), a.connected_item_count(&self.registry))
                })
            })
            .collect()
    }

    /// Write resolved nets back onto the board's propagatable features
    pub fn apply_nets(&self, board: &mut Board) -> usize {
        let mut changed = 0;
        for item in self.registry.iter().filter(|item| item.can_change_net()) {
            if let Some(feature) = board.get_mut(item.feature()) {
                if feature.net() != item.net() {
                    feature.set_net(item.net());
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn report(&self) -> ConnectivityReport {
        ConnectivityReport::from_engine(self)
    }

    pub fn verify(&self) -> ConnectivityResult<()> {
        self.registry.verify()
    }
}

impl Default for ConnectivityEngine {
    fn default() -> Self {
        Self::new(ConnectivitySettings::default())
    }
}
