//! Anchor analysis for ratsnest and DRC consumers

use super::cluster::Cluster;
use super::registry::ItemRegistry;
use super::types::{ItemId, ItemKind};
use crate::board::FeatureId;
use crate::geometry::Point;
use serde::Serialize;

/// An anchor with no connection where one is expected
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DanglingAnchor {
    pub feature_id: FeatureId,
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub position: Point,
    pub connected_items: usize,
}

/// Reset every anchor, then tag it with the cluster of its item
///
/// Anchors of zone fragments and of orphaned clusters get `no_line` set:
/// there is no ratsnest to draw from them.
pub fn assign_anchor_clusters(registry: &mut ItemRegistry, clusters: &[Cluster]) {
    for item in registry.iter_mut() {
        for anchor in item.anchors_mut() {
            anchor.reset();
        }
    }

    for cluster in clusters {
        let tag = cluster.id().0 as i32;
        for &id in cluster.items() {
            let item = match registry.get_mut(id) {
                Some(item) => item,
                None => continue,
            };
            let no_line = cluster.is_orphaned() || item.kind() == ItemKind::ZoneFragment;
            for anchor in item.anchors_mut() {
                anchor.set_tag(tag);
                anchor.set_cluster(Some(cluster.id()));
                anchor.set_no_line(no_line);
            }
        }
    }
}

/// Every dangling anchor of every valid item, in item order
pub fn find_dangling_anchors(registry: &ItemRegistry) -> Vec<DanglingAnchor> {
    registry
        .iter()
        .flat_map(|item| {
            item.anchors()
                .iter()
                .filter(|anchor| anchor.is_dangling(registry))
                .map(move |anchor| DanglingAnchor {
                    feature_id: item.feature(),
                    item_id: item.id(),
                    kind: item.kind(),
                    position: anchor.position(),
                    connected_items: anchor.connected_item_count(registry),
                })
        })
        .collect()
}
