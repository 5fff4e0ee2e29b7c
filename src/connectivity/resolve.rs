//! Net resolution and propagation
//!
//! Authoritative items (pads, zones) vote with their net. One distinct net
//! makes it the cluster's origin and it is copied onto every propagatable
//! member. Two or more distinct nets make the cluster conflicting and nothing
//! is written.

use super::cluster::Cluster;
use super::registry::ItemRegistry;
use super::types::{ItemId, NetCode};
use crate::board::FeatureId;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A net code written onto a propagatable item
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetAssignment {
    pub feature_id: FeatureId,
    pub previous: NetCode,
    pub net: NetCode,
}

/// Decide the origin net (or conflict) of one cluster
pub fn resolve_cluster(cluster: &mut Cluster, registry: &ItemRegistry) {
    let votes: Vec<NetCode> = cluster
        .items()
        .iter()
        .filter_map(|id| registry.get(*id))
        .filter(|item| !item.can_change_net() && item.net().is_connected())
        .map(|item| item.net())
        .collect();

    for net in &votes {
        cluster.add_vote(*net);
    }

    match cluster.distinct_nets() {
        0 => {}
        1 => {
            if let Some(net) = votes.first() {
                cluster.set_origin_net(*net);
            }
        }
        n => {
            cluster.mark_conflicting();
            warn!(
                "Cluster {:?} shorts {} nets: {:?}",
                cluster.id(),
                n,
                cluster.ranked_nets().iter().map(|(net, _)| net.0).collect::<Vec<_>>()
            );
        }
    }
}

/// Write each resolved origin net onto the propagatable members of its cluster
///
/// Conflicting and orphaned clusters are left alone. Returns only the items
/// whose net actually changed, one entry per feature.
pub fn propagate_nets(clusters: &[Cluster], registry: &mut ItemRegistry) -> Vec<NetAssignment> {
    let mut assignments: Vec<NetAssignment> = Vec::new();
    let mut seen: HashSet<FeatureId> = HashSet::new();

    for cluster in clusters {
        let net = match cluster.origin_net() {
            Some(net) => net,
            None => continue,
        };

        let members: Vec<ItemId> = cluster.items().to_vec();
        for id in members {
            let item = match registry.get_mut(id) {
                Some(item) => item,
                None => continue,
            };
            if !item.can_change_net() || item.net() == net {
                continue;
            }
            let previous = item.net();
            item.set_net(net);
            if seen.insert(item.feature()) {
                assignments.push(NetAssignment {
                    feature_id: item.feature(),
                    previous,
                    net,
                });
            }
        }
    }

    debug!("Propagated nets onto {} features", assignments.len());
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Feature;
    use crate::connectivity::cluster::find_clusters;
    use crate::connectivity::item::items_from_feature;
    use crate::connectivity::ConnectivitySettings;
    use crate::geometry::{LayerRange, Point, Shape};

    fn pad(registry: &mut ItemRegistry, id: FeatureId, net: u32, x: f64) -> ItemId {
        let shape = Shape::Circle { center: Point::new(x, 0.0), radius: 0.5 };
        let f = Feature::pad(id, NetCode(net), Point::new(x, 0.0), shape, LayerRange::single(0));
        registry.add(items_from_feature(&f, registry.settings(), 2).remove(0))
    }

    fn track(registry: &mut ItemRegistry, id: FeatureId, net: u32) -> ItemId {
        let f = Feature::track(id, NetCode(net), Point::new(0.0, 0.0), Point::new(5.0, 0.0), 0.2, 0);
        registry.add(items_from_feature(&f, registry.settings(), 2).remove(0))
    }

    #[test]
    fn test_same_net_pads_do_not_conflict() {
        let mut registry = ItemRegistry::new(ConnectivitySettings::default());
        let a = pad(&mut registry, 1, 5, 0.0);
        let b = pad(&mut registry, 2, 5, 5.0);
        let t = track(&mut registry, 3, 0);
        registry.connect(a, t);
        registry.connect(b, t);

        let mut clusters = find_clusters(&registry);
        resolve_cluster(&mut clusters[0], &registry);
        assert!(!clusters[0].is_conflicting());
        assert_eq!(clusters[0].origin_net(), Some(NetCode(5)));
        assert_eq!(clusters[0].ranked_nets(), vec![(NetCode(5), 2)]);

        let changes = propagate_nets(&clusters, &mut registry);
        assert_eq!(changes, vec![NetAssignment { feature_id: 3, previous: NetCode(0), net: NetCode(5) }]);
        assert_eq!(registry.get(t).unwrap().net(), NetCode(5));
    }

    #[test]
    fn test_conflict_blocks_propagation() {
        let mut registry = ItemRegistry::new(ConnectivitySettings::default());
        let a = pad(&mut registry, 1, 5, 0.0);
        let b = pad(&mut registry, 2, 7, 5.0);
        let t = track(&mut registry, 3, 9);
        registry.connect(a, t);
        registry.connect(b, t);

        let mut clusters = find_clusters(&registry);
        resolve_cluster(&mut clusters[0], &registry);
        assert!(clusters[0].is_conflicting());
        assert!(propagate_nets(&clusters, &mut registry).is_empty());
        assert_eq!(registry.get(t).unwrap().net(), NetCode(9));
    }

    #[test]
    fn test_unconnected_pads_do_not_vote() {
        let mut registry = ItemRegistry::new(ConnectivitySettings::default());
        let a = pad(&mut registry, 1, 0, 0.0);
        let t = track(&mut registry, 2, 4);
        registry.connect(a, t);

        let mut clusters = find_clusters(&registry);
        resolve_cluster(&mut clusters[0], &registry);
        assert!(clusters[0].is_orphaned());
        assert!(propagate_nets(&clusters, &mut registry).is_empty());
        assert_eq!(registry.get(t).unwrap().net(), NetCode(4));
    }
}
