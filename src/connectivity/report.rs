//! Serializable connectivity report for DRC and ratsnest consumers

use super::cluster::Cluster;
use super::dangling::DanglingAnchor;
use super::engine::ConnectivityEngine;
use super::resolve::NetAssignment;
use super::types::{ClusterId, NetCode};
use crate::board::FeatureId;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Serialize)]
pub struct NetRank {
    pub net: NetCode,
    pub votes: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClusterReport {
    pub id: ClusterId,
    pub origin_net: Option<NetCode>,
    pub conflicting: bool,
    pub orphaned: bool,
    /// Sorted, one entry per feature even when a zone has several fragments
    pub features: Vec<FeatureId>,
    pub net_ranks: Vec<NetRank>,
}

/// A short between two or more authoritative nets
#[derive(Clone, Debug, Serialize)]
pub struct ConflictReport {
    pub cluster: ClusterId,
    pub nets: Vec<NetCode>,
    pub features: Vec<FeatureId>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ReportSummary {
    pub items: usize,
    pub clusters: usize,
    pub conflicts: usize,
    pub orphaned: usize,
    pub dangling: usize,
    pub assignments: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConnectivityReport {
    pub summary: ReportSummary,
    pub clusters: Vec<ClusterReport>,
    pub conflicts: Vec<ConflictReport>,
    pub dangling: Vec<DanglingAnchor>,
    pub assignments: Vec<NetAssignment>,
}

impl ClusterReport {
    fn new(cluster: &Cluster, engine: &ConnectivityEngine) -> Self {
        let features: BTreeSet<FeatureId> = cluster
            .items()
            .iter()
            .filter_map(|id| engine.registry().get(*id))
            .map(|item| item.feature())
            .collect();

        Self {
            id: cluster.id(),
            origin_net: cluster.origin_net(),
            conflicting: cluster.is_conflicting(),
            orphaned: cluster.is_orphaned(),
            features: features.into_iter().collect(),
            net_ranks: cluster
                .ranked_nets()
                .into_iter()
                .map(|(net, votes)| NetRank { net, votes })
                .collect(),
        }
    }
}

impl ConnectivityReport {
    pub fn from_engine(engine: &ConnectivityEngine) -> Self {
        let clusters: Vec<ClusterReport> = engine
            .clusters()
            .iter()
            .map(|c| ClusterReport::new(c, engine))
            .collect();

        let conflicts: Vec<ConflictReport> = clusters
            .iter()
            .filter(|c| c.conflicting)
            .map(|c| ConflictReport {
                cluster: c.id,
                nets: c.net_ranks.iter().map(|r| r.net).collect(),
                features: c.features.clone(),
            })
            .collect();

        let dangling = engine.dangling_anchors();
        let assignments = engine.assignments().to_vec();

        let summary = ReportSummary {
            items: engine.registry().iter().count(),
            clusters: clusters.len(),
            conflicts: conflicts.len(),
            orphaned: clusters.iter().filter(|c| c.orphaned).count(),
            dangling: dangling.len(),
            assignments: assignments.len(),
        };

        Self {
            summary,
            clusters,
            conflicts,
            dangling,
            assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Feature};
    use crate::geometry::{LayerRange, Point, Shape};

    fn rect_pad(id: FeatureId, net: u32, x: f64) -> Feature {
        let center = Point::new(x + 5.0, 5.0);
        Feature::pad(
            id,
            NetCode(net),
            center,
            Shape::Rect { center, width: 10.0, height: 10.0, rotation: 0.0 },
            LayerRange::single(0),
        )
    }

    #[test]
    fn test_conflict_reported_with_ranked_nets() {
        let mut board = Board::new(2);
        board.insert(rect_pad(1, 7, 0.0));
        board.insert(rect_pad(2, 5, 10.0));
        let mut engine = ConnectivityEngine::default();
        engine.build(&board);

        let report = engine.report();
        assert_eq!(report.summary.clusters, 1);
        assert_eq!(report.summary.conflicts, 1);
        assert_eq!(report.conflicts[0].nets, vec![NetCode(5), NetCode(7)]);
        assert_eq!(report.conflicts[0].features, vec![1, 2]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["clusters"][0]["conflicting"], true);
        assert!(json["clusters"][0]["origin_net"].is_null());
    }
}
