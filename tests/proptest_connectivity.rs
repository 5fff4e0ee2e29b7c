//! Property-based tests for the connectivity engine
//!
//! Random pads and tracks on a coarse integer grid, so contacts are common
//! and no contact sits on the epsilon boundary.

use copper_connect::board::{Board, Feature, FeatureId};
use copper_connect::connectivity::{ConnectivityEngine, ConnectivitySettings, NetCode};
use copper_connect::geometry::{LayerRange, Point, Shape};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Draft {
    Pad { net: u32, x: i32, y: i32 },
    Track { x0: i32, y0: i32, x1: i32, y1: i32, layer: u8 },
}

fn arb_draft() -> impl Strategy<Value = Draft> {
    prop_oneof![
        (0u32..4, 0i32..8, 0i32..8).prop_map(|(net, x, y)| Draft::Pad { net, x, y }),
        (0i32..8, 0i32..8, 0i32..8, 0i32..8, 0u8..2)
            .prop_map(|(x0, y0, x1, y1, layer)| Draft::Track { x0, y0, x1, y1, layer }),
    ]
}

fn to_feature(id: FeatureId, draft: &Draft) -> Feature {
    match *draft {
        Draft::Pad { net, x, y } => {
            let center = Point::new(x as f64, y as f64);
            Feature::pad(id, NetCode(net), center, Shape::Circle { center, radius: 0.45 }, LayerRange::new(0, 1))
        }
        Draft::Track { x0, y0, x1, y1, layer } => Feature::track(
            id,
            NetCode::UNCONNECTED,
            Point::new(x0 as f64, y0 as f64),
            Point::new(x1 as f64, y1 as f64),
            0.2,
            layer,
        ),
    }
}

fn to_board(drafts: &[Draft]) -> Board {
    let features = drafts
        .iter()
        .enumerate()
        .map(|(i, s)| to_feature(i as FeatureId + 1, s))
        .collect();
    Board::from_features(2, features).unwrap()
}

fn settings(parallel: bool) -> ConnectivitySettings {
    ConnectivitySettings { parallel_discovery: parallel, ..Default::default() }
}

fn build(board: &Board) -> ConnectivityEngine {
    let mut engine = ConnectivityEngine::new(settings(true));
    engine.build(board);
    engine
}

fn partition(engine: &ConnectivityEngine) -> BTreeSet<Vec<FeatureId>> {
    engine.report().clusters.into_iter().map(|c| c.features).collect()
}

proptest! {
    /// Adjacency is symmetric, sorted and the index agrees with the arena.
    #[test]
    fn adjacency_invariants_hold(drafts in prop::collection::vec(arb_draft(), 1..30)) {
        let engine = build(&to_board(&drafts));
        prop_assert!(engine.verify().is_ok());
    }

    /// A second rebuild with no edits scans nothing and changes nothing.
    #[test]
    fn rebuild_is_idempotent(drafts in prop::collection::vec(arb_draft(), 1..30)) {
        let mut engine = build(&to_board(&drafts));
        let before = partition(&engine);
        let stats = engine.rebuild(None).unwrap();
        prop_assert_eq!(stats.scanned, 0);
        prop_assert_eq!(stats.propagated, 0);
        prop_assert_eq!(partition(&engine), before);
    }

    /// Feature order changes ids and scan order but not the clusters.
    #[test]
    fn partition_is_order_independent(drafts in prop::collection::vec(arb_draft(), 1..30)) {
        let board = to_board(&drafts);
        let mut reversed: Vec<Feature> = board.iter().cloned().collect();
        reversed.reverse();
        let reversed = Board::from_features(2, reversed).unwrap();

        prop_assert_eq!(partition(&build(&board)), partition(&build(&reversed)));
    }

    /// Serial and parallel discovery agree.
    #[test]
    fn serial_matches_parallel(drafts in prop::collection::vec(arb_draft(), 1..30)) {
        let board = to_board(&drafts);
        let mut serial = ConnectivityEngine::new(settings(false));
        serial.build(&board);
        prop_assert_eq!(partition(&serial), partition(&build(&board)));
    }

    /// Moving one feature and rebuilding gives the same clusters as a
    /// full build of the moved board.
    #[test]
    fn incremental_move_matches_full_build(
        drafts in prop::collection::vec(arb_draft(), 1..30),
        pick in any::<prop::sample::Index>(),
        dx in -3i32..4,
        dy in -3i32..4,
    ) {
        let mut board = to_board(&drafts);
        let mut engine = build(&board);

        let id = pick.index(drafts.len()) as FeatureId + 1;
        let delta = Point::new(dx as f64, dy as f64);
        engine.move_feature(id, delta).unwrap();
        board.get_mut(id).unwrap().translate(delta);
        engine.rebuild(None).unwrap();

        prop_assert!(engine.verify().is_ok());
        prop_assert_eq!(partition(&engine), partition(&build(&board)));
    }

    /// A cluster conflicts exactly when its pads carry two or more nets.
    #[test]
    fn conflict_iff_two_authoritative_nets(drafts in prop::collection::vec(arb_draft(), 1..30)) {
        let board = to_board(&drafts);
        let engine = build(&board);

        for cluster in engine.report().clusters {
            let nets: BTreeSet<NetCode> = cluster
                .features
                .iter()
                .filter_map(|id| board.get(*id))
                .filter(|f| f.kind_name() == "pad" && f.net().is_connected())
                .map(|f| f.net())
                .collect();
            prop_assert_eq!(cluster.conflicting, nets.len() >= 2);
            if nets.len() == 1 {
                prop_assert_eq!(cluster.origin_net, nets.iter().next().copied());
            }
        }
    }
}
