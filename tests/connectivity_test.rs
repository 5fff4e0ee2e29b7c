//! End-to-end connectivity scenarios on small hand-built boards

use copper_connect::board::{Board, Feature, FeatureId, ZoneFill};
use copper_connect::connectivity::{ConnectivityEngine, ConnectivitySettings, NetCode};
use copper_connect::geometry::{LayerRange, Point, Shape};

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Axis-aligned rectangular pad spanning (x0, y0)-(x1, y1) on layer 0
fn rect_pad(id: FeatureId, net: u32, x0: f64, y0: f64, x1: f64, y1: f64) -> Feature {
    let center = p((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    Feature::pad(
        id,
        NetCode(net),
        center,
        Shape::Rect { center, width: x1 - x0, height: y1 - y0, rotation: 0.0 },
        LayerRange::single(0),
    )
}

fn track(id: FeatureId, net: u32, a: Point, b: Point, layer: u8) -> Feature {
    Feature::track(id, NetCode(net), a, b, 0.2, layer)
}

fn board(features: Vec<Feature>) -> Board {
    Board::from_features(2, features).unwrap()
}

fn built(board: &Board) -> ConnectivityEngine {
    let mut engine = ConnectivityEngine::new(ConnectivitySettings::default());
    engine.build(board);
    engine
}

/// Clusters as sorted feature id sets, sorted
fn partition(engine: &ConnectivityEngine) -> Vec<Vec<FeatureId>> {
    let mut clusters: Vec<Vec<FeatureId>> = engine.report().clusters.into_iter().map(|c| c.features).collect();
    clusters.sort();
    clusters
}

#[test]
fn test_abutting_same_net_pads_merge() {
    let board = board(vec![
        rect_pad(1, 5, 0.0, 0.0, 10.0, 10.0),
        rect_pad(2, 5, 10.0, 0.0, 20.0, 10.0),
    ]);
    let engine = built(&board);

    assert_eq!(partition(&engine), vec![vec![1, 2]]);
    let cluster = engine.cluster_for_feature(1).unwrap();
    assert!(!cluster.is_conflicting());
    assert_eq!(cluster.origin_net(), Some(NetCode(5)));
    engine.verify().unwrap();
}

#[test]
fn test_short_between_nets_is_a_conflict() {
    let board = board(vec![
        rect_pad(1, 5, 0.0, 0.0, 10.0, 10.0),
        rect_pad(2, 7, 10.0, 0.0, 20.0, 10.0),
        track(3, 0, p(5.0, 5.0), p(5.0, 20.0), 0),
    ]);
    let engine = built(&board);

    let conflicts: Vec<_> = engine.conflicts().collect();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].origin_net(), None);

    let report = engine.report();
    assert_eq!(report.conflicts[0].nets, vec![NetCode(5), NetCode(7)]);
    assert_eq!(report.conflicts[0].features, vec![1, 2, 3]);
    // Nothing is written into a shorted cluster
    assert_eq!(engine.resolved_net(3), Some(NetCode::UNCONNECTED));
    assert!(report.assignments.is_empty());
}

#[test]
fn test_pad_net_propagates_through_track_and_via() {
    let via = Feature::via(3, NetCode::UNCONNECTED, p(5.0, 0.0), 0.6, LayerRange::new(0, 1));
    let mut board = board(vec![
        Feature::pad(1, NetCode(3), p(0.0, 0.0), Shape::Circle { center: p(0.0, 0.0), radius: 0.5 }, LayerRange::single(0)),
        track(2, 0, p(0.0, 0.0), p(5.0, 0.0), 0),
        via,
        track(4, 9, p(5.0, 0.0), p(5.0, 5.0), 1),
    ]);
    let engine = built(&board);

    for id in [2, 3, 4] {
        assert_eq!(engine.resolved_net(id), Some(NetCode(3)), "feature {}", id);
    }
    assert_eq!(engine.assignments().len(), 3);
    assert_eq!(engine.apply_nets(&mut board), 3);
    assert_eq!(board.get(4).unwrap().net(), NetCode(3));
    // Pads are authoritative and never rewritten
    assert_eq!(board.get(1).unwrap().net(), NetCode(3));
}

#[test]
fn test_dangling_end_resolved_by_move() {
    let board = board(vec![
        track(1, 0, p(0.0, 0.0), p(5.0, 0.0), 0),
        track(2, 0, p(6.0, 0.0), p(10.0, 0.0), 0),
    ]);
    let mut engine = built(&board);
    assert_eq!(engine.dangling_anchors().len(), 4);
    assert_eq!(engine.clusters().len(), 2);

    engine.move_feature(2, p(-1.0, 0.0)).unwrap();
    let stats = engine.rebuild(None).unwrap();
    assert_eq!(stats.scanned, 1);
    assert_eq!(stats.clusters, 1);

    let positions: Vec<Point> = engine.dangling_anchors().iter().map(|d| d.position).collect();
    assert_eq!(positions, vec![p(0.0, 0.0), p(9.0, 0.0)]);

    let status = engine.anchor_status(1);
    assert_eq!(status[1], (p(5.0, 0.0), false, 1));
}

#[test]
fn test_concave_zone_only_connects_inside_copper() {
    let l_shape = vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 2.0), p(2.0, 2.0), p(2.0, 10.0), p(0.0, 10.0)];
    let zone = Feature::zone(1, NetCode(4), vec![ZoneFill { layer: 0, outline: l_shape, holes: vec![] }]);
    let inside = Feature::via(2, NetCode::UNCONNECTED, p(1.0, 5.0), 0.6, LayerRange::new(0, 1));
    // Pad inside the zone's bounding box but in the notch of the L
    let notch = Feature::pad(3, NetCode::UNCONNECTED, p(5.0, 5.0), Shape::Circle { center: p(5.0, 5.0), radius: 0.5 }, LayerRange::single(0));
    let engine = built(&board(vec![zone, inside, notch]));

    assert_eq!(partition(&engine), vec![vec![1, 2], vec![3]]);
    assert_eq!(engine.resolved_net(2), Some(NetCode(4)));
    assert_eq!(engine.resolved_net(3), Some(NetCode::UNCONNECTED));

    let dangling: Vec<FeatureId> = engine.dangling_anchors().iter().map(|d| d.feature_id).collect();
    assert_eq!(dangling, vec![3]);
}

#[test]
fn test_zone_hole_isolates_pad() {
    let square = vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
    let hole = vec![p(3.0, 3.0), p(7.0, 3.0), p(7.0, 7.0), p(3.0, 7.0)];
    let zone = Feature::zone(1, NetCode(1), vec![ZoneFill { layer: 0, outline: square, holes: vec![hole] }]);
    let pad = Feature::pad(2, NetCode(2), p(5.0, 5.0), Shape::Circle { center: p(5.0, 5.0), radius: 1.0 }, LayerRange::single(0));
    let engine = built(&board(vec![zone, pad]));

    assert_eq!(engine.clusters().len(), 2);
    assert_eq!(engine.conflicts().count(), 0);
}

fn square_zone(id: FeatureId, net: u32, x0: f64, y0: f64, size: f64) -> Feature {
    let outline = vec![p(x0, y0), p(x0 + size, y0), p(x0 + size, y0 + size), p(x0, y0 + size)];
    Feature::zone(id, NetCode(net), vec![ZoneFill { layer: 0, outline, holes: vec![] }])
}

#[test]
fn test_overlapping_zones_of_different_nets_conflict() {
    let engine = built(&board(vec![square_zone(1, 3, 0.0, 0.0, 10.0), square_zone(2, 8, 6.0, 6.0, 10.0)]));

    assert_eq!(partition(&engine), vec![vec![1, 2]]);
    let report = engine.report();
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].nets, vec![NetCode(3), NetCode(8)]);
}

#[test]
fn test_disjoint_zones_on_one_layer_stay_separate() {
    let l_shape = vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 2.0), p(2.0, 2.0), p(2.0, 10.0), p(0.0, 10.0)];
    let l_zone = Feature::zone(1, NetCode(3), vec![ZoneFill { layer: 0, outline: l_shape, holes: vec![] }]);
    // Inside the L's bounding box, clear of its copper
    let engine = built(&board(vec![l_zone, square_zone(2, 8, 4.0, 4.0, 5.0)]));

    assert_eq!(partition(&engine), vec![vec![1], vec![2]]);
    assert_eq!(engine.conflicts().count(), 0);
}

#[test]
fn test_reversed_via_layers_from_json_still_connect() {
    let json = r#"{"copper_layer_count": 2, "features": [
        {"id": 1, "net": 5, "kind": "via", "position": {"x": 0.0, "y": 0.0}, "diameter": 0.6,
         "layers": {"top": 1, "bottom": 0}},
        {"id": 2, "kind": "track", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 3.0, "y": 0.0}, "width": 0.2, "layer": 1}
    ]}"#;
    let board = Board::from_json_str(json).unwrap();
    let engine = built(&board);

    assert_eq!(partition(&engine), vec![vec![1, 2]]);
    assert_eq!(engine.registry().iter().count(), 2);
}

#[test]
fn test_arc_end_joins_track() {
    let arc = Feature::arc(1, NetCode::UNCONNECTED, p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0), 0.2, 0);
    let engine = built(&board(vec![arc, track(2, 0, p(2.0, 0.0), p(4.0, 0.0), 0)]));
    assert_eq!(partition(&engine), vec![vec![1, 2]]);
}

#[test]
fn test_tracks_on_different_layers_do_not_connect() {
    let engine = built(&board(vec![
        track(1, 0, p(0.0, 0.0), p(5.0, 0.0), 0),
        track(2, 0, p(5.0, 0.0), p(10.0, 0.0), 1),
    ]));
    assert_eq!(engine.clusters().len(), 2);
}

#[test]
fn test_rebuild_is_idempotent() {
    let board = board(vec![
        rect_pad(1, 5, 0.0, 0.0, 10.0, 10.0),
        track(2, 0, p(5.0, 5.0), p(5.0, 20.0), 0),
        track(3, 0, p(5.0, 20.0), p(15.0, 20.0), 0),
    ]);
    let mut engine = built(&board);
    let first = serde_json::to_value(engine.report()).unwrap();

    let stats = engine.rebuild(None).unwrap();
    assert_eq!(stats.scanned, 0);
    assert_eq!(stats.propagated, 0);
    let mut second = serde_json::to_value(engine.report()).unwrap();
    // The second cycle has nothing left to assign
    second["assignments"] = first["assignments"].clone();
    second["summary"]["assignments"] = first["summary"]["assignments"].clone();
    assert_eq!(first, second);
}

#[test]
fn test_incremental_edits_match_full_build() {
    let mut board = board(vec![
        rect_pad(1, 5, 0.0, 0.0, 10.0, 10.0),
        track(2, 0, p(5.0, 5.0), p(5.0, 20.0), 0),
        track(3, 0, p(5.0, 20.0), p(15.0, 20.0), 0),
        track(4, 0, p(30.0, 0.0), p(40.0, 0.0), 0),
    ]);
    let mut engine = built(&board);

    // Move, delete and insert, mirrored on the board
    engine.move_feature(4, p(-15.0, 20.0)).unwrap();
    board.get_mut(4).unwrap().translate(p(-15.0, 20.0));
    engine.remove_feature(2).unwrap();
    board.remove(2);
    let bridge = track(5, 0, p(5.0, 5.0), p(5.0, 20.0), 1);
    engine.add_feature(&bridge).unwrap();
    board.insert(bridge);
    engine.rebuild(None).unwrap();
    engine.verify().unwrap();

    let fresh = built(&board);
    assert_eq!(partition(&engine), partition(&fresh));
}

#[test]
fn test_update_replaces_items() {
    let board = board(vec![
        rect_pad(1, 5, 0.0, 0.0, 10.0, 10.0),
        track(2, 0, p(5.0, 5.0), p(5.0, 20.0), 0),
    ]);
    let mut engine = built(&board);
    engine.update_feature(&track(2, 0, p(50.0, 5.0), p(50.0, 20.0), 0)).unwrap();
    let stats = engine.rebuild(None).unwrap();
    assert_eq!(stats.purged, 1);
    assert_eq!(stats.clusters, 2);
    assert_eq!(engine.registry().items_for_feature(2).len(), 1);
    engine.verify().unwrap();
}
