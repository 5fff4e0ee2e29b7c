//! Connectivity items
//!
//! A `ConnectivityItem` wraps one piece of copper: a pad, a track, an arc, a
//! via, or one (outline, layer) fragment of a filled zone. It owns its
//! anchors and its adjacency list (the graph edges).

use super::anchor::Anchor;
use super::types::{ConnectivitySettings, ItemId, ItemKind, NetCode};
use super::zone::ZoneLayerFragment;
use crate::board::{Feature, FeatureId, FeatureKind};
use crate::geometry::{decompose, primitives_collide, shape_bounding_box, BoundingBox, LayerRange, Point, Primitive, Shape};
use rayon::prelude::*;
use tracing::warn;

/// Copper geometry of an item
#[derive(Clone, Debug)]
pub enum ItemGeometry {
    Shape {
        shape: Shape,
        primitives: Vec<Primitive>,
    },
    Zone(ZoneLayerFragment),
}

#[derive(Clone, Debug)]
pub struct ConnectivityItem {
    id: ItemId,
    feature: FeatureId,
    kind: ItemKind,
    valid: bool,
    dirty: bool,
    layers: LayerRange,
    geometry: ItemGeometry,
    bbox: Option<BoundingBox>,
    anchors: Vec<Anchor>,
    /// Sorted by id, no duplicates
    connected: Vec<ItemId>,
    can_change_net: bool,
    net: NetCode,
    arc_tolerance: f64,
}

/// Placeholder id until the registry assigns the real one
const UNREGISTERED: ItemId = ItemId(u32::MAX);

impl ConnectivityItem {
    /// Wrap a single copper shape
    pub fn new(feature: FeatureId, kind: ItemKind, net: NetCode, layers: LayerRange, shape: Shape, arc_tolerance: f64) -> Self {
        let primitives = decompose(&shape, arc_tolerance);
        let valid = !shape.is_degenerate() && !primitives.is_empty();
        Self {
            id: UNREGISTERED,
            feature,
            kind,
            valid,
            dirty: true,
            layers,
            geometry: ItemGeometry::Shape { shape, primitives },
            bbox: None,
            anchors: Vec::new(),
            connected: Vec::new(),
            can_change_net: kind.default_can_change_net(),
            net,
            arc_tolerance,
        }
    }

    /// Wrap one filled outline of a zone on one layer
    pub fn new_zone_fragment(feature: FeatureId, net: NetCode, fragment: ZoneLayerFragment) -> Self {
        let layers = LayerRange::single(fragment.layer());
        let valid = !fragment.is_empty();
        let vertices: Vec<Point> = fragment.outline().to_vec();
        let mut item = Self {
            id: UNREGISTERED,
            feature,
            kind: ItemKind::ZoneFragment,
            valid,
            dirty: true,
            layers,
            geometry: ItemGeometry::Zone(fragment),
            bbox: None,
            anchors: Vec::new(),
            connected: Vec::new(),
            can_change_net: false,
            net,
            arc_tolerance: 0.0,
        };
        for v in vertices {
            item.add_anchor(v);
        }
        item
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: ItemId) {
        self.id = id;
        for anchor in &mut self.anchors {
            anchor.rebind(id);
        }
    }

    /// The board feature this item stands for
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn net(&self) -> NetCode {
        self.net
    }

    pub fn set_net(&mut self, net: NetCode) {
        self.net = net;
    }

    pub fn can_change_net(&self) -> bool {
        self.can_change_net
    }

    pub fn geometry(&self) -> &ItemGeometry {
        &self.geometry
    }

    pub fn zone_fragment(&self) -> Option<&ZoneLayerFragment> {
        match &self.geometry {
            ItemGeometry::Zone(fragment) => Some(fragment),
            ItemGeometry::Shape { .. } => None,
        }
    }

    pub fn add_anchor(&mut self, position: Point) -> &mut Anchor {
        self.anchors.push(Anchor::new(self.id, position));
        let last = self.anchors.len() - 1;
        &mut self.anchors[last]
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub(crate) fn anchors_mut(&mut self) -> &mut [Anchor] {
        &mut self.anchors
    }

    pub fn layers(&self) -> LayerRange {
        self.layers
    }

    /// Callers go through `ItemRegistry::set_layers` so the index follows
    pub(crate) fn set_layers(&mut self, layers: LayerRange) {
        self.layers = LayerRange::new(layers.top, layers.bottom);
        self.set_dirty(true);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Soft delete; the registry purges the item on its next garbage pass
    pub(crate) fn mark_invalid(&mut self) {
        self.valid = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Setting the flag also drops the cached bounding box
    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
        if dirty {
            self.bbox = None;
        }
    }

    /// Bounding box, recomputed only when the cache was invalidated
    pub fn bounding_box(&mut self) -> BoundingBox {
        if let Some(bbox) = self.bbox {
            return bbox;
        }
        let bbox = self.compute_bounding_box().unwrap_or_else(|| {
            let origin = self.anchors.first().map(|a| a.position()).unwrap_or_default();
            BoundingBox::new(origin.x, origin.y, origin.x, origin.y)
        });
        self.bbox = Some(bbox);
        bbox
    }

    /// Bounding box without touching the cache
    pub fn cached_bounding_box(&self) -> Option<BoundingBox> {
        self.bbox.or_else(|| self.compute_bounding_box())
    }

    fn compute_bounding_box(&self) -> Option<BoundingBox> {
        let bbox = match &self.geometry {
            ItemGeometry::Shape { shape, .. } => shape_bounding_box(shape, self.arc_tolerance),
            ItemGeometry::Zone(fragment) => fragment.bounding_box(),
        }?;
        bbox.is_finite().then_some(bbox)
    }

    /// Adjacent items, sorted by id
    pub fn connected(&self) -> &[ItemId] {
        &self.connected
    }

    pub fn is_connected_to(&self, other: ItemId) -> bool {
        self.connected.binary_search(&other).is_ok()
    }

    /// Record a touch from both sides
    pub fn connect(&mut self, other: &mut ConnectivityItem) {
        self.link(other.id);
        other.link(self.id);
    }

    /// Ordered, deduplicating insert; returns false if already present
    pub(crate) fn link(&mut self, other: ItemId) -> bool {
        match self.connected.binary_search(&other) {
            Ok(_) => false,
            Err(pos) => {
                self.connected.insert(pos, other);
                true
            }
        }
    }

    pub(crate) fn unlink(&mut self, other: ItemId) -> bool {
        match self.connected.binary_search(&other) {
            Ok(pos) => {
                self.connected.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub(crate) fn take_links(&mut self) -> Vec<ItemId> {
        std::mem::take(&mut self.connected)
    }

    /// Move copper and anchors in place
    pub(crate) fn translate(&mut self, delta: Point) {
        match &mut self.geometry {
            ItemGeometry::Shape { shape, primitives } => {
                shape.translate(delta);
                *primitives = decompose(shape, self.arc_tolerance);
            }
            ItemGeometry::Zone(fragment) => fragment.translate(delta),
        }
        for anchor in &mut self.anchors {
            anchor.move_by(delta);
        }
        self.set_dirty(true);
    }

    /// Copper covers the point
    pub fn hit_test(&self, p: Point, epsilon: f64) -> bool {
        match &self.geometry {
            ItemGeometry::Shape { primitives, .. } => primitives.iter().any(|prim| prim.contains(p, epsilon)),
            ItemGeometry::Zone(fragment) => fragment.contains_point(p, epsilon),
        }
    }

    /// Exact contact test between two items
    ///
    /// Zones and area items (pads, vias) connect wherever their copper
    /// touches. Two routing items only connect when an anchor of one lies on
    /// the other: tracks that cross mid-span are not joined.
    pub fn touches(&self, other: &ConnectivityItem, epsilon: f64) -> bool {
        if !self.valid || !other.valid || !self.layers.overlaps(&other.layers) {
            return false;
        }

        match (&self.geometry, &other.geometry) {
            (ItemGeometry::Zone(a), ItemGeometry::Zone(b)) => a.collides_fragment(b, epsilon),
            (ItemGeometry::Zone(zone), ItemGeometry::Shape { primitives, .. })
            | (ItemGeometry::Shape { primitives, .. }, ItemGeometry::Zone(zone)) => zone.collides(primitives, epsilon),
            (ItemGeometry::Shape { primitives: pa, .. }, ItemGeometry::Shape { primitives: pb, .. }) => {
                if self.kind.connects_by_area() || other.kind.connects_by_area() {
                    primitives_collide(pa, pb, epsilon)
                } else {
                    self.anchors.iter().any(|a| other.hit_test(a.position(), epsilon))
                        || other.anchors.iter().any(|a| self.hit_test(a.position(), epsilon))
                }
            }
        }
    }
}

/// Wrap a board feature into connectivity items
///
/// Zones produce one item per filled outline; everything else produces one
/// item. Degenerate geometry or layers outside the board give invalid items
/// that the registry drops on its next purge.
pub fn items_from_feature(feature: &Feature, settings: &ConnectivitySettings, copper_layer_count: u8) -> Vec<ConnectivityItem> {
    let tol = settings.arc_tolerance;
    let net = feature.net();

    let mut items = match &feature.kind {
        FeatureKind::Pad { position, shape, layers } => {
            let mut item = ConnectivityItem::new(feature.id, ItemKind::Pad, net, *layers, shape.clone(), tol);
            item.add_anchor(*position);
            vec![item]
        }
        FeatureKind::Track { start, end, width, layer } => {
            let shape = Shape::Segment { start: *start, end: *end, width: *width };
            let mut item = ConnectivityItem::new(feature.id, ItemKind::Track, net, LayerRange::single(*layer), shape, tol);
            item.add_anchor(*start);
            item.add_anchor(*end);
            vec![item]
        }
        FeatureKind::Arc { start, mid, end, width, layer } => {
            let shape = Shape::Arc { start: *start, mid: *mid, end: *end, width: *width };
            let mut item = ConnectivityItem::new(feature.id, ItemKind::Arc, net, LayerRange::single(*layer), shape, tol);
            item.add_anchor(*start);
            item.add_anchor(*end);
            vec![item]
        }
        FeatureKind::Via { position, diameter, layers } => {
            let shape = Shape::Circle { center: *position, radius: diameter / 2.0 };
            let mut item = ConnectivityItem::new(feature.id, ItemKind::Via, net, *layers, shape, tol);
            item.add_anchor(*position);
            vec![item]
        }
        FeatureKind::Zone { fills } => fills
            .par_iter()
            .enumerate()
            .map(|(index, fill)| {
                let fragment = ZoneLayerFragment::new(index, fill.layer, fill.outline.clone(), fill.holes.clone());
                ConnectivityItem::new_zone_fragment(feature.id, net, fragment)
            })
            .collect(),
    };

    for item in &mut items {
        let deepest = item.layers.top.max(item.layers.bottom);
        if deepest >= copper_layer_count {
            warn!(
                "Feature {} ({}) uses layer {} but the board has {} copper layers; excluded",
                feature.id,
                feature.kind_name(),
                deepest,
                copper_layer_count
            );
            item.mark_invalid();
        } else if !item.is_valid() {
            warn!("Feature {} ({}) has degenerate geometry; excluded", feature.id, feature.kind_name());
        }
    }

    items
}
