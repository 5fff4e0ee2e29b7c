//! Anchors: the connectable points of a connectivity item

use super::registry::ItemRegistry;
use super::types::{ClusterId, ItemId, ItemKind};
use crate::geometry::Point;

/// Tag of an anchor that has not been reached by a cluster traversal
pub const UNCONNECTED_TAG: i32 = -1;

/// A single connectable point owned by one item
///
/// `cluster` is a plain index into the clusters of the latest build and is
/// reset on every rebuild; it never keeps a cluster alive.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    position: Point,
    item: ItemId,
    tag: i32,
    no_line: bool,
    cluster: Option<ClusterId>,
}

impl Anchor {
    pub fn new(item: ItemId, position: Point) -> Self {
        Self {
            position,
            item,
            tag: UNCONNECTED_TAG,
            no_line: false,
            cluster: None,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Owning item
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// Translate in place, used when the owning item moves
    pub fn move_by(&mut self, delta: Point) {
        self.position = self.position + delta;
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    pub fn set_tag(&mut self, tag: i32) {
        self.tag = tag;
    }

    pub fn no_line(&self) -> bool {
        self.no_line
    }

    pub fn set_no_line(&mut self, no_line: bool) {
        self.no_line = no_line;
    }

    pub fn cluster(&self) -> Option<ClusterId> {
        self.cluster
    }

    pub fn set_cluster(&mut self, cluster: Option<ClusterId>) {
        self.cluster = cluster;
    }

    /// Forget the results of the previous build
    pub fn reset(&mut self) {
        self.tag = UNCONNECTED_TAG;
        self.no_line = false;
        self.cluster = None;
    }

    pub(crate) fn rebind(&mut self, item: ItemId) {
        self.item = item;
    }

    /// Number of distinct adjacent items whose copper covers this exact point
    ///
    /// An item may have several anchors, so its adjacency list is filtered by
    /// coincidence at this position.
    pub fn connected_item_count(&self, registry: &ItemRegistry) -> usize {
        self.connected_items(registry, |_| true)
    }

    /// An anchor lacking its expected connection
    ///
    /// Track and arc endpoints (and pads) need at least one other item at the
    /// point. Vias need `via_min_connections` routing or zone connections.
    /// Zone fragment vertices are never dangling.
    pub fn is_dangling(&self, registry: &ItemRegistry) -> bool {
        let owner = match registry.get(self.item) {
            Some(item) if item.is_valid() => item,
            _ => return true,
        };

        match owner.kind() {
            ItemKind::ZoneFragment => false,
            ItemKind::Via => {
                let compatible = self.connected_items(registry, |kind| {
                    kind.is_routing() || kind == ItemKind::ZoneFragment
                });
                compatible < registry.settings().via_min_connections.max(1)
            }
            _ => self.connected_item_count(registry) == 0,
        }
    }

    fn connected_items(&self, registry: &ItemRegistry, accept: impl Fn(ItemKind) -> bool) -> usize {
        let owner = match registry.get(self.item) {
            Some(item) => item,
            None => return 0,
        };
        let epsilon = registry.settings().contact_epsilon;

        owner
            .connected()
            .iter()
            .filter_map(|id| registry.get(*id))
            .filter(|other| other.is_valid() && accept(other.kind()))
            .filter(|other| other.hit_test(self.position, epsilon))
            .count()
    }
}
