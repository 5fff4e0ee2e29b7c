//! Spatial indexing types
//!
//! R-tree wrappers for connectivity items (keyed by bounding box and layer
//! range) and for the triangles of a zone fragment.

use super::distance::Triangle;
use super::types::{BoundingBox, LayerRange};
use rstar::{RTreeObject, AABB};

/// Item entry in the registry index
///
/// The envelope is three-dimensional: x, y and the copper layer span, so a
/// single envelope query filters by position and layer at once.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedItem {
    pub id: u32,
    pub envelope: AABB<[f64; 3]>,
}

impl IndexedItem {
    pub fn new(id: u32, bbox: &BoundingBox, layers: LayerRange) -> Self {
        Self {
            id,
            envelope: item_envelope(bbox, layers),
        }
    }
}

impl RTreeObject for IndexedItem {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Build the 3D query envelope for a box on a layer range
pub fn item_envelope(bbox: &BoundingBox, layers: LayerRange) -> AABB<[f64; 3]> {
    AABB::from_corners(
        [bbox.min_x, bbox.min_y, layers.top as f64],
        [bbox.max_x, bbox.max_y, layers.bottom as f64],
    )
}

/// Triangle entry in a zone fragment's secondary index
#[derive(Clone, Debug)]
pub struct IndexedTriangle {
    pub triangle: Triangle,
}

impl RTreeObject for IndexedTriangle {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.triangle.bbox.min_x, self.triangle.bbox.min_y],
            [self.triangle.bbox.max_x, self.triangle.bbox.max_y],
        )
    }
}

/// 2D query envelope for a bounding box
pub fn bbox_envelope(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}
