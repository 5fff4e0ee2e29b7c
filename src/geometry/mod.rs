//! Geometry module for copper features
//!
//! This module provides the geometric types and exact collision machinery
//! the connectivity engine builds on.
//!
//! # Submodules
//! - `types` - Core geometric primitives (Point, BoundingBox, LayerRange, Shape)
//! - `distance` - Triangle, segment and point distance calculations
//! - `primitives` - Shape decomposition into capsules/triangles and contact tests
//! - `triangulate` - Polygon triangulation using earcut
//! - `spatial` - R-tree entry types for items and zone triangles

mod distance;
mod primitives;
mod spatial;
mod triangulate;
mod types;

pub use types::{
    Point,
    BoundingBox,
    LayerRange,
    Shape,
    polygon_area,
};

pub use distance::{
    Triangle,
    triangle_distance,
    segment_distance,
    segment_intersection,
    point_segment_distance,
    point_in_triangle,
};

pub use primitives::{
    Primitive,
    decompose,
    shape_bounding_box,
    primitives_collide,
    flatten_arc,
    circumcenter,
};

pub use triangulate::triangulate_polygon;

pub use spatial::{
    IndexedItem,
    IndexedTriangle,
    item_envelope,
    bbox_envelope,
};
