//! Core geometry types for board features
//!
//! This module contains the fundamental geometric primitives used throughout
//! the engine: points, bounding boxes, layer ranges and feature shapes.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D point in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 2D cross product
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Box covering every point, or `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    pub fn inflate(&self, amount: f64) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Inclusive overlap test (shared edges count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

/// Inclusive range of copper layers, 0 = front copper
///
/// Always `top <= bottom`, including when read from a snapshot that lists
/// the layers the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawLayerRange")]
pub struct LayerRange {
    pub top: u8,
    pub bottom: u8,
}

#[derive(Deserialize)]
struct RawLayerRange {
    top: u8,
    bottom: u8,
}

impl From<RawLayerRange> for LayerRange {
    fn from(raw: RawLayerRange) -> Self {
        LayerRange::new(raw.top, raw.bottom)
    }
}

impl LayerRange {
    /// Layers are reordered so `top <= bottom`
    pub fn new(a: u8, b: u8) -> Self {
        Self {
            top: a.min(b),
            bottom: a.max(b),
        }
    }

    pub const fn single(layer: u8) -> Self {
        Self {
            top: layer,
            bottom: layer,
        }
    }

    pub fn overlaps(&self, other: &LayerRange) -> bool {
        self.top <= other.bottom && other.top <= self.bottom
    }

    pub fn contains(&self, layer: u8) -> bool {
        layer >= self.top && layer <= self.bottom
    }
}

/// Copper shape of a board feature in absolute board coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle {
        center: Point,
        radius: f64,
    },
    /// Straight segment with round ends
    Segment {
        start: Point,
        end: Point,
        width: f64,
    },
    /// Three-point arc with round ends
    Arc {
        start: Point,
        mid: Point,
        end: Point,
        width: f64,
    },
    Rect {
        center: Point,
        width: f64,
        height: f64,
        /// Degrees, counter-clockwise
        #[serde(default)]
        rotation: f64,
    },
    Polygon {
        outline: Vec<Point>,
        #[serde(default)]
        holes: Vec<Vec<Point>>,
    },
}

impl Shape {
    /// Translate the shape in place
    pub fn translate(&mut self, delta: Point) {
        match self {
            Shape::Circle { center, .. } | Shape::Rect { center, .. } => {
                *center = *center + delta;
            }
            Shape::Segment { start, end, .. } => {
                *start = *start + delta;
                *end = *end + delta;
            }
            Shape::Arc { start, mid, end, .. } => {
                *start = *start + delta;
                *mid = *mid + delta;
                *end = *end + delta;
            }
            Shape::Polygon { outline, holes } => {
                for p in outline.iter_mut().chain(holes.iter_mut().flatten()) {
                    *p = *p + delta;
                }
            }
        }
    }

    /// Zero-area shapes cannot carry current and are excluded from connectivity
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Circle { radius, .. } => !(*radius > 0.0),
            Shape::Segment { start, end, width } => !(*width > 0.0) && start == end,
            Shape::Arc { width, start, end, .. } => !(*width > 0.0) && start == end,
            Shape::Rect { width, height, .. } => !(*width > 0.0 && *height > 0.0),
            Shape::Polygon { outline, .. } => {
                outline.len() < 3 || polygon_area(outline).abs() < f64::EPSILON
            }
        }
    }

    /// Corner points of a rotated rectangle, counter-clockwise
    pub fn rect_corners(center: Point, width: f64, height: f64, rotation: f64) -> [Point; 4] {
        let (sin_r, cos_r) = rotation.to_radians().sin_cos();
        let hw = width / 2.0;
        let hh = height / 2.0;
        let transform = |x: f64, y: f64| {
            Point::new(center.x + x * cos_r - y * sin_r, center.y + x * sin_r + y * cos_r)
        };
        [
            transform(-hw, -hh),
            transform(hw, -hh),
            transform(hw, hh),
            transform(-hw, hh),
        ]
    }
}

/// Signed shoelace area (positive for counter-clockwise rings)
pub fn polygon_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for (i, p) in ring.iter().enumerate() {
        let q = ring[(i + 1) % ring.len()];
        area += p.cross(q);
    }
    area / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_range_overlap() {
        let through = LayerRange::new(3, 0);
        assert_eq!(through.top, 0);
        assert!(through.overlaps(&LayerRange::single(2)));
        assert!(!LayerRange::single(0).overlaps(&LayerRange::single(1)));
    }

    #[test]
    fn test_layer_range_reversed_in_json() {
        let layers: LayerRange = serde_json::from_str(r#"{"top": 1, "bottom": 0}"#).unwrap();
        assert_eq!(layers, LayerRange::new(0, 1));
        assert!(layers.overlaps(&LayerRange::single(1)));
        assert_eq!(serde_json::to_value(layers).unwrap(), serde_json::json!({"top": 0, "bottom": 1}));
    }

    #[test]
    fn test_bbox_touching_edges_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&BoundingBox::new(10.1, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_degenerate_shapes() {
        assert!(Shape::Circle { center: Point::default(), radius: 0.0 }.is_degenerate());
        assert!(Shape::Polygon {
            outline: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)],
            holes: vec![],
        }
        .is_degenerate());
        assert!(!Shape::Segment {
            start: Point::new(0.0, 0.0),
            end: Point::new(1.0, 0.0),
            width: 0.2,
        }
        .is_degenerate());
    }

    #[test]
    fn test_rect_corners_rotated() {
        let corners = Shape::rect_corners(Point::new(0.0, 0.0), 2.0, 4.0, 90.0);
        assert!((corners[0].x - 2.0).abs() < 1e-9);
        assert!((corners[0].y + 1.0).abs() < 1e-9);
    }
}
