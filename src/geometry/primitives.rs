//! Collision primitives
//!
//! Every feature shape is decomposed into round-capped segments (capsules)
//! and triangles. Exact contact tests only ever compare these two kinds.

use super::distance::{point_segment_distance, segment_distance, Triangle};
use super::triangulate::triangulate_polygon;
use super::types::{BoundingBox, Point, Shape};
use std::f64::consts::{PI, TAU};

/// One convex piece of copper
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Segment `a`-`b` swept by a disc; a circle when `a == b`
    Capsule { a: Point, b: Point, radius: f64 },
    Triangle(Triangle),
}

impl Primitive {
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Primitive::Capsule { a, b, radius } => BoundingBox::new(a.x, a.y, b.x, b.y).inflate(*radius),
            Primitive::Triangle(tri) => tri.bbox,
        }
    }

    /// Inclusive point hit test
    pub fn contains(&self, p: Point, epsilon: f64) -> bool {
        match self {
            Primitive::Capsule { a, b, radius } => point_segment_distance(p, *a, *b).0 <= radius + epsilon,
            Primitive::Triangle(tri) => tri.contains(p, epsilon),
        }
    }

    /// True when the two primitives touch or overlap
    pub fn collides(&self, other: &Primitive, epsilon: f64) -> bool {
        if !self.bounding_box().inflate(epsilon).intersects(&other.bounding_box()) {
            return false;
        }
        match (self, other) {
            (
                Primitive::Capsule { a: a1, b: b1, radius: r1 },
                Primitive::Capsule { a: a2, b: b2, radius: r2 },
            ) => segment_distance(*a1, *b1, *a2, *b2).0 <= r1 + r2 + epsilon,
            (Primitive::Capsule { a, b, radius }, Primitive::Triangle(tri))
            | (Primitive::Triangle(tri), Primitive::Capsule { a, b, radius }) => {
                capsule_triangle_distance(*a, *b, tri) <= radius + epsilon
            }
            (Primitive::Triangle(t1), Primitive::Triangle(t2)) => {
                t1.aabb_distance(t2) <= epsilon && super::distance::triangle_distance(t1, t2) <= epsilon
            }
        }
    }
}

fn capsule_triangle_distance(a: Point, b: Point, tri: &Triangle) -> f64 {
    if tri.contains(a, 0.0) || tri.contains(b, 0.0) {
        return 0.0;
    }
    tri.edges()
        .iter()
        .map(|&(e1, e2)| segment_distance(a, b, e1, e2).0)
        .fold(f64::MAX, f64::min)
}

/// Split a shape into capsules and triangles
pub fn decompose(shape: &Shape, arc_tolerance: f64) -> Vec<Primitive> {
    match shape {
        Shape::Circle { center, radius } => vec![Primitive::Capsule {
            a: *center,
            b: *center,
            radius: *radius,
        }],
        Shape::Segment { start, end, width } => vec![Primitive::Capsule {
            a: *start,
            b: *end,
            radius: width / 2.0,
        }],
        Shape::Arc { start, mid, end, width } => flatten_arc(*start, *mid, *end, arc_tolerance)
            .windows(2)
            .map(|w| Primitive::Capsule {
                a: w[0],
                b: w[1],
                radius: width / 2.0,
            })
            .collect(),
        Shape::Rect { center, width, height, rotation } => {
            let [c0, c1, c2, c3] = Shape::rect_corners(*center, *width, *height, *rotation);
            vec![
                Primitive::Triangle(Triangle::from_vertices(c0, c1, c2)),
                Primitive::Triangle(Triangle::from_vertices(c0, c2, c3)),
            ]
        }
        Shape::Polygon { outline, holes } => triangulate_polygon(outline, holes)
            .into_iter()
            .map(Primitive::Triangle)
            .collect(),
    }
}

/// Bounding box of a shape, `None` when it has no extent at all
pub fn shape_bounding_box(shape: &Shape, arc_tolerance: f64) -> Option<BoundingBox> {
    match shape {
        Shape::Circle { center, radius } => Some(BoundingBox::new(center.x, center.y, center.x, center.y).inflate(*radius)),
        Shape::Segment { start, end, width } => BoundingBox::from_points(&[*start, *end]).map(|b| b.inflate(width / 2.0)),
        Shape::Arc { start, mid, end, width } => {
            BoundingBox::from_points(&flatten_arc(*start, *mid, *end, arc_tolerance)).map(|b| b.inflate(width / 2.0))
        }
        Shape::Rect { center, width, height, rotation } => {
            BoundingBox::from_points(&Shape::rect_corners(*center, *width, *height, *rotation))
        }
        Shape::Polygon { outline, .. } => BoundingBox::from_points(outline),
    }
}

/// Any primitive of `a` touches any primitive of `b`
pub fn primitives_collide(a: &[Primitive], b: &[Primitive], epsilon: f64) -> bool {
    a.iter().any(|pa| b.iter().any(|pb| pa.collides(pb, epsilon)))
}

/// Approximate a three-point arc by a polyline whose chord error stays within `tolerance`
///
/// The first and last points are exactly `start` and `end` so that arc
/// endpoints stay coincident with the anchors of neighbouring tracks.
pub fn flatten_arc(start: Point, mid: Point, end: Point, tolerance: f64) -> Vec<Point> {
    let center = match circumcenter(start, mid, end) {
        Some(c) => c,
        None => return vec![start, end], // Collinear: straight segment
    };
    let radius = center.distance(start);

    let angle_of = |p: Point| (p.y - center.y).atan2(p.x - center.x);
    let normalize = |a: f64| {
        let r = a % TAU;
        if r < 0.0 {
            r + TAU
        } else {
            r
        }
    };

    let a0 = angle_of(start);
    let mut sweep = normalize(angle_of(end) - a0);
    let mid_sweep = normalize(angle_of(mid) - a0);
    if mid_sweep > sweep {
        // Mid point lies on the clockwise side
        sweep -= TAU;
    }
    if start == end {
        // Full circle through `mid`
        sweep = TAU;
    }

    let max_step = if tolerance > 0.0 && tolerance < radius {
        2.0 * (1.0 - tolerance / radius).acos()
    } else {
        PI / 2.0
    };
    let segments = ((sweep.abs() / max_step).ceil() as usize).max(2);

    let mut points = Vec::with_capacity(segments + 1);
    points.push(start);
    for i in 1..segments {
        let angle = a0 + sweep * (i as f64 / segments as f64);
        points.push(Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin()));
    }
    points.push(end);
    points
}

/// Centre of the circle through three points, `None` if they are collinear
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    Some(Point::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    ))
}
