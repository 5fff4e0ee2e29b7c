//! Distance calculation algorithms for collision testing
//!
//! Contains triangle, segment, and point distance calculations.

use super::types::{BoundingBox, Point};

/// Triangle with precomputed AABB for fast rejection
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub v0: Point,
    pub v1: Point,
    pub v2: Point,
    pub bbox: BoundingBox,
}

impl Triangle {
    pub fn from_vertices(v0: Point, v1: Point, v2: Point) -> Self {
        Self {
            v0,
            v1,
            v2,
            bbox: BoundingBox::new(
                v0.x.min(v1.x).min(v2.x),
                v0.y.min(v1.y).min(v2.y),
                v0.x.max(v1.x).max(v2.x),
                v0.y.max(v1.y).max(v2.y),
            ),
        }
    }

    pub fn edges(&self) -> [(Point, Point); 3] {
        [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)]
    }

    pub fn vertices(&self) -> [Point; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Fast AABB-to-AABB distance (lower bound)
    pub fn aabb_distance(&self, other: &Triangle) -> f64 {
        let dx = (self.bbox.min_x.max(other.bbox.min_x) - self.bbox.max_x.min(other.bbox.max_x)).max(0.0);
        let dy = (self.bbox.min_y.max(other.bbox.min_y) - self.bbox.max_y.min(other.bbox.max_y)).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// Inclusive containment: points on an edge are inside
    pub fn contains(&self, p: Point, epsilon: f64) -> bool {
        if !self.bbox.inflate(epsilon).contains_point(p) {
            return false;
        }
        if point_in_triangle(p, self.v0, self.v1, self.v2) {
            return true;
        }
        // Snap near-boundary points
        self.edges()
            .iter()
            .any(|&(a, b)| point_segment_distance(p, a, b).0 <= epsilon)
    }
}

/// Minimum distance between two triangles, zero when they overlap
pub fn triangle_distance(a: &Triangle, b: &Triangle) -> f64 {
    if a.vertices().iter().any(|&v| point_in_triangle(v, b.v0, b.v1, b.v2))
        || b.vertices().iter().any(|&v| point_in_triangle(v, a.v0, a.v1, a.v2))
    {
        return 0.0;
    }

    let mut min_dist = f64::MAX;
    // Edge-edge distances (9 combinations)
    for (a1, a2) in a.edges() {
        for (b1, b2) in b.edges() {
            let (d, _) = segment_distance(a1, a2, b1, b2);
            min_dist = min_dist.min(d);
        }
    }
    min_dist
}

/// Segment-to-segment minimum distance
pub fn segment_distance(a1: Point, a2: Point, b1: Point, b2: Point) -> (f64, Point) {
    if let Some(p) = segment_intersection(a1, a2, b1, b2) {
        return (0.0, p);
    }

    let mut min_d = f64::MAX;
    let mut closest = a1;

    for (p, s1, s2) in [(a1, b1, b2), (a2, b1, b2), (b1, a1, a2), (b2, a1, a2)] {
        let (d, c) = point_segment_distance(p, s1, s2);
        if d < min_d {
            min_d = d;
            closest = midpoint(p, c);
        }
    }

    (min_d, closest)
}

/// Intersection point of two proper or touching segments
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom.abs() < 1e-12 {
        // Parallel or collinear: overlapping collinear segments are caught by
        // the endpoint distances in segment_distance
        return None;
    }
    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(a1.x + t * r.x, a1.y + t * r.y))
    } else {
        None
    }
}

/// Point-to-segment minimum distance
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> (f64, Point) {
    let ab = b - a;
    let ap = p - a;
    let ab_len2 = ab.length_squared();

    if ab_len2 < 1e-20 {
        // Degenerate segment
        return (p.distance(a), a);
    }

    let t = (ap.dot(ab) / ab_len2).clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * ab.x, a.y + t * ab.y);
    (p.distance(closest), closest)
}

/// Check if a point is inside a triangle using barycentric coordinates
pub fn point_in_triangle(p: Point, v0: Point, v1: Point, v2: Point) -> bool {
    let area = 0.5 * (-v1.y * v2.x + v0.y * (-v1.x + v2.x) + v0.x * (v1.y - v2.y) + v1.x * v2.y);
    if area.abs() < 1e-20 {
        return false; // Degenerate triangle
    }
    let s = (v0.y * v2.x - v0.x * v2.y + (v2.y - v0.y) * p.x + (v0.x - v2.x) * p.y) / (2.0 * area);
    let t = (v0.x * v1.y - v0.y * v1.x + (v0.y - v1.y) * p.x + (v1.x - v0.x) * p.y) / (2.0 * area);
    s >= 0.0 && t >= 0.0 && (s + t) <= 1.0
}

/// Midpoint of two points
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_aabb_distance() {
        let t1 = Triangle::from_vertices(Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.5, 1.0));
        let t2 = Triangle::from_vertices(Point::new(2.0, 0.0), Point::new(3.0, 0.0), Point::new(2.5, 1.0));

        // Triangles are separated by 1 unit in X
        let dist = t1.aabb_distance(&t2);
        assert!((dist - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_point_segment_distance() {
        let (d, _) = point_segment_distance(Point::new(0.0, 1.0), Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        assert!((d - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_crossing_segments_have_zero_distance() {
        let (d, p) = segment_distance(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        );
        assert_eq!(d, 0.0);
        assert!((p.x - 1.0).abs() < 1e-9 && (p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangles_sharing_edge_touch() {
        let a = Triangle::from_vertices(Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0));
        let b = Triangle::from_vertices(Point::new(10.0, 0.0), Point::new(20.0, 0.0), Point::new(10.0, 10.0));
        assert!(triangle_distance(&a, &b) < 1e-9);
    }

    #[test]
    fn test_triangle_contains_edge_point() {
        let t = Triangle::from_vertices(Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0));
        assert!(t.contains(Point::new(2.0, 0.0), 1e-9));
        assert!(t.contains(Point::new(1.0, 1.0), 1e-9));
        assert!(!t.contains(Point::new(3.0, 3.0), 1e-9));
    }
}
