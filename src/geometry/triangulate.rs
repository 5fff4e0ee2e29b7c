//! Polygon triangulation using the earcut algorithm
//!
//! Zone fills and custom pad outlines are arbitrary (possibly concave,
//! possibly holed) polygons. Triangulating them once lets every later
//! containment or collision query work on convex pieces.

use super::distance::Triangle;
use super::types::{polygon_area, Point};
use tracing::warn;

/// Triangulate an outer ring with optional holes
/// Degenerate triangles (zero area) are dropped
pub fn triangulate_polygon(outline: &[Point], holes: &[Vec<Point>]) -> Vec<Triangle> {
    let outer = strip_closing_point(outline);
    if outer.len() < 3 {
        return vec![];
    }

    // Build flat coordinate array for earcut
    let mut flat_coords: Vec<f64> = Vec::with_capacity(outer.len() * 2);
    let mut hole_indices: Vec<usize> = Vec::new();

    for p in outer {
        flat_coords.push(p.x);
        flat_coords.push(p.y);
    }

    for hole in holes {
        let hole = strip_closing_point(hole);
        if hole.len() < 3 {
            continue; // Skip degenerate holes
        }
        hole_indices.push(flat_coords.len() / 2);
        for p in hole {
            flat_coords.push(p.x);
            flat_coords.push(p.y);
        }
    }

    let indices = earcutr::earcut(&flat_coords, &hole_indices, 2).unwrap_or_default();
    if indices.is_empty() {
        warn!("Polygon triangulation produced no triangles ({} vertices)", flat_coords.len() / 2);
        return vec![];
    }

    let vertex = |i: usize| Point::new(flat_coords[i * 2], flat_coords[i * 2 + 1]);

    indices
        .chunks(3)
        .filter(|chunk| chunk.len() == 3)
        .map(|chunk| Triangle::from_vertices(vertex(chunk[0]), vertex(chunk[1]), vertex(chunk[2])))
        .filter(|tri| polygon_area(&tri.vertices()).abs() > 1e-18)
        .collect()
}

/// Rings may repeat the first vertex at the end; earcut does not want it
fn strip_closing_point(ring: &[Point]) -> &[Point] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_area(tris: &[Triangle]) -> f64 {
        tris.iter().map(|t| polygon_area(&t.vertices()).abs()).sum()
    }

    #[test]
    fn test_square_with_hole() {
        let outline = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let hole = vec![
            Point::new(4.0, 4.0),
            Point::new(6.0, 4.0),
            Point::new(6.0, 6.0),
            Point::new(4.0, 6.0),
        ];
        let tris = triangulate_polygon(&outline, &[hole]);
        assert!((total_area(&tris) - 96.0).abs() < 1e-6);
    }

    #[test]
    fn test_closed_ring_is_accepted() {
        let outline = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
            Point::new(0.0, 0.0),
        ];
        let tris = triangulate_polygon(&outline, &[]);
        assert_eq!(tris.len(), 1);
    }

    #[test]
    fn test_too_few_points() {
        assert!(triangulate_polygon(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)], &[]).is_empty());
    }
}
