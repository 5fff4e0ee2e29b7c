//! Zone layer fragments
//!
//! One filled outline of a zone on one copper layer. The outline is
//! triangulated once and the triangles are kept in their own R-tree, so point
//! and shape queries against concave or holed fills only touch the few
//! triangles near the query instead of the whole polygon.

use crate::geometry::{
    bbox_envelope, triangulate_polygon, BoundingBox, IndexedTriangle, Point, Primitive, Triangle,
};
use rstar::{RTree, AABB};

#[derive(Clone, Debug)]
pub struct ZoneLayerFragment {
    outline_index: usize,
    layer: u8,
    outline: Vec<Point>,
    holes: Vec<Vec<Point>>,
    triangles: RTree<IndexedTriangle>,
    bbox: Option<BoundingBox>,
}

impl ZoneLayerFragment {
    pub fn new(outline_index: usize, layer: u8, outline: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        let triangles: Vec<IndexedTriangle> = triangulate_polygon(&outline, &holes)
            .into_iter()
            .map(|triangle| IndexedTriangle { triangle })
            .collect();
        let bbox = BoundingBox::from_points(&outline);

        Self {
            outline_index,
            layer,
            outline,
            holes,
            triangles: RTree::bulk_load(triangles),
            bbox,
        }
    }

    /// Position of this outline within the zone's fill list
    pub fn outline_index(&self) -> usize {
        self.outline_index
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }

    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    pub fn holes(&self) -> &[Vec<Point>] {
        &self.holes
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.size()
    }

    /// A fill that triangulates to nothing has no copper
    pub fn is_empty(&self) -> bool {
        self.triangles.size() == 0
    }

    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter().map(|t| &t.triangle)
    }

    /// Point lies on the filled copper (edges included)
    pub fn contains_point(&self, p: Point, epsilon: f64) -> bool {
        let query = AABB::from_corners([p.x - epsilon, p.y - epsilon], [p.x + epsilon, p.y + epsilon]);
        self.triangles
            .locate_in_envelope_intersecting(&query)
            .any(|t| t.triangle.contains(p, epsilon))
    }

    /// Any of the primitives touches the filled copper
    pub fn collides(&self, primitives: &[Primitive], epsilon: f64) -> bool {
        primitives.iter().any(|prim| {
            let query = bbox_envelope(&prim.bounding_box().inflate(epsilon));
            self.triangles
                .locate_in_envelope_intersecting(&query)
                .any(|t| prim.collides(&Primitive::Triangle(t.triangle.clone()), epsilon))
        })
    }

    /// Two fills on the same layer overlap or touch
    pub fn collides_fragment(&self, other: &ZoneLayerFragment, epsilon: f64) -> bool {
        if self.layer != other.layer {
            return false;
        }
        // Walk the smaller index, query the larger one
        let (small, large) = if self.triangle_count() <= other.triangle_count() {
            (self, other)
        } else {
            (other, self)
        };
        small.triangles.iter().any(|t| {
            let query = bbox_envelope(&t.triangle.bbox.inflate(epsilon));
            large.triangles.locate_in_envelope_intersecting(&query).any(|u| {
                Primitive::Triangle(t.triangle.clone()).collides(&Primitive::Triangle(u.triangle.clone()), epsilon)
            })
        })
    }

    /// Move the fill; triangles are translated rather than recomputed
    pub fn translate(&mut self, delta: Point) {
        for p in self.outline.iter_mut().chain(self.holes.iter_mut().flatten()) {
            *p = *p + delta;
        }
        let moved: Vec<IndexedTriangle> = self
            .triangles
            .iter()
            .map(|t| IndexedTriangle {
                triangle: Triangle::from_vertices(t.triangle.v0 + delta, t.triangle.v1 + delta, t.triangle.v2 + delta),
            })
            .collect();
        self.triangles = RTree::bulk_load(moved);
        self.bbox = BoundingBox::from_points(&self.outline);
    }
}
