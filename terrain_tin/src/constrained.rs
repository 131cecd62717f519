//! Constrained triangulation with breakline enforcement.
//!
//! Unlike the buffered [`crate::delaunay::SimpleTinBuilder`], this builder
//! edits live [`Triangle`] values held in spatial indexes, because breakline
//! insertion needs to cut existing triangles apart in place. Two indexes
//! serve the two edit operations: vertex insertion searches by circumcircle,
//! breakline insertion searches by triangle extent. Either index is built
//! lazily from the other, and both are kept current while present.
//!
//! Breakline segments are hard constraints: the triangles they cross are
//! replaced by smaller triangles whose edges follow the segment, and no
//! Delaunay repair runs afterwards.

use std::collections::HashMap;

use log::{debug, warn};

use crate::geometry::{
    angle, angle_between, distance, orientation, point_key, BoundingBox, Orientation, Point,
    Point3, Polyline3, Segment3, Triangle,
};
use crate::index::Quadtree;
use crate::mesh::{DoubleMesh, MeshStorage, Precision};
use crate::tin::Tin;

/// Endpoint-to-corner or endpoint-to-edge distances below this count as
/// touching.
const TOUCH_TOLERANCE: f64 = 0.01;

/// Corner index opposite the edge between two distinct corner indices.
fn opposite_corner(i1: usize, i2: usize) -> i32 {
    3 - i1 as i32 - i2 as i32
}

/// Builder for a triangulated surface that honors breaklines.
pub struct ConstrainedTinBuilder {
    bounding_box: BoundingBox,
    seed_bounds: BoundingBox,
    precision: Option<Precision>,
    circumcircle_index: Option<Quadtree<Triangle>>,
    triangle_index: Option<Quadtree<Triangle>>,
    nodes: HashMap<(u64, u64), f64>,
}

impl ConstrainedTinBuilder {
    /// Seed the editing surface with two triangles over the domain rectangle
    /// expanded by 100 on every side, so real data never lands exactly on a
    /// synthetic corner. Seed elevations are zero.
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self::with_precision(bounding_box, None)
    }

    pub fn with_precision(bounding_box: BoundingBox, precision: Option<Precision>) -> Self {
        let expanded = bounding_box.expanded(100.0);
        let snap = |v: f64| match precision {
            Some(p) => p.make_xy_precise(v),
            None => v,
        };
        let min_x = snap(expanded.min_x);
        let min_y = snap(expanded.min_y);
        let max_x = snap(expanded.max_x);
        let max_y = snap(expanded.max_y);
        let seed_bounds = BoundingBox::new(min_x, min_y, max_x, max_y);
        let c1 = Point3::new(min_x, min_y, 0.0);
        let c2 = Point3::new(max_x, min_y, 0.0);
        let c3 = Point3::new(max_x, max_y, 0.0);
        let c4 = Point3::new(min_x, max_y, 0.0);
        let mut builder = Self {
            bounding_box,
            seed_bounds,
            precision,
            circumcircle_index: Some(Quadtree::new(seed_bounds)),
            triangle_index: None,
            nodes: HashMap::new(),
        };
        builder.add_triangle(Triangle::new_clockwise(c1, c2, c3));
        builder.add_triangle(Triangle::new_clockwise(c1, c3, c4));
        builder
    }

    /// Seed from a single triangle instead of a domain rectangle. Useful for
    /// exercising edits against a known starting surface.
    pub fn from_triangle(p0: Point3, p1: Point3, p2: Point3) -> Self {
        let triangle = Triangle::new_clockwise(p0, p1, p2);
        let bounds = triangle.bounding_box();
        let mut builder = Self {
            bounding_box: bounds,
            seed_bounds: bounds,
            precision: None,
            circumcircle_index: Some(Quadtree::new(bounds)),
            triangle_index: None,
            nodes: HashMap::new(),
        };
        builder.add_triangle(triangle);
        builder
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn triangle_count(&self) -> usize {
        if let Some(index) = &self.circumcircle_index {
            index.len()
        } else if let Some(index) = &self.triangle_index {
            index.len()
        } else {
            0
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Snapshot of the current triangles, in index order.
    pub fn triangles(&self) -> Vec<Triangle> {
        if let Some(index) = &self.circumcircle_index {
            index.items()
        } else if let Some(index) = &self.triangle_index {
            index.items()
        } else {
            Vec::new()
        }
    }

    fn add_triangle(&mut self, triangle: Triangle) {
        for corner in 0..3 {
            let p = triangle.corner(corner);
            self.nodes.entry(point_key(p.x, p.y)).or_insert(p.z);
        }
        if let Some(index) = self.circumcircle_index.as_mut() {
            index.insert(triangle.circumcircle_bounding_box(), triangle);
        }
        if let Some(index) = self.triangle_index.as_mut() {
            index.insert(triangle.bounding_box(), triangle);
        }
    }

    fn remove_triangle(&mut self, triangle: &Triangle) -> bool {
        let mut removed = false;
        if let Some(index) = self.triangle_index.as_mut() {
            removed |= index.remove(&triangle.bounding_box(), triangle);
        }
        if let Some(index) = self.circumcircle_index.as_mut() {
            removed |= index.remove(&triangle.circumcircle_bounding_box(), triangle);
        }
        removed
    }

    /// Remove-before-add replacement. When the original is already gone the
    /// replacements are not added, so coverage is never doubled.
    fn replace_triangle(&mut self, triangle: &Triangle, replacements: &[Triangle]) {
        if !self.remove_triangle(triangle) {
            warn!("triangle no longer indexed, replacement skipped");
            return;
        }
        for replacement in replacements {
            self.add_triangle(*replacement);
        }
    }

    fn ensure_circumcircle_index(&mut self) {
        if self.circumcircle_index.is_none() {
            let mut index = Quadtree::new(self.seed_bounds);
            if let Some(triangles) = self.triangle_index.as_ref() {
                triangles.for_each(|triangle| {
                    index.insert(triangle.circumcircle_bounding_box(), *triangle);
                });
            }
            self.circumcircle_index = Some(index);
        }
    }

    fn ensure_triangle_index(&mut self) {
        if self.triangle_index.is_none() {
            let mut index = Quadtree::new(self.seed_bounds);
            if let Some(triangles) = self.circumcircle_index.as_ref() {
                triangles.for_each(|triangle| {
                    index.insert(triangle.bounding_box(), *triangle);
                });
            }
            self.triangle_index = Some(index);
        }
    }

    /// Insert a shared vertex. Positions outside the domain are ignored; a
    /// position already present never re-triangulates, but may supply a
    /// previously unknown elevation.
    pub fn insert_vertex(&mut self, point: Point3) {
        if !self.bounding_box.covers(point.x, point.y) {
            debug!("vertex ({}, {}) outside domain, dropped", point.x, point.y);
            return;
        }
        let point = match self.precision {
            Some(p) => Point3::new(
                p.make_xy_precise(point.x),
                p.make_xy_precise(point.y),
                p.make_z_precise(point.z),
            ),
            None => point,
        };
        let key = point_key(point.x, point.y);
        if let Some(z) = self.nodes.get_mut(&key) {
            if z.is_nan() && !point.z.is_nan() {
                *z = point.z;
            }
            return;
        }

        self.ensure_circumcircle_index();
        let mut cavity = match self.circumcircle_index.as_ref() {
            Some(index) => index.query_filtered(
                &BoundingBox::from_point(point.x, point.y),
                |triangle| triangle.circumcircle_contains(point.x, point.y),
            ),
            None => Vec::new(),
        };
        if cavity.is_empty() {
            // Numerical fallback: take the triangle that contains the point.
            cavity = self.triangles_containing(point.xy());
            if cavity.is_empty() {
                warn!(
                    "no triangle found for vertex ({}, {}), dropped",
                    point.x, point.y
                );
                return;
            }
            debug!(
                "circumcircle search missed ({}, {}), using containing triangle",
                point.x, point.y
            );
        }

        let mut corners: Vec<Point3> = Vec::new();
        for triangle in &cavity {
            self.remove_triangle(triangle);
            for corner in 0..3 {
                let c = triangle.corner(corner);
                if !c.coincident(&point)
                    && !corners.iter().any(|existing| existing.coincident(&c))
                {
                    corners.push(c);
                }
            }
        }
        // Clockwise fan around the new vertex: descending direction angle.
        corners.sort_by(|a, b| {
            let angle_a = angle(point.xy(), a.xy());
            let angle_b = angle(point.xy(), b.xy());
            angle_b
                .partial_cmp(&angle_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(&last) = corners.last() {
            let mut previous = last;
            for &corner in &corners {
                self.add_triangle(Triangle::new_clockwise(point, previous, corner));
                previous = corner;
            }
        }
    }

    /// A degenerate circumcircle indexes under a NaN box no search box can
    /// reach, so the fallback scans every triangle. One hit anchors the fan.
    fn triangles_containing(&self, p: Point) -> Vec<Triangle> {
        let Some(index) = self.circumcircle_index.as_ref() else {
            return Vec::new();
        };
        let mut hit = None;
        index.for_each(|triangle| {
            if hit.is_none() && triangle.contains(p) {
                hit = Some(*triangle);
            }
        });
        hit.into_iter().collect()
    }

    /// Insert every segment of a breakline.
    pub fn insert_breakline(&mut self, line: &Polyline3) {
        for segment in line.segments() {
            self.insert_breakline_segment(segment);
        }
    }

    /// Enforce one breakline segment: every triangle it crosses is replaced
    /// by triangles whose edges follow the segment. Endpoint elevations come
    /// from the breakline, interpolated along its length.
    pub fn insert_breakline_segment(&mut self, breakline: Segment3) {
        let Some(breakline) = breakline.clipped_to(&self.bounding_box) else {
            debug!("breakline segment outside domain, dropped");
            return;
        };
        self.ensure_triangle_index();
        let candidates = match self.triangle_index.as_ref() {
            Some(index) => index.query(&breakline.bounding_box()),
            None => Vec::new(),
        };
        for triangle in candidates {
            if let Some(intersection) = triangle.intersection(&breakline) {
                if intersection.length() < TOUCH_TOLERANCE {
                    self.split_at_point(&triangle, intersection.start);
                } else {
                    self.split_along_segment(&triangle, &breakline, &intersection);
                }
            }
        }
    }

    /// The breakline grazes the triangle at a single position: when that
    /// position sits exactly on an edge (and is not an existing corner) the
    /// triangle is split in two towards the opposite corner.
    fn split_at_point(&mut self, triangle: &Triangle, point: Point3) {
        for i in 0..3 {
            let edge_start = triangle.corner(i);
            let edge_end = triangle.corner(i + 1);
            if edge_start.coincident(&point) || edge_end.coincident(&point) {
                continue;
            }
            let edge = Segment3::new(edge_start, edge_end);
            if edge.distance_to_point(point.xy()) == 0.0 {
                let opposite = triangle.corner(i + 2);
                self.replace_triangle(
                    triangle,
                    &[
                        Triangle::new_clockwise(point, edge_end, opposite),
                        Triangle::new_clockwise(point, opposite, edge_start),
                    ],
                );
                return;
            }
        }
    }

    fn split_along_segment(
        &mut self,
        triangle: &Triangle,
        breakline: &Segment3,
        intersection: &Segment3,
    ) {
        let snap_z = |z: f64| match self.precision {
            Some(p) => p.make_z_precise(z),
            None => z,
        };
        let z0 = snap_z(breakline.elevation_at(intersection.start.xy()));
        let z1 = snap_z(breakline.elevation_at(intersection.end.xy()));
        let lc0 = Point3::new(intersection.start.x, intersection.start.y, z0);
        let lc1 = Point3::new(intersection.end.x, intersection.end.y, z1);

        let mut start_corner_distance = f64::MAX;
        let mut end_corner_distance = f64::MAX;
        let mut start_edge_distance = f64::MAX;
        let mut end_edge_distance = f64::MAX;
        let mut start_closest_corner = 0;
        let mut end_closest_corner = 0;
        let mut start_closest_edge = 0;
        let mut end_closest_edge = 0;
        for i in 0..3 {
            let corner = triangle.corner(i as i32);
            let edge = triangle.edge(i as i32);

            let d = distance(corner.xy(), lc0.xy());
            if d < start_corner_distance {
                start_closest_corner = i;
                start_corner_distance = d;
            }
            let d = distance(corner.xy(), lc1.xy());
            if d < end_corner_distance {
                end_closest_corner = i;
                end_corner_distance = d;
            }
            let d = edge.distance_to_point(lc0.xy());
            if d < start_edge_distance {
                start_closest_edge = i;
                start_edge_distance = d;
            }
            let d = edge.distance_to_point(lc1.xy());
            if d < end_edge_distance {
                end_closest_edge = i;
                end_edge_distance = d;
            }
        }

        if start_corner_distance < TOUCH_TOLERANCE {
            if end_corner_distance < TOUCH_TOLERANCE {
                // Both endpoints on corners: the segment is an existing edge,
                // only the elevations change.
                let other =
                    triangle.corner(opposite_corner(start_closest_corner, end_closest_corner));
                self.replace_triangle(triangle, &[Triangle::new_clockwise(lc0, lc1, other)]);
            } else {
                self.split_from_corner(
                    triangle,
                    lc0,
                    lc1,
                    start_closest_corner,
                    end_closest_edge,
                    end_edge_distance,
                );
            }
        } else if end_corner_distance < TOUCH_TOLERANCE {
            self.split_from_corner(
                triangle,
                lc1,
                lc0,
                end_closest_corner,
                start_closest_edge,
                start_edge_distance,
            );
        } else if start_edge_distance < TOUCH_TOLERANCE {
            if end_edge_distance < TOUCH_TOLERANCE {
                self.split_two_edges(triangle, lc0, lc1, start_closest_edge, end_closest_edge);
            } else {
                self.split_one_edge(triangle, lc0, lc1, start_closest_edge);
            }
        } else if end_edge_distance < TOUCH_TOLERANCE {
            self.split_one_edge(triangle, lc1, lc0, end_closest_edge);
        } else if start_corner_distance <= end_corner_distance {
            self.split_contained(triangle, start_closest_corner, lc0, lc1);
        } else {
            self.split_contained(triangle, end_closest_corner, lc1, lc0);
        }
    }

    /// One endpoint on a corner. A far endpoint lying close to an edge splits
    /// corner-to-edge into 2 triangles; a truly interior far endpoint fans
    /// into 3.
    fn split_from_corner(
        &mut self,
        triangle: &Triangle,
        lc0: Point3,
        lc1: Point3,
        start_corner: usize,
        end_edge: usize,
        end_edge_distance: f64,
    ) {
        if end_edge_distance < 1.0 {
            self.split_corner_edge(triangle, lc0, lc1, start_corner, end_edge);
        } else {
            self.split_corner_interior(triangle, start_corner, lc0, lc1);
        }
    }

    fn split_corner_edge(
        &mut self,
        triangle: &Triangle,
        lc0: Point3,
        lc1: Point3,
        start_corner: usize,
        end_edge: usize,
    ) {
        let c_next = triangle.corner(start_corner as i32 + 1);
        let c_previous = triangle.corner(start_corner as i32 + 2);
        if end_edge == start_corner {
            self.split_corner_edge_pair(triangle, lc0, lc1, c_next, c_previous);
        } else if end_edge == (start_corner + 1) % 3 {
            self.split_corner_edge_pair(triangle, c_previous, lc1, c_next, lc0);
        } else {
            self.split_corner_edge_pair(triangle, lc0, lc1, c_previous, c_next);
        }
    }

    fn split_corner_edge_pair(
        &mut self,
        triangle: &Triangle,
        c_previous: Point3,
        c: Point3,
        c_next: Point3,
        c_opposite: Point3,
    ) {
        self.replace_triangle(
            triangle,
            &[
                Triangle::new_clockwise(c_previous, c, c_opposite),
                Triangle::new_clockwise(c, c_next, c_opposite),
            ],
        );
    }

    fn split_corner_interior(
        &mut self,
        triangle: &Triangle,
        corner_index: usize,
        c_corner: Point3,
        c_inside: Point3,
    ) {
        let c_next = triangle.corner(corner_index as i32 + 1);
        let c_previous = triangle.corner(corner_index as i32 + 2);
        self.replace_triangle(
            triangle,
            &[
                Triangle::new_clockwise(c_corner, c_next, c_inside),
                Triangle::new_clockwise(c_inside, c_next, c_previous),
                Triangle::new_clockwise(c_inside, c_previous, c_corner),
            ],
        );
    }

    /// One endpoint on an edge, the other interior: 4 triangles, with a
    /// dedicated arrangement when the segment runs along the edge direction.
    fn split_one_edge(&mut self, triangle: &Triangle, lc0: Point3, lc1: Point3, edge_index: usize) {
        let c_previous = triangle.corner(edge_index as i32);
        let c_next = triangle.corner(edge_index as i32 + 1);
        let c_opposite = triangle.corner(edge_index as i32 + 2);
        if orientation(c_previous.xy(), lc0.xy(), lc1.xy()) == Orientation::Collinear {
            self.replace_triangle(
                triangle,
                &[
                    Triangle::new_clockwise(c_previous, lc0, c_opposite),
                    Triangle::new_clockwise(c_opposite, lc0, lc1),
                    Triangle::new_clockwise(c_opposite, lc1, c_next),
                    Triangle::new_clockwise(lc0, lc1, c_next),
                ],
            );
        } else {
            self.replace_triangle(
                triangle,
                &[
                    Triangle::new_clockwise(c_previous, lc0, lc1),
                    Triangle::new_clockwise(c_next, lc0, lc1),
                    Triangle::new_clockwise(c_next, lc1, c_opposite),
                    Triangle::new_clockwise(c_previous, lc1, c_opposite),
                ],
            );
        }
    }

    /// Both endpoints on edges: 3 triangles, arranged by whether the edges
    /// are the same, adjacent, or separated.
    fn split_two_edges(
        &mut self,
        triangle: &Triangle,
        lc0: Point3,
        lc1: Point3,
        start_edge: usize,
        end_edge: usize,
    ) {
        let c_previous = triangle.corner(start_edge as i32);
        let c_next = triangle.corner(start_edge as i32 + 1);
        let c_opposite = triangle.corner(start_edge as i32 + 2);
        if start_edge == end_edge {
            let closer_to_start = distance(c_previous.xy(), lc0.xy())
                < distance(c_previous.xy(), lc1.xy());
            if closer_to_start {
                self.replace_triangle(
                    triangle,
                    &[
                        Triangle::new_clockwise(c_previous, lc0, c_opposite),
                        Triangle::new_clockwise(lc0, lc1, c_opposite),
                        Triangle::new_clockwise(lc1, c_next, c_opposite),
                    ],
                );
            } else {
                self.replace_triangle(
                    triangle,
                    &[
                        Triangle::new_clockwise(c_previous, lc1, c_opposite),
                        Triangle::new_clockwise(lc0, lc1, c_opposite),
                        Triangle::new_clockwise(lc0, c_next, c_opposite),
                    ],
                );
            }
        } else if end_edge == (start_edge + 1) % 3 {
            self.replace_triangle(
                triangle,
                &[
                    Triangle::new_clockwise(c_previous, lc0, c_opposite),
                    Triangle::new_clockwise(lc0, lc1, c_opposite),
                    Triangle::new_clockwise(lc0, c_next, lc1),
                ],
            );
        } else {
            self.replace_triangle(
                triangle,
                &[
                    Triangle::new_clockwise(c_previous, lc0, lc1),
                    Triangle::new_clockwise(lc0, c_next, lc1),
                    Triangle::new_clockwise(lc1, c_next, c_opposite),
                ],
            );
        }
    }

    /// The segment lies strictly inside the triangle: 5 triangles. The
    /// rotation of the corner labels is chosen so the quadrilateral on each
    /// side of the segment is convex, by comparing the angles the segment
    /// and the corners make at the near endpoint.
    fn split_contained(&mut self, triangle: &Triangle, index: usize, l0: Point3, l1: Point3) {
        let t0 = triangle.corner(index as i32);
        let t1 = triangle.corner(index as i32 + 1);
        let t2 = triangle.corner(index as i32 + 2);

        match orientation(t0.xy(), l0.xy(), l1.xy()) {
            Orientation::Collinear => {
                self.split_contained_fan(triangle, t0, t1, t2, l0, l1);
            }
            Orientation::Clockwise => {
                let angle_line = angle_between(t0.xy(), l0.xy(), l1.xy());
                let angle_corner = angle_between(t0.xy(), l0.xy(), t2.xy());
                if angle_line > angle_corner {
                    self.split_contained_fan(triangle, t0, t1, t2, l0, l1);
                } else if angle_line == angle_corner {
                    self.split_contained_fan(triangle, t2, t0, t1, l1, l0);
                } else {
                    self.split_contained_fan(triangle, t1, t2, t0, l0, l1);
                }
            }
            Orientation::CounterClockwise => {
                let angle_line = angle_between(t0.xy(), l0.xy(), l1.xy());
                let angle_corner = angle_between(t0.xy(), l0.xy(), t1.xy());
                if angle_line > angle_corner {
                    self.split_contained_fan(triangle, t0, t1, t2, l0, l1);
                } else if angle_line == angle_corner {
                    self.split_contained_fan(triangle, t1, t2, t0, l1, l0);
                } else {
                    self.split_contained_fan(triangle, t2, t0, t1, l1, l0);
                }
            }
        }
    }

    fn split_contained_fan(
        &mut self,
        triangle: &Triangle,
        t0: Point3,
        t1: Point3,
        t2: Point3,
        l0: Point3,
        l1: Point3,
    ) {
        self.replace_triangle(
            triangle,
            &[
                Triangle::new_clockwise(t0, t1, l0),
                Triangle::new_clockwise(l0, t1, l1),
                Triangle::new_clockwise(l1, t1, t2),
                Triangle::new_clockwise(l0, l1, t2),
                Triangle::new_clockwise(t0, l0, t2),
            ],
        );
    }

    /// Compact the live triangles into flat storage and freeze the surface.
    /// The circumcircle index is discarded; only triangle extents survive
    /// into the [`Tin`].
    pub fn finish(self) -> Tin {
        let triangles = self.triangles();
        let mut mesh = DoubleMesh::new();
        let mut vertex_ids: HashMap<(u64, u64), usize> = HashMap::new();
        for triangle in &triangles {
            let mut ids = [0usize; 3];
            for corner in 0..3 {
                let p = triangle.corner(corner as i32);
                let id = *vertex_ids
                    .entry(point_key(p.x, p.y))
                    .or_insert_with(|| mesh.add_vertex(p.x, p.y, p.z));
                ids[corner] = id;
            }
            mesh.add_triangle(ids[0], ids[1], ids[2]);
        }
        Tin::new(self.seed_bounds, MeshStorage::Double(mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn domain_seeds_two_expanded_triangles() {
        init_logger();
        let builder = ConstrainedTinBuilder::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(builder.triangle_count(), 2);
        assert_eq!(builder.node_count(), 4);
        let triangles: Vec<_> = builder.triangles();
        // Seed rectangle is grown by 100 on each side.
        let bounds = triangles
            .iter()
            .map(|t| t.bounding_box())
            .reduce(|a, b| {
                BoundingBox::new(
                    a.min_x.min(b.min_x),
                    a.min_y.min(b.min_y),
                    a.max_x.max(b.max_x),
                    a.max_y.max(b.max_y),
                )
            })
            .unwrap();
        assert_eq!(bounds, BoundingBox::new(-100.0, -100.0, 110.0, 110.0));
    }

    #[test]
    fn vertex_insertion_retriangulates_cavity() {
        init_logger();
        let mut builder = ConstrainedTinBuilder::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        builder.insert_vertex(Point3::new(5.0, 5.0, 2.0));
        assert_eq!(builder.triangle_count(), 4);
        assert_eq!(builder.node_count(), 5);
        // Re-inserting the same position changes nothing.
        builder.insert_vertex(Point3::new(5.0, 5.0, 9.0));
        assert_eq!(builder.triangle_count(), 4);
        assert_eq!(builder.node_count(), 5);
    }

    #[test]
    fn vertex_insertion_survives_degenerate_circumcircle() {
        init_logger();
        // Collinear seed corners leave no usable circumcircle, so insertion
        // has to locate the triangle by containment instead.
        let mut builder = ConstrainedTinBuilder::from_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(20.0, 0.0, 0.0),
        );
        assert!(builder.triangles()[0].circumcircle().radius.is_nan());
        builder.insert_vertex(Point3::new(5.0, 0.0, 2.0));
        assert_eq!(builder.node_count(), 4);
        assert_eq!(builder.triangle_count(), 3);
    }

    #[test]
    fn outside_vertex_is_ignored() {
        init_logger();
        let mut builder = ConstrainedTinBuilder::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        // Inside the expanded seed rectangle but outside the domain.
        builder.insert_vertex(Point3::new(50.0, 5.0, 2.0));
        assert_eq!(builder.triangle_count(), 2);
    }

    #[test]
    fn from_triangle_seeds_one() {
        init_logger();
        let builder = ConstrainedTinBuilder::from_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
            Point3::new(0.0, 100.0, 0.0),
        );
        assert_eq!(builder.triangle_count(), 1);
        assert_eq!(builder.node_count(), 3);
    }

    #[test]
    fn finish_compacts_shared_vertices() {
        init_logger();
        let mut builder = ConstrainedTinBuilder::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        builder.insert_vertex(Point3::new(5.0, 5.0, 2.0));
        let tin = builder.finish();
        assert_eq!(tin.triangle_count(), 4);
        // 4 seed corners plus the inserted vertex, each stored once.
        assert_eq!(tin.vertex_count(), 5);
        assert_eq!(tin.elevation_at(5.0, 5.0), 2.0);
    }
}
