//! Incremental Delaunay triangulation over compact mesh storage.
//!
//! Vertices are buffered until [`SimpleTinBuilder::finish`], then inserted in
//! a power-of-ten striding order: every 10^k-th vertex first, then every
//! 10^(k-1)-th, down to all of them. Scattered early insertions keep the
//! triangles fat, which keeps circumcircles small and the cavity searches
//! cheap on the bulk of the points.

use std::collections::HashMap;

use log::{debug, warn};

use crate::geometry::{
    angle, orientation, point_key, BoundingBox, Circumcircle, Orientation, Point, Point3, Triangle,
};
use crate::index::Quadtree;
use crate::mesh::{MeshStorage, Precision, TriangleHandle};
use crate::tin::Tin;

/// Builder for an unconstrained Delaunay surface over a fixed domain.
///
/// Vertices outside the domain are dropped (logged at debug level). The
/// builder is one-way: `finish` consumes it and returns the immutable
/// [`Tin`].
pub struct SimpleTinBuilder {
    bounding_box: BoundingBox,
    precision: Option<Precision>,
    vertices: Vec<Point3>,
}

impl SimpleTinBuilder {
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            precision: None,
            vertices: Vec::new(),
        }
    }

    /// Store ordinates as scaled integers instead of doubles.
    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = Some(precision);
    }

    /// Buffer a vertex for insertion at finish time.
    pub fn insert_vertex(&mut self, x: f64, y: f64, z: f64) {
        if !self.bounding_box.covers(x, y) {
            debug!("vertex ({x}, {y}) outside domain, dropped");
            return;
        }
        self.vertices.push(Point3::new(x, y, z));
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Triangulate the buffered vertices and freeze the surface.
    pub fn finish(self) -> Tin {
        let mut state = Triangulation::new(self.bounding_box, self.precision);

        let n = self.vertices.len();
        let mut inserted = vec![false; n];
        if n > 0 {
            let mut step = 10_usize.pow((n as f64).log10().floor() as u32);
            loop {
                let mut i = 0;
                while i < n {
                    if !inserted[i] {
                        let v = self.vertices[i];
                        state.insert(v);
                        inserted[i] = true;
                    }
                    i += step;
                }
                if step == 1 {
                    break;
                }
                step /= 10;
            }
        }
        state.finish()
    }
}

/// Editing-time state: the mesh under construction, per-slot circumcircles
/// and the circumcircle-keyed index. All of it except the mesh is discarded
/// at finish.
struct Triangulation {
    bounding_box: BoundingBox,
    mesh: MeshStorage,
    circumcircles: Vec<Circumcircle>,
    free_slots: Vec<usize>,
    circumcircle_index: Quadtree<usize>,
    nodes: HashMap<(u64, u64), usize>,
}

impl Triangulation {
    fn new(bounding_box: BoundingBox, precision: Option<Precision>) -> Self {
        let mut state = Self {
            bounding_box,
            mesh: MeshStorage::with_precision(precision),
            circumcircles: Vec::new(),
            free_slots: Vec::new(),
            circumcircle_index: Quadtree::new(bounding_box),
            nodes: HashMap::new(),
        };
        // Two seed triangles over the domain rectangle, elevations zero.
        let bb = bounding_box;
        let v0 = state.add_node(bb.min_x, bb.min_y, 0.0);
        let v1 = state.add_node(bb.max_x, bb.min_y, 0.0);
        let v2 = state.add_node(bb.max_x, bb.max_y, 0.0);
        let v3 = state.add_node(bb.min_x, bb.max_y, 0.0);
        state.add_triangle(v0, v1, v2);
        state.add_triangle(v0, v2, v3);
        state
    }

    fn add_node(&mut self, x: f64, y: f64, z: f64) -> usize {
        let vertex = self.mesh.add_vertex(x, y, z);
        // Key on the stored ordinates so scaled storage stays consistent.
        let stored = self.mesh.vertex(vertex);
        self.nodes.insert(point_key(stored.x, stored.y), vertex);
        vertex
    }

    /// Add a triangle over vertex indices, normalizing to clockwise winding,
    /// reusing a freed slot when one is available.
    fn add_triangle(&mut self, v0: usize, v1: usize, v2: usize) {
        let p0 = self.mesh.vertex(v0);
        let p1 = self.mesh.vertex(v1);
        let p2 = self.mesh.vertex(v2);
        let (v1, v2, p1, p2) =
            if orientation(p0.xy(), p1.xy(), p2.xy()) == Orientation::CounterClockwise {
                (v2, v1, p2, p1)
            } else {
                (v1, v2, p1, p2)
            };
        let circle = Circumcircle::of(p0, p1, p2);
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.mesh.set_triangle(TriangleHandle(slot), v0, v1, v2);
                self.circumcircles[slot] = circle;
                slot
            }
            None => {
                let handle = self.mesh.add_triangle(v0, v1, v2);
                self.circumcircles.push(circle);
                handle.0
            }
        };
        self.circumcircle_index.insert(circle.bounding_box(), slot);
    }

    fn remove_triangle(&mut self, slot: usize) {
        let bounds = self.circumcircles[slot].bounding_box();
        if !self.circumcircle_index.remove(&bounds, &slot) {
            warn!("triangle slot {slot} missing from circumcircle index");
        }
        self.free_slots.push(slot);
    }

    fn insert(&mut self, v: Point3) {
        let (x, y, z) = match &self.mesh {
            // Snap through the storage precision before any comparisons.
            MeshStorage::Scaled(m) => {
                let p = m.precision();
                (p.make_xy_precise(v.x), p.make_xy_precise(v.y), v.z)
            }
            MeshStorage::Double(_) => (v.x, v.y, v.z),
        };

        // Re-insertion at a known position never re-triangulates; it can
        // only supply a previously unknown elevation.
        if let Some(&vertex) = self.nodes.get(&point_key(x, y)) {
            if self.mesh.vertex_coordinate(vertex, 2).is_nan() && !z.is_nan() {
                self.mesh.set_vertex_z(vertex, z);
            }
            return;
        }

        let mut cavity = self.circumcircle_index.query_filtered(
            &BoundingBox::from_point(x, y),
            |&slot| self.circumcircles[slot].contains(x, y),
        );
        if cavity.is_empty() {
            // Numerical fallback: take the triangle that contains the point.
            cavity = self.triangles_containing(Point::new(x, y));
            if cavity.is_empty() {
                warn!("no triangle found for vertex ({x}, {y}), dropped");
                return;
            }
            debug!("circumcircle search missed ({x}, {y}), using containing triangle");
        }

        // Collect the distinct cavity boundary corners, then fan from the
        // new vertex in clockwise (descending angle) order.
        let mut corners: Vec<usize> = Vec::new();
        for &slot in &cavity {
            for corner in 0..3 {
                let vertex = self.mesh.triangle_vertex_index(TriangleHandle(slot), corner);
                let p = self.mesh.vertex(vertex);
                if p.x == x && p.y == y {
                    if p.z.is_nan() && !z.is_nan() {
                        self.mesh.set_vertex_z(vertex, z);
                    }
                    continue;
                }
                if !corners.contains(&vertex) {
                    corners.push(vertex);
                }
            }
        }
        for &slot in &cavity {
            self.remove_triangle(slot);
        }

        let centre = Point::new(x, y);
        corners.sort_by(|&a, &b| {
            let angle_a = angle(centre, self.mesh.vertex(a).xy());
            let angle_b = angle(centre, self.mesh.vertex(b).xy());
            angle_b
                .partial_cmp(&angle_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let Some(&last) = corners.last() else {
            warn!("cavity at ({x}, {y}) has no boundary corners, vertex dropped");
            return;
        };
        let vertex = self.add_node(x, y, z);
        let mut previous = last;
        for &corner in &corners {
            self.add_triangle(vertex, previous, corner);
            previous = corner;
        }
    }

    /// A degenerate circumcircle indexes under a NaN box no search box can
    /// reach, so the fallback scans every slot. One hit anchors the fan.
    fn triangles_containing(&self, p: Point) -> Vec<usize> {
        let mut hit = None;
        self.circumcircle_index.for_each(|&slot| {
            if hit.is_some() {
                return;
            }
            let h = TriangleHandle(slot);
            let t = Triangle::new(
                self.mesh.triangle_corner(h, 0),
                self.mesh.triangle_corner(h, 1),
                self.mesh.triangle_corner(h, 2),
            );
            if t.contains(p) {
                hit = Some(slot);
            }
        });
        hit.into_iter().collect()
    }

    fn finish(mut self) -> Tin {
        if self.free_slots.is_empty() {
            return Tin::new(self.bounding_box, self.mesh);
        }
        // Leftover freed slots hold stale indices; rebuild without them.
        self.free_slots.sort_unstable();
        let mut compacted = MeshStorage::with_precision(match &self.mesh {
            MeshStorage::Scaled(m) => Some(m.precision()),
            MeshStorage::Double(_) => None,
        });
        for vertex in 0..self.mesh.vertex_count() {
            let p = self.mesh.vertex(vertex);
            compacted.add_vertex(p.x, p.y, p.z);
        }
        let mut free = self.free_slots.iter().peekable();
        for slot in 0..self.mesh.triangle_count() {
            if free.peek() == Some(&&slot) {
                free.next();
                continue;
            }
            let h = TriangleHandle(slot);
            compacted.add_triangle(
                self.mesh.triangle_vertex_index(h, 0),
                self.mesh.triangle_vertex_index(h, 1),
                self.mesh.triangle_vertex_index(h, 2),
            );
        }
        Tin::new(self.bounding_box, compacted)
    }
}
