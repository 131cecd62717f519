//! Finished triangulated irregular network and its query surface.
//!
//! A `Tin` is immutable: builders hand one over and keep nothing back. All
//! queries take `&self`, so a finished surface can be shared across threads
//! freely.

use crate::geometry::{distance, BoundingBox, Point, Point3, Polyline3, Segment3, Triangle};
use crate::index::Quadtree;
use crate::mesh::{MeshStorage, TriangleHandle};

/// Immutable terrain surface: compact mesh plus a bounding-box index over
/// the triangles.
#[derive(Debug, Clone)]
pub struct Tin {
    bounding_box: BoundingBox,
    mesh: MeshStorage,
    triangle_index: Quadtree<usize>,
}

impl Tin {
    /// Wrap finished mesh storage, building the bounding-box index.
    pub(crate) fn new(bounding_box: BoundingBox, mesh: MeshStorage) -> Self {
        let mut triangle_index = Quadtree::new(bounding_box);
        for slot in 0..mesh.triangle_count() {
            let handle = TriangleHandle(slot);
            triangle_index.insert(mesh.triangle_bounding_box(handle), slot);
        }
        Self {
            bounding_box,
            mesh,
            triangle_index,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Ordinate of a vertex: axis 0 = x, 1 = y, 2 = z. This, together with
    /// [`Tin::triangle_vertex_index`], is the seam external codecs read
    /// the surface through.
    pub fn vertex_coordinate(&self, vertex: usize, axis: usize) -> f64 {
        self.mesh.vertex_coordinate(vertex, axis)
    }

    /// Vertex index of a triangle corner, corner taken cyclically.
    pub fn triangle_vertex_index(&self, triangle: usize, corner: i32) -> usize {
        self.mesh.triangle_vertex_index(TriangleHandle(triangle), corner)
    }

    /// Corner position of a triangle.
    pub fn triangle_corner(&self, triangle: usize, corner: i32) -> Point3 {
        self.mesh.triangle_corner(TriangleHandle(triangle), corner)
    }

    fn triangle_corners(&self, triangle: usize) -> [Point3; 3] {
        [
            self.triangle_corner(triangle, 0),
            self.triangle_corner(triangle, 1),
            self.triangle_corner(triangle, 2),
        ]
    }

    /// Visit every triangle's corners.
    pub fn for_each_triangle(&self, mut action: impl FnMut([Point3; 3])) {
        for slot in 0..self.triangle_count() {
            action(self.triangle_corners(slot));
        }
    }

    /// Visit the corners of every triangle whose bounding box intersects
    /// the search box.
    pub fn for_each_triangle_in(
        &self,
        search: &BoundingBox,
        mut action: impl FnMut([Point3; 3]),
    ) {
        for slot in self.triangle_index.query(search) {
            action(self.triangle_corners(slot));
        }
    }

    /// Visit every vertex.
    pub fn for_each_vertex(&self, mut action: impl FnMut(Point3)) {
        for vertex in 0..self.vertex_count() {
            action(self.mesh.vertex(vertex));
        }
    }

    /// Interpolated surface elevation at a planar position, NaN outside the
    /// triangulated area.
    ///
    /// A position matching a triangle corner returns that corner's elevation
    /// directly. Otherwise a ray is cast from the triangle's closest corner
    /// through the query position onto the opposite edge, and the elevation
    /// is interpolated first along that edge, then along the ray.
    pub fn elevation_at(&self, x: f64, y: f64) -> f64 {
        let p = Point::new(x, y);
        let candidates = self.triangle_index.query(&BoundingBox::from_point(x, y));
        for slot in candidates {
            let triangle = Triangle::new(
                self.triangle_corner(slot, 0),
                self.triangle_corner(slot, 1),
                self.triangle_corner(slot, 2),
            );
            if !triangle.contains(p) {
                continue;
            }
            for corner in 0..3 {
                let c = triangle.corner(corner);
                if c.x == x && c.y == y {
                    return c.z;
                }
            }
            let z = interpolate_in_triangle(&triangle, p);
            if !z.is_nan() {
                return z;
            }
        }
        f64::NAN
    }

    /// Rewrite the elevations of a polyline from the surface. Ordinates
    /// outside the triangulated area are left alone; when nothing changes
    /// the input is handed back untouched.
    pub fn elevation_of_polyline(&self, line: Polyline3) -> Polyline3 {
        let mut vertices = line.vertices.clone();
        let mut modified = false;
        for v in &mut vertices {
            let z = self.elevation_at(v.x, v.y);
            if !z.is_nan() && z.to_bits() != v.z.to_bits() {
                v.z = z;
                modified = true;
            }
        }
        if modified {
            Polyline3::new(vertices)
        } else {
            line
        }
    }
}

/// Two-step linear interpolation: corner closest to `p`, ray through `p`
/// extended past the perimeter, intersected with the opposite edge.
fn interpolate_in_triangle(triangle: &Triangle, p: Point) -> f64 {
    let mut closest = 0;
    let mut closest_distance = f64::INFINITY;
    for corner in 0..3 {
        let d = distance(triangle.corner(corner).xy(), p);
        if d < closest_distance {
            closest_distance = d;
            closest = corner;
        }
    }
    let corner = triangle.corner(closest);
    let opposite = triangle.edge(closest + 1);
    let perimeter = triangle.edge(0).length()
        + triangle.edge(1).length()
        + triangle.edge(2).length();
    let ray = Segment3::new(corner, Point3::new(p.x, p.y, f64::NAN)).extended(perimeter);
    let Some(hit) = ray.intersection_point(&opposite) else {
        return f64::NAN;
    };
    let edge_z = opposite.elevation_at(hit);
    if edge_z.is_nan() {
        return f64::NAN;
    }
    Segment3::new(corner, Point3::new(hit.x, hit.y, edge_z)).elevation_at(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::DoubleMesh;

    fn single_triangle_tin() -> Tin {
        let mut mesh = DoubleMesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        let b = mesh.add_vertex(10.0, 0.0, 0.0);
        let c = mesh.add_vertex(0.0, 10.0, 10.0);
        mesh.add_triangle(a, c, b);
        Tin::new(
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            MeshStorage::Double(mesh),
        )
    }

    #[test]
    fn corner_elevation_is_exact() {
        let tin = single_triangle_tin();
        assert_eq!(tin.elevation_at(0.0, 0.0), 0.0);
        assert_eq!(tin.elevation_at(10.0, 0.0), 0.0);
        assert_eq!(tin.elevation_at(0.0, 10.0), 10.0);
    }

    #[test]
    fn interior_elevation_is_planar() {
        let tin = single_triangle_tin();
        // The surface z equals the y ordinate everywhere on this plane.
        assert!((tin.elevation_at(2.0, 4.0) - 4.0).abs() < 1e-9);
        assert!((tin.elevation_at(1.0, 1.0) - 1.0).abs() < 1e-9);
        assert!((tin.elevation_at(5.0, 0.0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn outside_is_nan() {
        let tin = single_triangle_tin();
        assert!(tin.elevation_at(9.0, 9.0).is_nan());
        assert!(tin.elevation_at(-1.0, 0.0).is_nan());
    }

    #[test]
    fn polyline_rewrite_and_identity() {
        let tin = single_triangle_tin();
        let line = Polyline3::new(vec![
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 4.0, 0.0),
            Point3::new(50.0, 50.0, 7.0),
        ]);
        let draped = tin.elevation_of_polyline(line);
        assert!((draped.vertices[0].z - 1.0).abs() < 1e-9);
        assert!((draped.vertices[1].z - 4.0).abs() < 1e-9);
        // Outside the surface the ordinate is untouched.
        assert_eq!(draped.vertices[2].z, 7.0);

        // A line already on the surface comes back unchanged.
        let exact = Polyline3::new(vec![Point3::new(1.0, 1.0, 1.0)]);
        let same = tin.elevation_of_polyline(exact.clone());
        assert_eq!(same, exact);
    }

    #[test]
    fn accessor_seam_is_consistent() {
        let tin = single_triangle_tin();
        assert_eq!(tin.vertex_count(), 3);
        assert_eq!(tin.triangle_count(), 1);
        for triangle in 0..tin.triangle_count() {
            for corner in 0..3 {
                let vertex = tin.triangle_vertex_index(triangle, corner);
                assert!(vertex < tin.vertex_count());
                let p = tin.triangle_corner(triangle, corner);
                assert_eq!(p.x, tin.vertex_coordinate(vertex, 0));
            }
        }
        let mut visited = 0;
        tin.for_each_triangle_in(&BoundingBox::from_point(1.0, 1.0), |_| visited += 1);
        assert_eq!(visited, 1);
    }
}
