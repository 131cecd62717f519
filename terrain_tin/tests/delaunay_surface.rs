use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use terrain_tin::delaunay::SimpleTinBuilder;
use terrain_tin::geometry::{BoundingBox, Circumcircle, Point3};

fn random_cloud(count: usize, seed: u64) -> Vec<Point3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = rng.random_range(1.0..99.0);
            let y = rng.random_range(1.0..99.0);
            Point3::new(x, y, x + 2.0 * y)
        })
        .collect()
}

#[test]
fn delaunay_invariant_on_random_cloud() {
    let domain = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let mut builder = SimpleTinBuilder::new(domain);
    let cloud = random_cloud(100, 42);
    for p in &cloud {
        builder.insert_vertex(p.x, p.y, p.z);
    }
    let tin = builder.finish();

    let mut vertices = Vec::new();
    tin.for_each_vertex(|v| vertices.push(v));
    assert_eq!(vertices.len(), 104);

    let mut violations = 0;
    tin.for_each_triangle(|corners| {
        let circle = Circumcircle::of(corners[0], corners[1], corners[2]);
        for v in &vertices {
            if corners.iter().any(|c| c.x == v.x && c.y == v.y) {
                continue;
            }
            let d = terrain_tin::geometry::distance(circle.centre, v.xy());
            // Allow the same slack the insertion predicate uses.
            if d < circle.radius - 0.01 {
                violations += 1;
            }
        }
    });
    assert_eq!(violations, 0);
}

#[test]
fn triangulation_covers_the_domain_exactly() {
    let domain = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let mut builder = SimpleTinBuilder::new(domain);
    for p in random_cloud(100, 7) {
        builder.insert_vertex(p.x, p.y, p.z);
    }
    let tin = builder.finish();

    // Euler count for a triangulated rectangle with 100 interior vertices.
    assert_eq!(tin.triangle_count(), 2 * 100 + 4 - 2);

    let mut total_area = 0.0;
    tin.for_each_triangle(|[a, b, c]| {
        total_area += ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs() / 2.0;
    });
    assert!(
        (total_area - 100.0 * 100.0).abs() < 1.0,
        "covered area {total_area}"
    );
}

#[test]
fn inserted_vertices_keep_their_elevation() {
    let domain = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let mut builder = SimpleTinBuilder::new(domain);
    let cloud = random_cloud(50, 3);
    for p in &cloud {
        builder.insert_vertex(p.x, p.y, p.z);
    }
    let tin = builder.finish();
    for p in &cloud {
        let z = tin.elevation_at(p.x, p.y);
        assert!((z - p.z).abs() < 1e-9, "expected {} got {z}", p.z);
    }
    // Interior positions interpolate to something finite.
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let x = rng.random_range(0.0..100.0);
        let y = rng.random_range(0.0..100.0);
        assert!(!tin.elevation_at(x, y).is_nan());
    }
    assert!(tin.elevation_at(200.0, 50.0).is_nan());
}
