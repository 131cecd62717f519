use terrain_tin::constrained::ConstrainedTinBuilder;
use terrain_tin::delaunay::SimpleTinBuilder;
use terrain_tin::geometry::{BoundingBox, Point3, Polyline3};

fn ramp_tin() -> terrain_tin::tin::Tin {
    ConstrainedTinBuilder::from_triangle(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(0.0, 10.0, 10.0),
    )
    .finish()
}

#[test]
fn corner_and_edge_elevations() {
    let tin = ramp_tin();
    assert_eq!(tin.elevation_at(0.0, 0.0), 0.0);
    assert_eq!(tin.elevation_at(10.0, 0.0), 0.0);
    assert_eq!(tin.elevation_at(0.0, 10.0), 10.0);
    // Midpoints of the edges.
    assert!((tin.elevation_at(5.0, 0.0) - 0.0).abs() < 1e-9);
    assert!((tin.elevation_at(0.0, 5.0) - 5.0).abs() < 1e-9);
    assert!((tin.elevation_at(5.0, 5.0) - 5.0).abs() < 1e-9);
    // Interior of the ramp: z equals y everywhere on this plane.
    assert!((tin.elevation_at(3.0, 4.0) - 4.0).abs() < 1e-9);
}

#[test]
fn queries_outside_return_nan() {
    let tin = ramp_tin();
    assert!(tin.elevation_at(8.0, 8.0).is_nan());
    assert!(tin.elevation_at(-1.0, -1.0).is_nan());
}

#[test]
fn polyline_draping() {
    let tin = ramp_tin();
    let profile = Polyline3::new(vec![
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 6.0, 0.0),
        Point3::new(20.0, 20.0, 99.0),
    ]);
    let draped = tin.elevation_of_polyline(profile);
    assert!((draped.vertices[0].z - 1.0).abs() < 1e-9);
    assert!((draped.vertices[1].z - 6.0).abs() < 1e-9);
    assert_eq!(draped.vertices[2].z, 99.0);
}

#[test]
fn both_builders_agree_on_a_flat_surface() {
    let domain = BoundingBox::new(0.0, 0.0, 50.0, 50.0);
    let points = [
        (10.0, 10.0),
        (40.0, 12.0),
        (25.0, 30.0),
        (12.0, 42.0),
        (44.0, 44.0),
    ];

    let mut simple = SimpleTinBuilder::new(domain);
    let mut constrained = ConstrainedTinBuilder::new(domain);
    for &(x, y) in &points {
        simple.insert_vertex(x, y, 7.0);
        constrained.insert_vertex(Point3::new(x, y, 7.0));
    }
    let simple_tin = simple.finish();
    let constrained_tin = constrained.finish();

    for &(x, y) in &points {
        assert_eq!(simple_tin.elevation_at(x, y), 7.0);
        assert_eq!(constrained_tin.elevation_at(x, y), 7.0);
    }
    // Between data points both surfaces interpolate between the data
    // elevation and the zero-elevation synthetic corners.
    for sample in [(20.0, 20.0), (30.0, 25.0)] {
        let a = simple_tin.elevation_at(sample.0, sample.1);
        let b = constrained_tin.elevation_at(sample.0, sample.1);
        assert!((0.0..=7.0).contains(&a));
        assert!((0.0..=7.0).contains(&b));
    }
}
