//! Triangle primitive with a cached circumcircle.

use super::{distance, orientation, BoundingBox, Orientation, Point, Point3, Segment3};

/// Tolerance added to the circumcircle radius so points sitting numerically
/// on the circle still count as contained.
const CIRCUMCIRCLE_TOLERANCE: f64 = 1e-4;

/// Circumcircle of a triangle. Collinear corners produce a NaN centre and
/// radius, which contains nothing and intersects nothing.
#[derive(Debug, Clone, Copy)]
pub struct Circumcircle {
    pub centre: Point,
    pub radius: f64,
}

impl Circumcircle {
    /// Circle through three corners, from the perpendicular-bisector
    /// intersection.
    pub fn of(p0: Point3, p1: Point3, p2: Point3) -> Self {
        let d = 2.0
            * (p0.x * (p1.y - p2.y) + p1.x * (p2.y - p0.y) + p2.x * (p0.y - p1.y));
        if d == 0.0 {
            return Self {
                centre: Point::new(f64::NAN, f64::NAN),
                radius: f64::NAN,
            };
        }
        let sq0 = p0.x * p0.x + p0.y * p0.y;
        let sq1 = p1.x * p1.x + p1.y * p1.y;
        let sq2 = p2.x * p2.x + p2.y * p2.y;
        let cx = (sq0 * (p1.y - p2.y) + sq1 * (p2.y - p0.y) + sq2 * (p0.y - p1.y)) / d;
        let cy = (sq0 * (p2.x - p1.x) + sq1 * (p0.x - p2.x) + sq2 * (p1.x - p0.x)) / d;
        let centre = Point::new(cx, cy);
        Self {
            centre,
            radius: distance(centre, p0.xy()),
        }
    }

    /// Toleranced containment test. False for any NaN input or a NaN circle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        distance(self.centre, Point::new(x, y)) < self.radius + CIRCUMCIRCLE_TOLERANCE
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.centre.x - self.radius,
            self.centre.y - self.radius,
            self.centre.x + self.radius,
            self.centre.y + self.radius,
        )
    }
}

/// Triangle over three 2.5D corners. Built via [`Triangle::new_clockwise`]
/// everywhere the winding matters.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    corners: [Point3; 3],
    circumcircle: Circumcircle,
}

/// Equality over the exact corner bit patterns, so triangles carrying NaN
/// elevations or degenerate circumcircles still compare equal to themselves.
/// Needed to remove triangles from an index by value.
impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.corners.iter().zip(other.corners.iter()).all(|(a, b)| {
            a.x.to_bits() == b.x.to_bits()
                && a.y.to_bits() == b.y.to_bits()
                && a.z.to_bits() == b.z.to_bits()
        })
    }
}

impl Triangle {
    pub fn new(p0: Point3, p1: Point3, p2: Point3) -> Self {
        Self {
            corners: [p0, p1, p2],
            circumcircle: Circumcircle::of(p0, p1, p2),
        }
    }

    /// Triangle normalized to clockwise winding: counter-clockwise input has
    /// its second and third corners swapped, collinear input is kept as-is.
    pub fn new_clockwise(p0: Point3, p1: Point3, p2: Point3) -> Self {
        if orientation(p0.xy(), p1.xy(), p2.xy()) == Orientation::CounterClockwise {
            Self::new(p0, p2, p1)
        } else {
            Self::new(p0, p1, p2)
        }
    }

    /// Corner by cyclic index: any integer maps onto 0..3, negatives included.
    pub fn corner(&self, index: i32) -> Point3 {
        self.corners[index.rem_euclid(3) as usize]
    }

    pub fn corners(&self) -> [Point3; 3] {
        self.corners
    }

    /// Edge from corner `index` to the next corner, cyclically.
    pub fn edge(&self, index: i32) -> Segment3 {
        Segment3::new(self.corner(index), self.corner(index + 1))
    }

    pub fn circumcircle(&self) -> &Circumcircle {
        &self.circumcircle
    }

    /// Whether the position falls inside the toleranced circumcircle.
    pub fn circumcircle_contains(&self, x: f64, y: f64) -> bool {
        self.circumcircle.contains(x, y)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let xs = self.corners.map(|c| c.x);
        let ys = self.corners.map(|c| c.y);
        BoundingBox::new(
            xs[0].min(xs[1]).min(xs[2]),
            ys[0].min(ys[1]).min(ys[2]),
            xs[0].max(xs[1]).max(xs[2]),
            ys[0].max(ys[1]).max(ys[2]),
        )
    }

    pub fn circumcircle_bounding_box(&self) -> BoundingBox {
        self.circumcircle.bounding_box()
    }

    /// Signed planar area is not exposed; this is the absolute area.
    pub fn area(&self) -> f64 {
        let [a, b, c] = self.corners;
        ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs() / 2.0
    }

    /// Planar point-in-triangle test, boundary inclusive, winding agnostic.
    pub fn contains(&self, p: Point) -> bool {
        let o0 = orientation(self.corners[0].xy(), self.corners[1].xy(), p);
        let o1 = orientation(self.corners[1].xy(), self.corners[2].xy(), p);
        let o2 = orientation(self.corners[2].xy(), self.corners[0].xy(), p);
        let any_cw = [o0, o1, o2].contains(&Orientation::Clockwise);
        let any_ccw = [o0, o1, o2].contains(&Orientation::CounterClockwise);
        !(any_cw && any_ccw)
    }

    /// Clip a segment to the triangle, interpolating elevations from the
    /// segment. None when the segment misses the triangle entirely; a
    /// grazing contact comes back as a zero-length segment.
    pub fn intersection(&self, segment: &Segment3) -> Option<Segment3> {
        let clockwise = Self::new_clockwise(self.corners[0], self.corners[1], self.corners[2]);
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        for i in 0..3 {
            let a = clockwise.corner(i).xy();
            let b = clockwise.corner(i + 1).xy();
            let ex = b.x - a.x;
            let ey = b.y - a.y;
            // Inside the clockwise triangle means on or right of each edge,
            // i.e. a non-positive cross product.
            let f_start =
                ex * (segment.start.y - a.y) - ey * (segment.start.x - a.x);
            let f_end = ex * (segment.end.y - a.y) - ey * (segment.end.x - a.x);
            let coef = f_end - f_start;
            if coef == 0.0 {
                if f_start > 0.0 {
                    return None;
                }
            } else {
                let r = -f_start / coef;
                if coef > 0.0 {
                    if r < t0 {
                        return None;
                    }
                    if r < t1 {
                        t1 = r;
                    }
                } else {
                    if r > t1 {
                        return None;
                    }
                    if r > t0 {
                        t0 = r;
                    }
                }
            }
        }
        if t0 > t1 {
            return None;
        }
        Some(Segment3::new(
            segment_fraction(segment, t0),
            segment_fraction(segment, t1),
        ))
    }
}

fn segment_fraction(segment: &Segment3, t: f64) -> Point3 {
    Point3::new(
        segment.start.x + t * (segment.end.x - segment.start.x),
        segment.start.y + t * (segment.end.y - segment.start.y),
        segment.start.z + t * (segment.end.z - segment.start.z),
    )
}
