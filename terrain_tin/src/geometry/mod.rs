//! Planar and 2.5D geometric primitives used by the triangulation core.

use serde::{Deserialize, Serialize};

pub mod triangle;

pub use triangle::{Circumcircle, Triangle};

/// Basic 2D point used for planar tests and queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 3D point: planar position plus elevation. The z ordinate may be NaN when
/// the elevation is not yet known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar projection, dropping the elevation.
    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// True when both points occupy the same planar position, elevations aside.
    pub fn coincident(&self, other: &Point3) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Bit-pattern key for a planar position, usable as a hash-map key.
pub(crate) fn point_key(x: f64, y: f64) -> (u64, u64) {
    (x.to_bits(), y.to_bits())
}

/// Axis-aligned 2D bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Degenerate box covering a single position.
    pub fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Box grown by `delta` on every side.
    pub fn expanded(&self, delta: f64) -> Self {
        Self::new(
            self.min_x - delta,
            self.min_y - delta,
            self.max_x + delta,
            self.max_y + delta,
        )
    }

    /// True when the position lies inside or on the boundary.
    /// NaN coordinates are never covered.
    pub fn covers(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// True when the boxes share any area, edge or corner.
    /// A box with NaN extents intersects nothing.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }
}

/// Turn direction of the path a -> b -> c.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

/// 2D orientation test via the signed cross product of (b - a) and (c - a).
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross > 0.0 {
        Orientation::CounterClockwise
    } else if cross < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Planar distance between two positions.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Direction angle of the vector from `from` to `to`, in radians (-pi, pi].
pub fn angle(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unsigned angle at `tail` between the directions to `tip1` and `tip2`,
/// in [0, pi].
pub fn angle_between(tip1: Point, tail: Point, tip2: Point) -> f64 {
    let a1 = angle(tail, tip1);
    let a2 = angle(tail, tip2);
    let d = (a1 - a2).abs();
    if d > std::f64::consts::PI {
        2.0 * std::f64::consts::PI - d
    } else {
        d
    }
}

/// Directed line segment with elevations at both ends. Lengths and distances
/// are planar; elevations ride along for interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment3 {
    pub start: Point3,
    pub end: Point3,
}

impl Segment3 {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Planar length.
    pub fn length(&self) -> f64 {
        distance(self.start.xy(), self.end.xy())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    /// Planar distance from `p` to the closest point of the segment.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return distance(self.start.xy(), p);
        }
        let r = ((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len2;
        let r = r.clamp(0.0, 1.0);
        let cx = self.start.x + r * dx;
        let cy = self.start.y + r * dy;
        distance(Point::new(cx, cy), p)
    }

    /// Elevation at the projection of `p` onto the segment, linearly
    /// interpolated between the endpoint elevations. NaN endpoints yield NaN.
    pub fn elevation_at(&self, p: Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len2 = dx * dx + dy * dy;
        let r = if len2 == 0.0 {
            0.0
        } else {
            (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len2).clamp(0.0, 1.0)
        };
        self.start.z + r * (self.end.z - self.start.z)
    }

    /// Segment with the end pushed `extra` further along the direction of
    /// travel. A zero-length segment is returned unchanged.
    pub fn extended(&self, extra: f64) -> Segment3 {
        let len = self.length();
        if len == 0.0 {
            return *self;
        }
        let fx = (self.end.x - self.start.x) / len;
        let fy = (self.end.y - self.start.y) / len;
        Segment3::new(
            self.start,
            Point3::new(self.end.x + fx * extra, self.end.y + fy * extra, self.end.z),
        )
    }

    /// Planar intersection point of two segments, endpoints included.
    /// Parallel and collinear segments yield None.
    pub fn intersection_point(&self, other: &Segment3) -> Option<Point> {
        let d1x = self.end.x - self.start.x;
        let d1y = self.end.y - self.start.y;
        let d2x = other.end.x - other.start.x;
        let d2y = other.end.y - other.start.y;
        let denom = d1x * d2y - d1y * d2x;
        if denom == 0.0 {
            return None;
        }
        let sx = other.start.x - self.start.x;
        let sy = other.start.y - self.start.y;
        let t = (sx * d2y - sy * d2x) / denom;
        let u = (sx * d1y - sy * d1x) / denom;
        if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
            return None;
        }
        Some(Point::new(self.start.x + t * d1x, self.start.y + t * d1y))
    }

    fn at_fraction(&self, t: f64) -> Point3 {
        Point3::new(
            self.start.x + t * (self.end.x - self.start.x),
            self.start.y + t * (self.end.y - self.start.y),
            self.start.z + t * (self.end.z - self.start.z),
        )
    }

    /// Liang-Barsky clip of the segment to a box, interpolating elevations.
    /// None when the segment lies entirely outside.
    pub fn clipped_to(&self, bounds: &BoundingBox) -> Option<Segment3> {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        let checks = [
            (-dx, self.start.x - bounds.min_x),
            (dx, bounds.max_x - self.start.x),
            (-dy, self.start.y - bounds.min_y),
            (dy, bounds.max_y - self.start.y),
        ];
        for (p, q) in checks {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    if r > t1 {
                        return None;
                    }
                    if r > t0 {
                        t0 = r;
                    }
                } else {
                    if r < t0 {
                        return None;
                    }
                    if r < t1 {
                        t1 = r;
                    }
                }
            }
        }
        Some(Segment3::new(self.at_fraction(t0), self.at_fraction(t1)))
    }
}

/// Open polyline of 3D vertices, e.g. a breakline or a profile line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline3 {
    pub vertices: Vec<Point3>,
}

impl Polyline3 {
    pub fn new(vertices: Vec<Point3>) -> Self {
        Self { vertices }
    }

    /// Consecutive vertex pairs as segments.
    pub fn segments(&self) -> impl Iterator<Item = Segment3> + '_ {
        self.vertices
            .windows(2)
            .map(|w| Segment3::new(w[0], w[1]))
    }
}
