//! Triangulated irregular network (TIN) terrain modeling.
//!
//! Two builders produce an immutable [`tin::Tin`] surface:
//! [`delaunay::SimpleTinBuilder`] triangulates a buffered point cloud with
//! incremental Delaunay insertion over compact flat-array storage, and
//! [`constrained::ConstrainedTinBuilder`] additionally enforces breaklines
//! by cutting the triangles they cross. The finished surface answers point
//! and polyline elevation queries and exposes a flat accessor seam for
//! external readers and writers.

pub mod constrained;
pub mod delaunay;
pub mod geometry;
pub mod index;
pub mod mesh;
pub mod tin;
