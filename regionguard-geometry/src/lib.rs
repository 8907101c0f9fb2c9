//! Region geometry for RegionGuard.
//!
//! Three shapes are supported:
//! - [`Cuboid`]: an axis-aligned box, half-open on its upper corner
//! - [`Polygon`]: an x/z vertex ring extruded over a height range, winding rule
//! - [`Shape::Global`]: the whole world, unbounded
//!
//! Degenerate shapes are rejected when they are built; every query on a
//! constructed shape is a pure, infallible function.
//!
//! `intersects` is exact in block space: it answers whether at least one
//! block is inside both shapes, sweeping polygon rows where needed.

mod bounds;
mod cuboid;
mod error;
mod polygon;
mod selection;
mod shape;

pub use bounds::BoundingBox;
pub use cuboid::Cuboid;
pub use error::{GeometryError, GeometryResult};
pub use polygon::{Polygon, Span};
pub use selection::Selection;
pub use shape::{Shape, ShapeKind};
