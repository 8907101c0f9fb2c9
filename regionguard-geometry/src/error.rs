//! Error types for shape construction.

use thiserror::Error;

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Rejections raised when a shape is constructed. Queries never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A cuboid with zero extent on at least one axis.
    #[error("degenerate cuboid: zero extent between {min} and {max}")]
    DegenerateCuboid { min: String, max: String },

    /// A polygon needs at least three vertices.
    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),

    /// All polygon vertices are collinear.
    #[error("polygon encloses zero area")]
    ZeroArea,

    /// `max_y` must be above `min_y`.
    #[error("empty height range [{min_y}, {max_y})")]
    EmptyHeight { min_y: i32, max_y: i32 },

    /// Converting an inclusive selection overflowed the coordinate range.
    #[error("coordinate overflow converting selection")]
    CoordinateOverflow,
}
