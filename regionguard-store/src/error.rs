//! Error types for the region store.

use regionguard_geometry::GeometryError;
use regionguard_types::{RegionId, WorldId};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Validation failures raised by mutating store calls.
///
/// A failed call leaves the store exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A region with this id already exists in the world.
    #[error("region '{id}' already exists in world '{world}'")]
    DuplicateIdentifier { world: WorldId, id: RegionId },

    /// The parent link would make a region its own ancestor.
    #[error("setting parent of '{id}' to '{parent}' would create a cycle")]
    CycleDetected { id: RegionId, parent: RegionId },

    /// Unknown region id.
    #[error("region '{id}' not found in world '{world}'")]
    NotFound { world: WorldId, id: RegionId },

    /// Degenerate shape.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// A region was handed to the set of another world.
    #[error("region belongs to world '{actual}', not '{expected}'")]
    WorldMismatch { expected: WorldId, actual: WorldId },

    /// `__global__` must use the global shape, and only it may.
    #[error("region '{0}': only __global__ may use the global shape, and it must")]
    GlobalShape(RegionId),

    /// No definition sequence number is left for a new region.
    #[error("no definition sequence number left for region '{id}' in world '{world}'")]
    SequenceExhausted { world: WorldId, id: RegionId },

    /// The global region cannot take part in parent links.
    #[error("region '{0}': the global region cannot have or be a parent")]
    GlobalParent(RegionId),
}
