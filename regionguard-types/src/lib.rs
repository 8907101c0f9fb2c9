//! Core type definitions for RegionGuard.
//!
//! This crate defines the fundamental types shared by every other
//! RegionGuard crate:
//! - World, region and actor identifiers
//! - Integer block coordinates (3D and x/z column)
//! - The acting [`Subject`] of a flag query
//!
//! Nothing here knows about shapes, flags or storage; those live in their
//! respective crates.

mod ids;
mod subject;
mod vector;

pub use ids::{ActorId, RegionId, WorldId, GLOBAL_REGION_ID};
pub use subject::Subject;
pub use vector::{BlockVector, BlockVector2};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid region id '{0}': only letters, digits and _ , ' - + / are allowed")]
    InvalidRegionId(String),

    #[error("invalid world id '{0}'")]
    InvalidWorldId(String),

    #[error("invalid block vector '{0}': expected x,y,z")]
    InvalidVector(String),
}
