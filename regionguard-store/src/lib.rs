//! Region entity store for RegionGuard.
//!
//! One [`WorldRegionSet`] per world owns that world's [`Region`]s and keeps
//! three things consistent inside every mutation:
//! - the region map, keyed by lower-case [`RegionId`](regionguard_types::RegionId)
//! - parent links, which always form a forest inside the world
//! - the spatial index, which mirrors each bounded region's current shape
//!
//! Removing a region detaches its children rather than reparenting them.
//! The reserved `__global__` region uses the global shape, covers the whole
//! world, and is never indexed.

mod domain;
mod error;
mod region;
mod world;

pub use domain::Domain;
pub use error::{StoreError, StoreResult};
pub use region::Region;
pub use world::{RemovedRegion, WorldRegionSet};
