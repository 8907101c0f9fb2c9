//! Spatial index for RegionGuard.
//!
//! Maps block positions and volumes to the regions whose bounding boxes
//! could contain them. Callers re-check candidates against exact geometry;
//! the index may return false positives but never false negatives.
//!
//! Updates are remove-then-insert per region. Bulk loads call
//! [`SpatialIndex::rebuild`] once instead of churning entries.

mod config;
mod grid;

pub use config::IndexConfig;
pub use grid::SpatialIndex;
