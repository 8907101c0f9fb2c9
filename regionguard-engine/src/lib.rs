//! RegionGuard query facade.
//!
//! [`RegionEngine`] is what a host server talks to:
//! - flag queries ([`RegionEngine::query_flag`]) and point lookups
//! - region definition, removal and batched [`RegionUpdate`]s
//! - world lifecycle: load, save, save-dirty, unload
//!
//! Each loaded world is published as an immutable snapshot. Reads never
//! wait for writes; writes to one world are serialized and published
//! atomically.
//!
//! Configuration is read from TOML through [`EngineConfig`].

mod config;
mod engine;
mod error;
mod update;

pub use config::{EngineConfig, IndexSettings, StorageBackend, StorageConfig};
pub use engine::{LoadSummary, RegionEngine};
pub use error::{EngineError, EngineResult};
pub use update::RegionUpdate;
