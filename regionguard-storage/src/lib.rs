//! Persistence for RegionGuard region sets.
//!
//! Every world is one JSON document with a top-level `schema_version`.
//! Loading a world:
//! 1. reads the raw document through a [`RegionDriver`]
//! 2. runs the [`Migrator`] chain up to [`CURRENT_SCHEMA_VERSION`]
//! 3. decodes and validates regions (ids, geometry, flags, parents)
//! 4. builds the [`WorldRegionSet`](regionguard_store::WorldRegionSet) and
//!    rebuilds its index once
//!
//! Saving always writes the current schema. Drivers:
//! - [`JsonFileDriver`]: `<root>/<world>/regions.json`, atomic replace
//! - [`SqliteDriver`]: one row per world
//! - [`MemoryDriver`]: in-process, for tests and imports

mod cancel;
mod driver;
mod error;
mod migration;
mod records;
mod storage;

pub use cancel::CancelToken;
pub use driver::{JsonFileDriver, MemoryDriver, RegionDriver, SqliteDriver};
pub use error::{StorageError, StorageResult};
pub use migration::{
    CURRENT_SCHEMA_VERSION, HalfOpenShapes, KeyedToSequenced, Migrated, Migration, Migrator, VERSION_KEY,
};
pub use records::{DomainRecord, RegionRecord, SettingRecord, ShapeRecord, WorldDocument, decode, encode};
pub use storage::{LoadReport, LoadedWorld, RegionStorage};
