//! Backends holding one serialized document per world.

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileDriver;
pub use memory::MemoryDriver;
pub use sqlite::SqliteDriver;

use crate::error::StorageResult;
use regionguard_types::WorldId;
use serde_json::Value;

/// Raw document storage. Drivers know nothing about schema versions or
/// regions; they store and return whole documents.
pub trait RegionDriver: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// The stored document, or `None` when the world has never been saved.
    fn read(&self, world: &WorldId) -> StorageResult<Option<Value>>;

    /// Replaces the stored document. A reader never observes a partially
    /// written document.
    fn write(&self, world: &WorldId, document: &Value) -> StorageResult<()>;

    /// Removes the stored document. Returns false if there was none.
    fn delete(&self, world: &WorldId) -> StorageResult<bool>;

    /// Worlds with a stored document, sorted.
    fn worlds(&self) -> StorageResult<Vec<WorldId>>;
}
