//! Error types for the query facade.

use regionguard_flags::FlagError;
use regionguard_storage::StorageError;
use regionguard_store::StoreError;
use regionguard_types::WorldId;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The world has no published region set.
    #[error("world not found: {0}")]
    WorldNotFound(WorldId),

    /// Save or unload of a world that is not loaded.
    #[error("world not loaded: {0}")]
    WorldNotLoaded(WorldId),

    /// Reloading would discard edits that were never saved.
    #[error("world '{0}' has unsaved changes")]
    UnsavedChanges(WorldId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Flag(#[from] FlagError),

    /// Configuration could not be read or applied.
    #[error("configuration error: {0}")]
    Config(String),
}
