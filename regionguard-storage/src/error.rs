//! Error types for the persistence layer.

use regionguard_flags::FlagError;
use regionguard_store::StoreError;
use regionguard_types::WorldId;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while loading or saving a world.
///
/// Every error is scoped to one world; loading several worlds reports
/// failures individually.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No migration step starts at this version.
    #[error("no migration step from schema version {from}")]
    MigrationGap { from: u32 },

    /// A migration step rejected the document.
    #[error("migration from schema version {from} failed: {reason}")]
    MigrationFailed { from: u32, reason: String },

    /// The document was written by a newer schema.
    #[error("schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The load was cancelled before the world was published.
    #[error("loading world '{0}' was cancelled")]
    Cancelled(WorldId),

    /// The document does not describe valid regions.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Region set validation (duplicates, dangling parents, cycles).
    #[error("invalid region set: {0}")]
    Store(#[from] StoreError),

    /// Flag value rejected by its definition.
    #[error("invalid flag value: {0}")]
    Flag(#[from] FlagError),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
