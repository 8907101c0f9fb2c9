//! Error types for flag definitions and values.

use thiserror::Error;

/// Result type for flag operations.
pub type FlagResult<T> = Result<T, FlagError>;

/// Errors raised while registering flags or validating flag values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("flag already registered: {0}")]
    DuplicateFlag(String),

    #[error("flag registry is locked; cannot register '{0}'")]
    RegistryLocked(String),

    #[error("invalid flag name '{0}': use lower-case letters, digits, '-' and '_'")]
    InvalidName(String),

    #[error("flag '{flag}' expects a {expected} value, got {actual}")]
    TypeMismatch {
        flag: String,
        expected: String,
        actual: String,
    },

    #[error("'{value}' is not an option of flag '{flag}' (options: {options})")]
    UnknownOption {
        flag: String,
        value: String,
        options: String,
    },

    #[error("cannot parse '{input}' for flag '{flag}'")]
    Unparseable { flag: String, input: String },
}
