//! Error types for taskdeck
//!
//! Only validation failures are meant to reach callers of the task store.
//! Storage errors are produced by the fallible persistence paths and are
//! logged and dropped by the store itself.

use thiserror::Error;

/// Main error type for taskdeck operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported schema version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// True for errors the caller caused and is expected to prevent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True for errors raised while reading or writing persisted state.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Json(_) | Error::VersionMismatch { .. }
        )
    }
}

/// Result type alias for taskdeck operations
pub type Result<T> = std::result::Result<T, Error>;
