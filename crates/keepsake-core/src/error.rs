//! Error types for Keepsake

use thiserror::Error;

/// Result type alias using Keepsake's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Keepsake error types.
///
/// Only write-path failures surface through this type: a failed persist
/// means the in-memory and on-disk copies of a domain have diverged, and
/// the caller must hear about it. Read-path failures (missing, corrupted or
/// undecryptable entries) never construct an `Error`; they degrade to
/// "value absent" with a logged warning so hydration falls back to the
/// domain's initial state instead of failing startup.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
