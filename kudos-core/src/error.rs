//! Error types for Kudos

use thiserror::Error;

/// Result type alias for Kudos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Kudos operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Review storage error
    #[error("Storage error: {0}")]
    Store(#[from] kudos_db::StoreError),
}
