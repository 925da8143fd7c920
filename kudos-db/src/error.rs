//! Error types for review storage

use thiserror::Error;

use crate::models::ReviewId;

/// Storage error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No review with the given id
    #[error("Review not found: {0}")]
    NotFound(ReviewId),
}

impl StoreError {
    /// Whether this error means the referenced review does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;
