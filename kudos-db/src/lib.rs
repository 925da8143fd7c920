//! Review storage for Kudos
//!
//! Defines the review record, the typed ids used to address it, and the
//! [`ReviewStore`] trait with in-memory and SQLite implementations.

pub mod error;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryReviewStore;
pub use models::{
    EmptyMessage, InvalidProductId, NewReview, ProductFilter, ProductId, Review, ReviewId,
    ReviewMessage,
};
pub use sqlite::{DatabaseConfig, SqliteReviewStore};
pub use traits::ReviewStore;
