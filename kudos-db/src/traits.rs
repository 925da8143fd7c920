//! Storage abstraction for reviews

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewReview, ProductFilter, Review, ReviewId, ReviewMessage};

/// Keyed collection of reviews.
///
/// Implementations must apply `update_message` and `increment_likes`
/// atomically per record: concurrent calls on the same id never lose an
/// update and readers never observe a half-written review.
#[async_trait]
pub trait ReviewStore: Send + Sync + 'static {
    /// All reviews for a product, ordered by id. `NoMatch` yields an empty list.
    async fn list_by_product(&self, filter: &ProductFilter) -> Result<Vec<Review>>;

    /// Store a new review with a fresh id and zero likes.
    async fn create(&self, review: NewReview) -> Result<Review>;

    async fn find_by_id(&self, id: ReviewId) -> Result<Review>;

    /// Replace the message, leaving author, product and likes untouched.
    async fn update_message(&self, id: ReviewId, message: ReviewMessage) -> Result<Review>;

    /// Add exactly one like and return the updated record.
    async fn increment_likes(&self, id: ReviewId) -> Result<Review>;

    /// Number of stored reviews.
    async fn count(&self) -> Result<u64>;
}
