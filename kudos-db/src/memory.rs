//! In-memory review store.
//!
//! Records live in a `DashMap`; mutations go through `get_mut`, which holds
//! the shard's write lock for the duration of the update, so likes and edits
//! on one review are serialized while unrelated reviews proceed in parallel.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};
use crate::models::{NewReview, ProductFilter, Review, ReviewId, ReviewMessage};
use crate::traits::ReviewStore;

/// Process-local implementation of [`ReviewStore`]
#[derive(Debug)]
pub struct MemoryReviewStore {
    reviews: DashMap<ReviewId, Review>,
    next_id: AtomicI64,
}

impl Default for MemoryReviewStore {
    fn default() -> Self {
        Self {
            reviews: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    #[instrument(skip(self))]
    async fn list_by_product(&self, filter: &ProductFilter) -> Result<Vec<Review>> {
        let Some(product_id) = filter.product() else {
            return Ok(Vec::new());
        };

        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|entry| entry.product_id == product_id)
            .map(|entry| entry.value().clone())
            .collect();
        reviews.sort_by_key(|r| r.id);

        debug!(product = %product_id, count = reviews.len(), "Listed reviews");
        Ok(reviews)
    }

    #[instrument(skip_all, fields(product = %review.product_id))]
    async fn create(&self, review: NewReview) -> Result<Review> {
        let id = ReviewId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let review = review.into_review(id, Utc::now());
        self.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Review> {
        self.reviews
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self, message))]
    async fn update_message(&self, id: ReviewId, message: ReviewMessage) -> Result<Review> {
        let mut entry = self.reviews.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entry.message = message.into_inner();
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    #[instrument(skip(self))]
    async fn increment_likes(&self, id: ReviewId) -> Result<Review> {
        let mut entry = self.reviews.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entry.likes_count = entry.likes_count.saturating_add(1);
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.reviews.len() as u64)
    }
}
