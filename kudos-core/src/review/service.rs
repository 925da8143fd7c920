//! Review operations with authorization applied.
//!
//! Every write runs its guards first and only then touches the store, so a
//! rejected request never leaves a partial mutation behind.

use std::sync::Arc;

use kudos_db::{
    NewReview, ProductFilter, ProductId, Review, ReviewMessage, ReviewStore, StoreError,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::request::{CreateReview, EditReview, ReviewIdInput};
use crate::auth::{
    authorize_author, authorize_edit, require_identity, AuthError, EditPolicy, Identity,
    TokenVerifier,
};
use crate::config::SeedReview;

/// Errors returned by [`ReviewService`]
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Referenced review does not exist
    #[error("Review not found: {0}")]
    NotFound(String),

    /// Request data that can never be stored
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::NotFound(id.to_string()),
            other => ServiceError::Store(other),
        }
    }
}

/// Result type alias for review operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Entry point for listing, creating, editing and liking reviews
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
    verifier: Arc<dyn TokenVerifier>,
    edit_policy: EditPolicy,
}

impl ReviewService {
    pub fn new(store: Arc<dyn ReviewStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            edit_policy: EditPolicy::default(),
        }
    }

    pub fn with_edit_policy(mut self, edit_policy: EditPolicy) -> Self {
        self.edit_policy = edit_policy;
        self
    }

    pub fn store(&self) -> &Arc<dyn ReviewStore> {
        &self.store
    }

    /// Resolve an optional bearer token; unknown tokens count as absent
    fn identify(&self, token: Option<&str>) -> Option<Identity> {
        token.and_then(|token| self.verifier.verify(token))
    }

    /// The signed-in caller, or [`AuthError::MissingCredentials`].
    ///
    /// Transports call this before decoding an edit or like body so an
    /// anonymous request is refused the same way whatever it carries.
    pub fn authenticate(&self, token: Option<&str>) -> ServiceResult<Identity> {
        Ok(require_identity(self.identify(token))?)
    }

    /// Reviews for the product named by `raw_product`.
    ///
    /// Text that is not an integer matches nothing.
    #[instrument(skip(self))]
    pub async fn list(&self, raw_product: &str) -> ServiceResult<Vec<Review>> {
        let filter = ProductFilter::parse(raw_product);
        if filter == ProductFilter::NoMatch {
            warn!("Non-numeric product id, returning no reviews");
        }
        Ok(self.store.list_by_product(&filter).await?)
    }

    /// Create a review. Anonymous callers may use any author name; signed-in
    /// callers must post under their own identity.
    #[instrument(skip(self, request, token), fields(author = %request.author))]
    pub async fn create(
        &self,
        raw_product: &str,
        request: CreateReview,
        token: Option<&str>,
    ) -> ServiceResult<Review> {
        let identity = self.identify(token);
        if let Err(err) = authorize_author(&request.author, identity.as_ref()) {
            warn!(user = ?identity.as_ref().map(Identity::email), "Refused review under another author");
            return Err(err.into());
        }

        let product_id = raw_product
            .parse::<ProductId>()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        let message =
            ReviewMessage::new(request.message).map_err(|e| ServiceError::Validation(e.to_string()))?;

        let review = self
            .store
            .create(NewReview::new(product_id, message, request.author))
            .await?;

        info!(review = %review.id, product = %review.product_id, "Created review");
        Ok(review)
    }

    /// Replace a review's message. Requires a signed-in caller; under
    /// [`EditPolicy::Owner`] the caller must also be the author.
    #[instrument(skip(self, request, token))]
    pub async fn edit(&self, request: EditReview, token: Option<&str>) -> ServiceResult<Review> {
        let identity = self.authenticate(token).inspect_err(|_| {
            warn!("Refused unauthenticated review edit");
        })?;

        let id = request
            .id
            .resolve()
            .ok_or_else(|| ServiceError::NotFound(describe(&request.id)))?;
        let message =
            ReviewMessage::new(request.message).map_err(|e| ServiceError::Validation(e.to_string()))?;

        if self.edit_policy == EditPolicy::Owner {
            let current = self.store.find_by_id(id).await?;
            if let Err(err) = authorize_edit(self.edit_policy, &current.author, &identity) {
                warn!(user = %identity, review = %id, "Refused edit by non-author");
                return Err(err.into());
            }
        }

        let review = self.store.update_message(id, message).await?;
        info!(user = %identity, review = %id, "Edited review");
        Ok(review)
    }

    /// Add one like to a review and return the updated record
    #[instrument(skip(self, token))]
    pub async fn like(&self, id: &ReviewIdInput, token: Option<&str>) -> ServiceResult<Review> {
        let identity = self.authenticate(token).inspect_err(|_| {
            warn!("Refused unauthenticated like");
        })?;

        let id = id
            .resolve()
            .ok_or_else(|| ServiceError::NotFound(describe(id)))?;

        let review = self.store.increment_likes(id).await?;
        info!(user = %identity, review = %id, likes = review.likes_count, "Liked review");
        Ok(review)
    }

    /// Insert `seeds` if the store holds no reviews yet; returns how many were added
    pub async fn seed(&self, seeds: &[SeedReview]) -> ServiceResult<usize> {
        if self.store.count().await? > 0 {
            return Ok(0);
        }

        for seed in seeds {
            let message = ReviewMessage::new(seed.message.as_str())
                .map_err(|e| ServiceError::Validation(e.to_string()))?;
            self.store
                .create(NewReview::new(
                    ProductId::new(seed.product),
                    message,
                    seed.author.as_str(),
                ))
                .await?;
        }

        info!(count = seeds.len(), "Seeded reviews");
        Ok(seeds.len())
    }
}

fn describe(input: &ReviewIdInput) -> String {
    match input {
        ReviewIdInput::Number(n) => n.to_string(),
        ReviewIdInput::Text(s) => s.clone(),
    }
}
