//! Request bodies accepted by the review operations

use kudos_db::ReviewId;
use serde::Deserialize;

/// A review id as a client sent it: a JSON number or a string.
///
/// Strings that are not integers cannot name a stored review, so they
/// resolve to `None` instead of being passed on to storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReviewIdInput {
    Number(i64),
    Text(String),
}

impl ReviewIdInput {
    pub fn resolve(&self) -> Option<ReviewId> {
        match self {
            ReviewIdInput::Number(n) => Some(ReviewId::new(*n)),
            ReviewIdInput::Text(s) => s.trim().parse::<i64>().ok().map(ReviewId::new),
        }
    }
}

impl From<ReviewId> for ReviewIdInput {
    fn from(id: ReviewId) -> Self {
        ReviewIdInput::Number(id.get())
    }
}

/// Body of `PUT /rest/products/{id}/reviews`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub message: String,
    pub author: String,
}

/// Body of `PATCH /rest/products/reviews`
#[derive(Debug, Clone, Deserialize)]
pub struct EditReview {
    pub id: ReviewIdInput,
    pub message: String,
}

/// Body of `POST /rest/products/reviews`
#[derive(Debug, Clone, Deserialize)]
pub struct LikeReview {
    pub id: ReviewIdInput,
}
