//! Review records and the typed values used to address them

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a product that reviews are attached to.
///
/// Only ever built from a well-formed integer, so a value of this type is
/// always safe to use as a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// Product id text that is not a plain integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("product id must be an integer")]
pub struct InvalidProductId;

impl FromStr for ProductId {
    type Err = InvalidProductId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| InvalidProductId)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Filter for listing reviews by product.
///
/// Built from untrusted path text: anything that is not an integer becomes
/// [`ProductFilter::NoMatch`] and never reaches the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFilter {
    Product(ProductId),
    NoMatch,
}

impl ProductFilter {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<ProductId>() {
            Ok(id) => ProductFilter::Product(id),
            Err(_) => ProductFilter::NoMatch,
        }
    }

    pub fn product(&self) -> Option<ProductId> {
        match self {
            ProductFilter::Product(id) => Some(*id),
            ProductFilter::NoMatch => None,
        }
    }
}

impl From<ProductId> for ProductFilter {
    fn from(id: ProductId) -> Self {
        ProductFilter::Product(id)
    }
}

/// Store-assigned review identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(i64);

impl ReviewId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review text, guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewMessage(String);

/// Review text that is empty or whitespace only
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("review message must not be empty")]
pub struct EmptyMessage;

impl ReviewMessage {
    pub fn new(text: impl Into<String>) -> Result<Self, EmptyMessage> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EmptyMessage);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A stored product review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,

    #[serde(rename = "product")]
    pub product_id: ProductId,

    pub message: String,

    /// Verified email for signed-in authors, free text for anonymous ones
    pub author: String,

    pub likes_count: u64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a review; the store assigns id, counters and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub product_id: ProductId,
    pub message: ReviewMessage,
    pub author: String,
}

impl NewReview {
    pub fn new(product_id: ProductId, message: ReviewMessage, author: impl Into<String>) -> Self {
        Self {
            product_id,
            message,
            author: author.into(),
        }
    }

    /// Materialize the record a store keeps for this input
    pub(crate) fn into_review(self, id: ReviewId, now: DateTime<Utc>) -> Review {
        Review {
            id,
            product_id: self.product_id,
            message: self.message.into_inner(),
            author: self.author,
            likes_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
