//! Review operations exposed to the transport layer

pub mod request;
pub mod service;

pub use request::{CreateReview, EditReview, LikeReview, ReviewIdInput};
pub use service::{ReviewService, ServiceError, ServiceResult};
