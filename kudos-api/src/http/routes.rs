//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use kudos_core::auth::{Credentials, Session};
use kudos_core::review::{CreateReview, EditReview, LikeReview};
use kudos_db::{Review, ReviewId};
use serde::Serialize;
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;

use super::error::ApiError;
use super::extract::{BearerToken, JsonBadRequest};
use super::state::AppState;

/// Default request body size limit (64 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

type SharedState = Arc<AppState>;

/// A review as sent to clients: the record plus its id repeated as `_id`,
/// the key older clients read it from.
#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(rename = "_id")]
    pub legacy_id: ReviewId,
    #[serde(flatten)]
    pub review: Review,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            legacy_id: review.id,
            review,
        }
    }
}

/// `{"data": [...]}` envelope for review lists
#[derive(Debug, Serialize)]
pub struct ReviewList {
    pub data: Vec<ReviewView>,
}

/// `{"data": {...}}` envelope for a single review
#[derive(Debug, Serialize)]
pub struct ReviewEnvelope {
    pub data: ReviewView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub likes_count: u64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub authentication: Session,
}

fn api_routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/rest/products/:product_id/reviews",
            get(list_reviews).put(create_review),
        )
        .route(
            "/rest/products/reviews",
            post(like_review).patch(edit_review),
        )
        .route("/rest/user/login", post(login))
}

/// Creates the HTTP router with the default body size limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
pub fn create_router_with_body_limit(state: AppState, body_limit: usize) -> Router {
    api_routes()
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .with_state(Arc::new(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::from_fn(json_payload_too_large))
}

/// Rewrites the body limit layer's plain-text 413 into the JSON error shape.
async fn json_payload_too_large(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }
    ApiError::new(
        StatusCode::PAYLOAD_TOO_LARGE,
        "payload_too_large",
        "Request body is too large",
    )
    .into_response()
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn route_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "route_not_found", "No such endpoint")
}

async fn list_reviews(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
) -> Result<Json<ReviewList>, ApiError> {
    let reviews = state.reviews.list(&product_id).await?;
    Ok(Json(ReviewList {
        data: reviews.into_iter().map(ReviewView::from).collect(),
    }))
}

async fn create_review(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
    token: BearerToken,
    JsonBadRequest(body): JsonBadRequest<CreateReview>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .reviews
        .create(&product_id, body, token.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "status": "success" }))))
}

// Edit and like answer 401 before looking at the body, so the body
// extraction result is only inspected once the caller is known.
async fn edit_review(
    State(state): State<SharedState>,
    token: BearerToken,
    body: Result<JsonBadRequest<EditReview>, ApiError>,
) -> Result<Json<ReviewEnvelope>, ApiError> {
    state.reviews.authenticate(token.as_deref())?;
    let JsonBadRequest(body) = body?;

    let review = state.reviews.edit(body, token.as_deref()).await?;
    Ok(Json(ReviewEnvelope {
        data: review.into(),
    }))
}

async fn like_review(
    State(state): State<SharedState>,
    token: BearerToken,
    body: Result<JsonBadRequest<LikeReview>, ApiError>,
) -> Result<Json<LikeResponse>, ApiError> {
    state.reviews.authenticate(token.as_deref())?;
    let JsonBadRequest(body) = body?;

    let review = state.reviews.like(&body.id, token.as_deref()).await?;
    Ok(Json(LikeResponse {
        likes_count: review.likes_count,
    }))
}

async fn login(
    State(state): State<SharedState>,
    JsonBadRequest(credentials): JsonBadRequest<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let authentication = state.login.login(&credentials)?;
    Ok(Json(LoginResponse { authentication }))
}
