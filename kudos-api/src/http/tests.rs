//! HTTP API tests driving the router in-process.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use kudos_core::auth::{AccountDirectory, EditPolicy};
use kudos_core::config::{AuthConfig, ReviewsConfig};
use kudos_core::{LoginService, ReviewService, SessionTokens};
use kudos_db::{MemoryReviewStore, ReviewStore};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

use super::routes::{create_router, create_router_with_body_limit};
use super::state::AppState;

struct TestApp {
    router: Router,
    store: Arc<MemoryReviewStore>,
}

/// Helper to create a test app with a seeded in-memory store.
async fn test_app_with(edit_policy: EditPolicy, body_limit: Option<usize>) -> TestApp {
    let store = Arc::new(MemoryReviewStore::new());
    let sessions = Arc::new(SessionTokens::new());
    let reviews =
        ReviewService::new(store.clone(), sessions.clone()).with_edit_policy(edit_policy);
    reviews
        .seed(&ReviewsConfig::default().seed_reviews)
        .await
        .unwrap();
    let login = LoginService::new(
        AccountDirectory::new(AuthConfig::default().accounts),
        sessions,
    );

    let state = AppState::new(reviews, login);
    let router = match body_limit {
        Some(limit) => create_router_with_body_limit(state, limit),
        None => create_router(state),
    };
    TestApp { router, store }
}

async fn test_app() -> TestApp {
    test_app_with(EditPolicy::Authenticated, None).await
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, content_type, json)
}

async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/rest/user/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["authentication"]["token"].as_str().unwrap().to_string()
}

async fn login_bjoern(app: &TestApp) -> String {
    login(
        app,
        "bjoern.kimminich@gmail.com",
        "bW9jLmxpYW1nQGhjaW5pbW1pay5ucmVvamI=",
    )
    .await
}

async fn first_review_id(app: &TestApp) -> i64 {
    let (_, _, body) = send(app, Method::GET, "/rest/products/1/reviews", None, None).await;
    body["data"][0]["id"].as_i64().unwrap()
}

fn assert_json(content_type: &Option<String>) {
    assert!(
        content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json")),
        "unexpected content type {content_type:?}"
    );
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;

    let (status, _, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_product_reviews() {
    let app = test_app().await;

    let (status, content_type, body) =
        send(&app, Method::GET, "/rest/products/1/reviews", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_json(&content_type);
    let data = body["data"].as_array().unwrap();
    assert!(!data.is_empty());
    for review in data {
        assert!(review["id"].is_i64());
        assert_eq!(review["_id"], review["id"]);
        assert_eq!(review["product"], 1);
        assert!(review["message"].is_string());
        assert!(review["author"].is_string());
        assert!(review["likesCount"].is_u64());
    }
}

#[tokio::test]
async fn test_get_reviews_with_injected_sleep_command() {
    let app = test_app().await;

    let started = std::time::Instant::now();
    let (status, content_type, body) = send(
        &app,
        Method::GET,
        "/rest/products/sleep(1)/reviews",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_json(&content_type);
    assert_eq!(body["data"], json!([]));
    assert!(started.elapsed() < std::time::Duration::from_secs(1));
}

#[tokio::test]
async fn test_get_reviews_with_encoded_operator_injection() {
    let app = test_app().await;

    let (status, _, body) = send(
        &app,
        Method::GET,
        "/rest/products/%7B%22%24ne%22%3A-1%7D/reviews",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_put_anonymous_review_is_created() {
    let app = test_app().await;
    let before = app.store.count().await.unwrap();

    let (status, content_type, _) = send(
        &app,
        Method::PUT,
        "/rest/products/1/reviews",
        None,
        Some(json!({ "message": "Lorem Ipsum", "author": "Anonymous" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_json(&content_type);
    assert_eq!(app.store.count().await.unwrap(), before + 1);

    let (_, _, body) = send(&app, Method::GET, "/rest/products/1/reviews", None, None).await;
    let last = body["data"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["message"], "Lorem Ipsum");
    assert_eq!(last["author"], "Anonymous");
    assert_eq!(last["likesCount"], 0);
}

#[tokio::test]
async fn test_put_review_under_another_users_name_is_refused() {
    let app = test_app().await;
    let token = login(&app, "jim@guardian.com", "ncc-1701").await;
    let before = app.store.count().await.unwrap();

    let (status, content_type, body) = send(
        &app,
        Method::PUT,
        "/rest/products/2/reviews",
        Some(&token),
        Some(json!({ "message": "Lorem Ipsum", "author": "admin@guardian.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_json(&content_type);
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(app.store.count().await.unwrap(), before);
}

#[tokio::test]
async fn test_put_review_as_self_is_created() {
    let app = test_app().await;
    let token = login(&app, "admin@guardian.com", "admin123").await;

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/rest/products/2/reviews",
        Some(&token),
        Some(json!({ "message": "Mine", "author": "admin@guardian.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_put_review_validation() {
    let app = test_app().await;
    let before = app.store.count().await.unwrap();

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/rest/products/sleep(1)/reviews",
        None,
        Some(json!({ "message": "x", "author": "Anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/rest/products/1/reviews",
        None,
        Some(json!({ "message": "", "author": "Anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/rest/products/1/reviews",
        None,
        Some(json!({ "author": "Anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    assert_eq!(app.store.count().await.unwrap(), before);
}

#[tokio::test]
async fn test_patch_review_needs_authenticated_user() {
    let app = test_app().await;
    let id = first_review_id(&app).await;

    let (status, content_type, _) = send(
        &app,
        Method::PATCH,
        "/rest/products/reviews",
        None,
        Some(json!({ "id": id, "message": "Lorem Ipsum" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_json(&content_type);

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/rest/products/reviews",
        Some("forged-token"),
        Some(json!({ "id": id, "message": "Lorem Ipsum" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, _, body) = send(&app, Method::GET, "/rest/products/1/reviews", None, None).await;
    assert_ne!(body["data"][0]["message"], "Lorem Ipsum");
}

#[tokio::test]
async fn test_patch_review_when_authenticated() {
    let app = test_app().await;
    let id = first_review_id(&app).await;
    let token = login_bjoern(&app).await;

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        "/rest/products/reviews",
        Some(&token),
        Some(json!({ "id": id.to_string(), "message": "Lorem Ipsum" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["_id"], id);
    assert_eq!(body["data"]["message"], "Lorem Ipsum");
}

#[tokio::test]
async fn test_anonymous_edit_and_like_are_refused_whatever_the_body() {
    let app = test_app().await;

    let edits = [
        json!({ "message": "Lorem Ipsum" }),
        json!({ "id": { "$ne": -1 }, "message": "x" }),
        json!({ "id": 1 }),
    ];
    for body in edits {
        let (status, content_type, response) = send(
            &app,
            Method::PATCH,
            "/rest/products/reviews",
            None,
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "PATCH {body}");
        assert_json(&content_type);
        assert_eq!(response["code"], "unauthenticated");
    }

    for body in [Some(json!({})), None] {
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/rest/products/reviews",
            None,
            body.clone(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "POST {body:?}");
    }

    let (_, _, body) = send(&app, Method::GET, "/rest/products/1/reviews", None, None).await;
    assert_eq!(body["data"][0]["likesCount"], 0);
}

#[tokio::test]
async fn test_authenticated_malformed_bodies_are_bad_requests() {
    let app = test_app().await;
    let token = login_bjoern(&app).await;

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        "/rest/products/reviews",
        Some(&token),
        Some(json!({ "message": "Lorem Ipsum" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/rest/products/reviews",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_review_owner_policy() {
    let app = test_app_with(EditPolicy::Owner, None).await;
    // the first seeded review on product 1 belongs to admin@guardian.com
    let id = first_review_id(&app).await;

    let intruder = login_bjoern(&app).await;
    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/rest/products/reviews",
        Some(&intruder),
        Some(json!({ "id": id, "message": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let owner = login(&app, "admin@guardian.com", "admin123").await;
    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/rest/products/reviews",
        Some(&owner),
        Some(json!({ "id": id, "message": "updated by owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_patch_missing_review_is_not_found() {
    let app = test_app().await;
    let token = login_bjoern(&app).await;

    let (status, _, _) = send(
        &app,
        Method::PATCH,
        "/rest/products/reviews",
        Some(&token),
        Some(json!({ "id": "does not exist", "message": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_non_existing_review_cannot_be_liked() {
    let app = test_app().await;
    let token = login_bjoern(&app).await;

    let (status, content_type, body) = send(
        &app,
        Method::POST,
        "/rest/products/reviews",
        Some(&token),
        Some(json!({ "id": "does not exist" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json(&content_type);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_post_review_can_be_liked() {
    let app = test_app().await;
    let id = first_review_id(&app).await;
    let token = login_bjoern(&app).await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/rest/products/reviews",
        Some(&token),
        Some(json!({ "id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likesCount"], 1);

    let (_, _, body) = send(
        &app,
        Method::POST,
        "/rest/products/reviews",
        Some(&token),
        Some(json!({ "id": id })),
    )
    .await;
    assert_eq!(body["likesCount"], 2);
}

#[tokio::test]
async fn test_like_needs_authenticated_user() {
    let app = test_app().await;
    let id = first_review_id(&app).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/rest/products/reviews",
        None,
        Some(json!({ "id": id })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, _, body) = send(&app, Method::GET, "/rest/products/1/reviews", None, None).await;
    assert_eq!(body["data"][0]["likesCount"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_over_http() {
    let app = Arc::new(test_app().await);
    let id = first_review_id(&app).await;
    let token = login_bjoern(&app).await;

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let app = Arc::clone(&app);
            let token = token.clone();
            tokio::spawn(async move {
                send(
                    &app,
                    Method::POST,
                    "/rest/products/reviews",
                    Some(&token),
                    Some(json!({ "id": id })),
                )
                .await
                .0
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, _, body) = send(&app, Method::GET, "/rest/products/1/reviews", None, None).await;
    assert_eq!(body["data"][0]["likesCount"], 32);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = test_app().await;

    let (status, content_type, body) = send(
        &app,
        Method::POST,
        "/rest/user/login",
        None,
        Some(json!({ "email": "admin@guardian.com", "password": "nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_json(&content_type);
    assert_eq!(body["code"], "invalid_credentials");
}

#[tokio::test]
async fn test_login_returns_token_and_email() {
    let app = test_app().await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/rest/user/login",
        None,
        Some(json!({ "email": "admin@guardian.com", "password": "admin123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["authentication"]["token"].is_string());
    assert_eq!(body["authentication"]["umail"], "admin@guardian.com");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = test_app_with(EditPolicy::Authenticated, Some(256)).await;
    let before = app.store.count().await.unwrap();

    let (status, content_type, _) = send(
        &app,
        Method::PUT,
        "/rest/products/1/reviews",
        None,
        Some(json!({ "message": "x".repeat(1024), "author": "Anonymous" })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_json(&content_type);
    assert_eq!(app.store.count().await.unwrap(), before);
}

#[tokio::test]
async fn test_declared_oversized_body_gets_json_413() {
    let app = test_app_with(EditPolicy::Authenticated, Some(256)).await;
    let payload = json!({ "message": "x".repeat(1024), "author": "Anonymous" }).to_string();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/rest/products/1/reviews")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    assert_json(&content_type);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "payload_too_large");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = test_app().await;

    let (status, content_type, body) =
        send(&app, Method::GET, "/rest/nothing-here", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json(&content_type);
    assert_eq!(body["code"], "route_not_found");
}
