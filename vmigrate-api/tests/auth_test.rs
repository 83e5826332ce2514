//! Integration tests for authentication middleware
//!
//! Tests that the auth middleware correctly extracts the caller identity
//! from proxy headers and rejects anonymous requests.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceExt; // for `oneshot`
use vmigrate_api::auth::{auth_middleware, AuthenticatedUser};

// Simple handler that returns the authenticated user info
async fn test_handler(
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "username": user.username,
        "email": user.email,
    }))
}

// Create a test app with auth middleware
fn create_test_app() -> Router {
    Router::new()
        .route("/protected", get(test_handler))
        .layer(middleware::from_fn(auth_middleware))
}

async fn send(headers: &[(&str, &str)]) -> axum::http::Response<Body> {
    let mut builder = Request::builder().uri("/protected");
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }

    create_test_app()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_valid_x_user_header_passes() {
    let response = send(&[("x-user", "testuser")]).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = common::extract_json_body(response).await;
    assert_eq!(json["username"], "testuser");
    assert!(json["email"].is_null());
}

#[tokio::test]
async fn test_valid_x_vmigrate_user_header_passes() {
    let response = send(&[("x-vmigrate-user", "operator")]).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = common::extract_json_body(response).await;
    assert_eq!(json["username"], "operator");
}

#[tokio::test]
async fn test_x_forwarded_user_header_works() {
    let response = send(&[("x-forwarded-user", "forwardeduser")]).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = common::extract_json_body(response).await;
    assert_eq!(json["username"], "forwardeduser");
}

#[tokio::test]
async fn test_missing_user_header_returns_401() {
    let response = send(&[]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_email_headers_are_extracted() {
    let response = send(&[("x-user", "testuser"), ("x-vmigrate-email", "ops@example.com")]).await;
    let json: serde_json::Value = common::extract_json_body(response).await;
    assert_eq!(json["email"], "ops@example.com");

    let response = send(&[
        ("x-user", "testuser"),
        ("x-forwarded-email", "forwarded@example.com"),
    ])
    .await;
    let json: serde_json::Value = common::extract_json_body(response).await;
    assert_eq!(json["email"], "forwarded@example.com");
}

#[tokio::test]
async fn test_header_priority() {
    // x-vmigrate-user should take priority over x-forwarded-user and x-user
    let response = send(&[
        ("x-vmigrate-user", "operator"),
        ("x-forwarded-user", "forwardeduser"),
        ("x-user", "fallbackuser"),
    ])
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = common::extract_json_body(response).await;
    assert_eq!(json["username"], "operator");
}

#[tokio::test]
async fn test_empty_header_value_returns_401() {
    let response = send(&[("x-user", "")]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_utf8_header_returns_401() {
    let request = Request::builder()
        .uri("/protected")
        .header("x-user", &b"\xFF\xFE"[..]) // Invalid UTF-8
        .body(Body::empty())
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_routes_require_identity() {
    let (client, _pool) = common::TestClient::new_with_db().await;

    for uri in [
        "/api/v1/migrations",
        "/api/v1/credentials",
        "/api/v1/mount_points",
        "/api/v1/work_loads",
        "/api/v1/migration_targets",
        "/api/v1/migrations/some-id/state",
    ] {
        let response = client.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = client
        .post("/api/v1/migrations/some-id/run", &serde_json::json!({}), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health stays public
    let response = client.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
