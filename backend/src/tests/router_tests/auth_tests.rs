use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use crate::tests::support::{self, MemoryStore};

fn save_user_request(auth_header: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from("{}")).unwrap()
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let app = crate::app(support::test_state(Arc::new(MemoryStore::new())));

    let response = app.oneshot(save_user_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = support::body_json(response).await;
    assert_eq!(body["error"], "Missing Authorization header");
}

#[tokio::test]
async fn non_bearer_header_is_unauthorized() {
    let app = crate::app(support::test_state(Arc::new(MemoryStore::new())));

    let response = app
        .oneshot(save_user_request(Some("Token abc123")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = support::body_json(response).await;
    assert_eq!(body["error"], "Invalid Authorization header format");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = crate::app(support::test_state(Arc::new(MemoryStore::new())));

    let response = app
        .oneshot(save_user_request(Some("Bearer not.a.jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = support::body_json(response).await;
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn admin_routes_also_require_authentication() {
    let app = crate::app(support::test_state(Arc::new(MemoryStore::new())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/properties")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
