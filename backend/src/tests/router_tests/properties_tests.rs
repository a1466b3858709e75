use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::store::StoreError;
use crate::tests::support::{self, AlwaysCollidingStore, FailingStore, MemoryStore};

#[tokio::test]
async fn listing_feed_returns_stored_properties() {
    let store = Arc::new(MemoryStore::new());
    support::seed_listing(&store, "sell");
    support::seed_listing(&store, "rent");
    let app = crate::app(support::test_state(store));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/properties")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = support::body_json(response).await;
    let items = body.as_array().expect("Expected an array");
    assert_eq!(items.len(), 2);
    // Newest submission first.
    assert_eq!(items[0]["code"], "R-RJN-0001");
    assert_eq!(items[1]["code"], "S-RJN-0001");
    assert_eq!(items[0]["contactName"], "Ramesh Verma");
}

#[tokio::test]
async fn property_detail_is_returned_by_id() {
    let store = Arc::new(MemoryStore::new());
    let listing = support::seed_listing(&store, "sell");
    let app = crate::app(support::test_state(store));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/properties/{}", listing.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = support::body_json(response).await;
    assert_eq!(body["id"], json!(listing.id));
    assert_eq!(body["code"], "S-RJN-0001");
    assert_eq!(body["verified"], json!(false));
}

#[tokio::test]
async fn unknown_property_id_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let app = crate::app(support::test_state(store));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/properties/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = support::body_json(response).await;
    assert_eq!(body["error"], "Listing not found");
}

#[tokio::test]
async fn non_uuid_property_id_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let app = crate::app(support::test_state(store));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/properties/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submitting_a_property_requires_a_token() {
    let store = Arc::new(MemoryStore::new());
    let app = crate::app(support::test_state(store));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/properties")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(support::listing_payload("sell").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = support::body_json(response).await;
    assert_eq!(body["error"], "Missing Authorization header");
}

#[tokio::test]
async fn submissions_get_sequential_codes_and_token_owner() {
    let store = Arc::new(MemoryStore::new());
    let app = crate::app(support::test_state(store));
    let token = support::bearer_token("seller@example.com");

    for expected in ["S-RJN-0001", "S-RJN-0002"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/properties")
                    .header(header::AUTHORIZATION, token.as_str())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(support::listing_payload("sell").to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = support::body_json(response).await;
        assert_eq!(body["code"], expected);
        assert_eq!(body["ownerEmail"], "seller@example.com");
        assert_eq!(body["purpose"], "SELL");
    }
}

#[tokio::test]
async fn missing_images_field_defaults_to_empty() {
    let store = Arc::new(MemoryStore::new());
    let app = crate::app(support::test_state(store));
    let token = support::bearer_token("seller@example.com");

    let mut payload = support::listing_payload("sell");
    payload.as_object_mut().unwrap().remove("images");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/properties")
                .header(header::AUTHORIZATION, token.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = support::body_json(response).await;
    assert_eq!(body["images"], json!([]));
}

#[tokio::test]
async fn invalid_purpose_is_rejected_with_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let app = crate::app(support::test_state(store.clone()));
    let token = support::bearer_token("seller@example.com");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/properties")
                .header(header::AUTHORIZATION, token.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(support::listing_payload("lease").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("Missing error message")
        .contains("invalid purpose"));
    assert_eq!(store.listing_count(), 0);
}

#[tokio::test]
async fn malformed_phone_number_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let app = crate::app(support::test_state(store));
    let token = support::bearer_token("seller@example.com");

    let mut payload = support::listing_payload("sell");
    payload["contactPhone"] = json!("12345");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/properties")
                .header(header::AUTHORIZATION, token.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(response).await;
    assert_eq!(body["error"], "Contact phone must be exactly 10 digits");
}

#[tokio::test]
async fn exhausted_issuance_maps_to_service_unavailable() {
    let store = Arc::new(AlwaysCollidingStore::new());
    let app = crate::app(support::test_state(store.clone()));
    let token = support::bearer_token("seller@example.com");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/properties")
                .header(header::AUTHORIZATION, token.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(support::listing_payload("sell").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = support::body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("Missing error message")
        .contains("resubmit"));
    assert_eq!(store.listing_count(), 0, "Nothing may be persisted");
}

#[tokio::test]
async fn store_connection_failure_maps_to_service_unavailable() {
    let store = Arc::new(FailingStore::new(|| {
        StoreError::Connection("connection refused".to_string())
    }));
    let app = crate::app(support::test_state(store));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/properties")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = support::body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("Missing error message")
        .contains("connection"));
}

#[tokio::test]
async fn store_query_failure_maps_to_internal_error() {
    let store = Arc::new(FailingStore::new(|| {
        StoreError::Query("relation does not exist".to_string())
    }));
    let app = crate::app(support::test_state(store));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/properties")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = support::body_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("Missing error message")
        .contains("query failed"));
}

#[tokio::test]
async fn fatal_count_failure_during_submission_is_service_unavailable() {
    let store = Arc::new(FailingStore::new(|| {
        StoreError::Connection("connection refused".to_string())
    }));
    let app = crate::app(support::test_state(store));
    let token = support::bearer_token("seller@example.com");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/properties")
                .header(header::AUTHORIZATION, token.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(support::listing_payload("sell").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
