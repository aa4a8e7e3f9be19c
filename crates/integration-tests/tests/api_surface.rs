//! Routing, auth rejection, and envelope shape tests.
//!
//! Everything here stops before the database: either the route has no
//! query, or the request is rejected by an extractor first.

use axum::body::{Body, to_bytes};
use axum::http::StatusCode;
use serde_json::Value;
use tower::ServiceExt;

use copperleaf_integration_tests::{request, test_app};

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, 64 * 1024).await.expect("read body");
    serde_json::from_slice(&bytes).expect("valid JSON body")
}

#[tokio::test]
async fn test_health_is_open() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/health")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_envelope() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/api/status")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_cart_requires_auth() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/api/cart")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_malformed_authorization_header_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/api/orders")
                .header("authorization", "Token not-a-bearer")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_creation_requires_auth() {
    let app = test_app();

    let response = app
        .oneshot(
            request("POST", "/api/orders")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_order_listing_requires_auth() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/api/orders/admin/all")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_payment_verify_requires_auth() {
    let app = test_app();

    let response = app
        .oneshot(
            request("POST", "/api/payment/verify")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_api_route_is_not_found() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/api/does-not-exist")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("infallible");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
