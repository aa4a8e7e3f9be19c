//! Copperleaf API library.
//!
//! JSON REST backend for the Copperleaf shop: catalog, carts, orders, and
//! payment confirmation over `PostgreSQL`. The binary in `main.rs` wires
//! this up with Sentry and tracing; everything testable lives here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Maximum accepted request body, in bytes. All payloads are small JSON.
const BODY_LIMIT: usize = 10 * 1024;

/// Build the CORS layer from configuration.
///
/// A configured origin is enforced; otherwise any origin is allowed, which
/// suits local development where the SPA runs on its own port.
fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    match state
        .config()
        .cors_allow_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    }
}

/// Build the application router.
///
/// Serve with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// rate limiters can fall back to the peer address.
#[must_use]
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest(
            "/auth",
            routes::auth_routes().layer(middleware::auth_rate_limiter()),
        )
        .nest("/products", routes::product_routes())
        .nest("/cart", routes::cart_routes())
        .nest("/orders", routes::order_routes())
        .nest("/payment", routes::payment_routes())
        .route("/status", get(routes::status))
        .layer(middleware::api_rate_limiter());

    // The SPA is served for any non-API path, with index.html as the
    // client-side-routing fallback.
    let spa = ServeDir::new("crates/api/static")
        .not_found_service(ServeFile::new("crates/api/static/index.html"));

    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::health_ready))
        .nest("/api", api)
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
