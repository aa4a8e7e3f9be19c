//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (DB ping)
//! GET  /api/status               - API status message
//!
//! # Auth (strict rate limit)
//! POST /api/auth/register        - Create an account, returns a token
//! POST /api/auth/login           - Login, returns a token
//! GET  /api/auth/me              - Current user
//! POST /api/auth/logout          - Revoke the presented token
//!
//! # Products
//! GET    /api/products           - Catalog listing (filters + pagination)
//! GET    /api/products/{id}      - Product detail
//! POST   /api/products           - Create (admin)
//! PUT    /api/products/{id}      - Update (admin)
//! DELETE /api/products/{id}      - Delete (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart               - Reconciled cart
//! POST   /api/cart               - Add item
//! PUT    /api/cart/{item_id}     - Set line quantity
//! DELETE /api/cart/{item_id}     - Remove line
//! DELETE /api/cart               - Empty the cart
//!
//! # Orders (requires auth)
//! POST /api/orders               - Create from cart
//! GET  /api/orders               - Own orders, newest first
//! GET  /api/orders/admin/all     - All orders (admin)
//! GET  /api/orders/{id}          - One order (owner or admin)
//! PUT  /api/orders/{id}          - Set status (admin)
//! PUT  /api/orders/{id}/cancel   - Cancel before shipping
//!
//! # Payment (requires auth)
//! POST /api/payment/verify       - Verify gateway signature, mark paid
//! POST /api/payment/mock         - Mark paid without a gateway
//! ```

pub mod auth;
pub mod cart;
pub mod envelope;
pub mod orders;
pub mod payment;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::routes::envelope::Envelope;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/{item_id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::mine))
        .route("/admin/all", get(orders::all))
        .route("/{id}", get(orders::show).put(orders::set_status))
        .route("/{id}/cancel", put(orders::cancel))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(payment::verify))
        .route("/mock", post(payment::mock))
}

/// `GET /api/status`
pub async fn status() -> Envelope<()> {
    Envelope::message("API is running")
}

/// `GET /health`: liveness only, no dependency checks.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /health/ready`: verifies database connectivity.
pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
