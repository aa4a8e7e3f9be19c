//! Domain services.
//!
//! Services own the multi-step logic the route handlers delegate to:
//! cart reconciliation, checkout orchestration, payment confirmation, and
//! account/token management. Each service wraps the repositories it needs
//! and exposes its own error type.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod payment;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService, reconcile};
pub use checkout::{OrderError, OrderService};
pub use payment::{PaymentError, PaymentService};
