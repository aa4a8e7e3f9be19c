//! Request middleware: authentication extractors and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::{CurrentUser, RequireAdmin};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
