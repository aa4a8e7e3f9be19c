//! Authentication extractors.
//!
//! Route handlers take `CurrentUser` (any authenticated user) or
//! `RequireAdmin` (admin role) as arguments; both resolve the bearer token
//! from the `Authorization` header against the token store.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::error::ApiError;
use crate::models::user::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("hello, {}", user.name)
/// }
/// ```
pub struct CurrentUser(pub User);

/// Extractor that requires an authenticated admin.
pub struct RequireAdmin(pub User);

/// Pull the bearer token out of the `Authorization` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(ApiError::Unauthorized(
                "missing or malformed Authorization header".to_string(),
            ));
        };

        let auth = AuthService::new(state.pool(), state.config().token_ttl_days);
        let user = auth
            .authenticate(token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("invalid or expired token".to_string()))?;

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }

        Ok(Self(user))
    }
}
