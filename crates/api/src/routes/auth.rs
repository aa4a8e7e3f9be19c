//! Authentication route handlers.

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::middleware::auth::bearer_token;
use crate::models::user::User;
use crate::routes::envelope::Envelope;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User plus their freshly issued bearer token.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: User,
    pub token: String,
}

/// `POST /api/auth/register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Envelope<AuthData>> {
    let auth = AuthService::new(state.pool(), state.config().token_ttl_days);
    let (user, token) = auth.register(&req.name, &req.email, &req.password).await?;

    Ok(Envelope::created(AuthData {
        user,
        token: token.0,
    }))
}

/// `POST /api/auth/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Envelope<AuthData>> {
    let auth = AuthService::new(state.pool(), state.config().token_ttl_days);
    let (user, token) = auth.login(&req.email, &req.password).await?;

    Ok(Envelope::ok(AuthData {
        user,
        token: token.0,
    }))
}

/// `GET /api/auth/me`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(CurrentUser(user): CurrentUser) -> Envelope<User> {
    Envelope::ok(user)
}

/// `POST /api/auth/logout`
///
/// Revokes the presented token. The `CurrentUser` extractor has already
/// validated it, so the header is present and well-formed here.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Envelope<()>> {
    if let Some(token) = bearer_token(&headers) {
        let auth = AuthService::new(state.pool(), state.config().token_ttl_days);
        auth.logout(token).await?;
    }

    Ok(Envelope::message("logged out"))
}
