//! Cart route handlers.
//!
//! Every response returns the reconciled cart view, so the client never
//! needs a follow-up read after a mutation.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use copperleaf_core::ProductId;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::cart::CartView;
use crate::routes::envelope::Envelope;
use crate::services::CartService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// `GET /api/cart`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Envelope<CartView>> {
    let cart = CartService::new(state.pool()).get_cart(user.id).await?;
    Ok(Envelope::ok(cart))
}

/// `POST /api/cart`
#[instrument(skip_all, fields(user_id = %user.id, product_id = %req.product_id))]
pub async fn add(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> Result<Envelope<CartView>> {
    let cart = CartService::new(state.pool())
        .add_item(user.id, req.product_id, req.quantity)
        .await?;
    Ok(Envelope::ok(cart))
}

/// `PUT /api/cart/{item_id}`
#[instrument(skip_all, fields(user_id = %user.id, %item_id))]
pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Envelope<CartView>> {
    let cart = CartService::new(state.pool())
        .update_item(user.id, item_id, req.quantity)
        .await?;
    Ok(Envelope::ok(cart))
}

/// `DELETE /api/cart/{item_id}`
#[instrument(skip_all, fields(user_id = %user.id, %item_id))]
pub async fn remove(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Envelope<CartView>> {
    let cart = CartService::new(state.pool())
        .remove_item(user.id, item_id)
        .await?;
    Ok(Envelope::ok(cart))
}

/// `DELETE /api/cart`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Envelope<CartView>> {
    let cart = CartService::new(state.pool()).clear(user.id).await?;
    Ok(Envelope::ok(cart))
}
