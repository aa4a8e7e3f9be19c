//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use copperleaf_core::{OrderId, OrderStatus, PaymentMethod};

use crate::error::{ApiError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::order::{Order, ShippingAddress};
use crate::routes::envelope::Envelope;
use crate::services::OrderService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `POST /api/orders`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Envelope<Order>> {
    if let Some(field) = req.shipping_address.first_missing_field() {
        return Err(ApiError::Validation(format!(
            "shipping address is missing '{field}'"
        )));
    }

    let order = OrderService::new(state.pool())
        .create_order(user.id, req.shipping_address, req.payment_method)
        .await?;

    Ok(Envelope::created(order))
}

/// `GET /api/orders`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn mine(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Envelope<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_for_user(user.id).await?;
    Ok(Envelope::list(orders))
}

/// `GET /api/orders/admin/all` (admin)
#[instrument(skip_all)]
pub async fn all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Envelope<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_all().await?;
    Ok(Envelope::list(orders))
}

/// `GET /api/orders/{id}`: owner or admin.
#[instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
pub async fn show(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Envelope<Order>> {
    let order = OrderService::new(state.pool()).get_for_user(id, &user).await?;
    Ok(Envelope::ok(order))
}

/// `PUT /api/orders/{id}/cancel`: owner or admin, only before shipping.
#[instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
pub async fn cancel(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Envelope<Order>> {
    let order = OrderService::new(state.pool()).cancel(id, &user).await?;
    Ok(Envelope::ok(order))
}

/// `PUT /api/orders/{id}` (admin): move the order along its lifecycle.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn set_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Envelope<Order>> {
    let order = OrderService::new(state.pool())
        .set_status(id, req.status)
        .await?;
    Ok(Envelope::ok(order))
}
