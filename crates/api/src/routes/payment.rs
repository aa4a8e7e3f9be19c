//! Payment route handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use copperleaf_core::OrderId;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::order::Order;
use crate::routes::envelope::Envelope;
use crate::services::PaymentService;
use crate::services::payment::PaymentConfirmation;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MockPaymentRequest {
    pub order_id: OrderId,
}

/// `POST /api/payment/verify`
///
/// Checks the gateway signature; if the request names an order, that order
/// is marked paid and the cart cleared.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn verify(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(confirmation): Json<PaymentConfirmation>,
) -> Result<Response> {
    let payments = PaymentService::new(state.pool(), &state.config().payment.key_secret);

    match payments.confirm(&user, &confirmation).await? {
        Some(order) => Ok(Envelope::ok(order).into_response()),
        None => Ok(Envelope::message("payment signature verified").into_response()),
    }
}

/// `POST /api/payment/mock`
///
/// Marks an order paid without gateway verification. Intended for
/// environments without gateway credentials.
#[instrument(skip_all, fields(user_id = %user.id, order_id = %req.order_id))]
pub async fn mock(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<MockPaymentRequest>,
) -> Result<Envelope<Order>> {
    let payments = PaymentService::new(state.pool(), &state.config().payment.key_secret);
    let order = payments.confirm_mock(&user, req.order_id).await?;
    Ok(Envelope::ok(order))
}
