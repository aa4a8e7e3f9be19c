//! Payment confirmation.
//!
//! The gateway integration is signature-verification only: the client talks
//! to the gateway directly and posts the resulting ids back to us, and we
//! accept the confirmation iff the HMAC-SHA256 signature over
//! `{gateway_order_id}|{gateway_payment_id}` matches our key secret. A mock
//! confirmation path exists for environments without gateway credentials.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use sqlx::PgPool;
use thiserror::Error;

use copperleaf_core::OrderId;

use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::models::order::{Order, PaymentResult};
use crate::models::user::User;

type HmacSha256 = Hmac<Sha256>;

/// Errors from payment confirmation.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The posted signature does not match our computation.
    #[error("invalid payment signature")]
    InvalidSignature,

    /// The order being confirmed does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Gateway confirmation fields posted back by the client.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaymentConfirmation {
    /// Gateway-side order id.
    pub gateway_order_id: String,
    /// Gateway-side payment id.
    pub gateway_payment_id: String,
    /// HMAC signature issued by the gateway.
    pub signature: String,
    /// Our order being paid. Absent means signature check only.
    pub order_id: Option<OrderId>,
}

/// Whether a posted signature matches our computation.
///
/// The expected signature is HMAC-SHA256 over
/// `{gateway_order_id}|{gateway_payment_id}`, hex-encoded.
#[must_use]
pub fn verify_signature(
    key_secret: &SecretString,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(key_secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(format!("{gateway_order_id}|{gateway_payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes()) == signature
}

/// Payment service.
pub struct PaymentService<'a> {
    orders: OrderRepository<'a>,
    carts: CartRepository<'a>,
    key_secret: &'a SecretString,
}

impl<'a> PaymentService<'a> {
    /// Create a new payment service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, key_secret: &'a SecretString) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            carts: CartRepository::new(pool),
            key_secret,
        }
    }

    /// Verify a gateway confirmation and, if an order is named, mark it paid.
    ///
    /// On signature mismatch nothing is persisted. On success with an order
    /// id the order is confirmed, the gateway metadata recorded, and the
    /// payer's cart emptied; without an order id only the signature is
    /// checked and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` if the posted signature does
    /// not match. Returns `PaymentError::OrderNotFound` if the named order
    /// does not exist.
    pub async fn confirm(
        &self,
        user: &User,
        confirmation: &PaymentConfirmation,
    ) -> Result<Option<Order>, PaymentError> {
        if !verify_signature(
            self.key_secret,
            &confirmation.gateway_order_id,
            &confirmation.gateway_payment_id,
            &confirmation.signature,
        ) {
            tracing::warn!(
                user_id = %user.id,
                gateway_order_id = %confirmation.gateway_order_id,
                "payment confirmation rejected: signature mismatch"
            );
            return Err(PaymentError::InvalidSignature);
        }

        let Some(order_id) = confirmation.order_id else {
            return Ok(None);
        };

        let result = PaymentResult {
            id: confirmation.gateway_payment_id.clone(),
            status: "completed".to_string(),
            update_time: Utc::now(),
            email_address: user.email.as_str().to_string(),
        };

        self.record_payment(user, order_id, result)
            .await
            .map(Some)
    }

    /// Mark an order paid without gateway verification (mock payments).
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::OrderNotFound` if the order does not exist.
    pub async fn confirm_mock(&self, user: &User, order_id: OrderId) -> Result<Order, PaymentError> {
        let result = PaymentResult {
            id: format!("mock_{}", order_id.as_i32()),
            status: "completed".to_string(),
            update_time: Utc::now(),
            email_address: user.email.as_str().to_string(),
        };

        self.record_payment(user, order_id, result).await
    }

    async fn record_payment(
        &self,
        user: &User,
        order_id: OrderId,
        result: PaymentResult,
    ) -> Result<Order, PaymentError> {
        let order = match self.orders.mark_paid(order_id, &result).await {
            Ok(order) => order,
            Err(RepositoryError::NotFound) => return Err(PaymentError::OrderNotFound),
            Err(err) => return Err(err.into()),
        };

        self.carts.clear_for_user(user.id).await?;

        tracing::info!(%order_id, user_id = %user.id, "payment recorded, cart cleared");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("Kq8mW2x9ZpL4vRtN")
    }

    fn sign(key: &str, gateway_order_id: &str, gateway_payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("valid key length");
        mac.update(format!("{gateway_order_id}|{gateway_payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_verifies() {
        let sig = sign("Kq8mW2x9ZpL4vRtN", "order_abc", "pay_123");
        assert!(verify_signature(&secret(), "order_abc", "pay_123", &sig));
    }

    #[test]
    fn test_tampered_payment_id_fails() {
        let sig = sign("Kq8mW2x9ZpL4vRtN", "order_abc", "pay_123");
        assert!(!verify_signature(&secret(), "order_abc", "pay_999", &sig));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let mut sig = sign("Kq8mW2x9ZpL4vRtN", "order_abc", "pay_123");
        sig.replace_range(0..1, if sig.starts_with('0') { "1" } else { "0" });
        assert!(!verify_signature(&secret(), "order_abc", "pay_123", &sig));
    }

    #[test]
    fn test_different_secret_fails() {
        let sig = sign("Kq8mW2x9ZpL4vRtN", "order_abc", "pay_123");
        let other = SecretString::from("aDifferentSecret1234");
        assert!(!verify_signature(&other, "order_abc", "pay_123", &sig));
    }

    #[test]
    fn test_signature_is_hex_sha256() {
        let sig = sign("Kq8mW2x9ZpL4vRtN", "order_abc", "pay_123");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
