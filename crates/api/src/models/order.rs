//! Order domain types.
//!
//! Order line items are frozen copies of product data taken at creation time,
//! decoupled from later catalog edits or deletions. They are stored as JSONB
//! on the order row, like cart items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use copperleaf_core::{OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

/// A frozen order line: product reference plus name and price at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product reference (may dangle after catalog deletion; name/price stand alone).
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Unit price at order time.
    pub price: Decimal,
    /// Quantity ordered.
    pub quantity: u32,
}

impl OrderItem {
    /// Line total.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Shipping address captured at checkout. All fields required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Name of the first empty field, if any. Used for request validation.
    #[must_use]
    pub fn first_missing_field(&self) -> Option<&'static str> {
        let fields = [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ];
        fields
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
    }
}

/// Gateway confirmation metadata recorded when an order is marked paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Gateway payment id (or a generated mock id).
    pub id: String,
    /// Gateway-reported status.
    pub status: String,
    /// When the confirmation was recorded.
    pub update_time: DateTime<Utc>,
    /// Payer email.
    pub email_address: String,
}

/// An order (domain type). Created once per checkout, mutated only by status
/// transitions, never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Ordering user.
    pub user_id: UserId,
    /// Frozen line items.
    pub items: Vec<OrderItem>,
    /// Shipping address captured at checkout.
    pub shipping_address: ShippingAddress,
    /// Payment method chosen at checkout.
    pub payment_method: PaymentMethod,
    /// Total computed at creation; never re-derived.
    pub total_price: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Whether payment has been confirmed.
    pub is_paid: bool,
    /// When payment was confirmed.
    pub paid_at: Option<DateTime<Utc>>,
    /// Whether the order has been delivered.
    pub is_delivered: bool,
    /// When the order was delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Gateway confirmation metadata.
    pub payment_result: Option<PaymentResult>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            product_id: ProductId::new(1),
            name: "Widget".to_string(),
            price: Decimal::new(999, 2),
            quantity: 3,
        };
        assert_eq!(item.line_total(), Decimal::new(2997, 2));
    }

    #[test]
    fn test_shipping_address_validation() {
        let full = ShippingAddress {
            name: "A Person".to_string(),
            address: "1 Main St".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "India".to_string(),
            phone: "9999999999".to_string(),
        };
        assert_eq!(full.first_missing_field(), None);

        let missing = ShippingAddress {
            city: "  ".to_string(),
            ..full
        };
        assert_eq!(missing.first_missing_field(), Some("city"));
    }
}
