//! Cart domain types.
//!
//! A cart's line items are stored as a JSONB document on the cart row, so the
//! `CartItem` list serializes directly to and from the database column.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use copperleaf_core::{CartId, ProductId, UserId};

use super::product::Product;

/// One line in a cart: a product reference and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Stable line id, used by the update/remove routes.
    pub id: Uuid,
    /// Referenced product; may no longer resolve if the product was deleted.
    pub product_id: ProductId,
    /// Quantity, at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Create a new line with a fresh id.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity,
        }
    }
}

/// A user's cart as stored (domain type).
///
/// `total_price` is derived; reconciliation recomputes it from current
/// product prices on every read.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning user; unique per cart.
    pub user_id: UserId,
    /// Ordered line items.
    pub items: Vec<CartItem>,
    /// Derived total, last persisted value.
    pub total_price: Decimal,
    /// When the cart was lazily created.
    pub created_at: DateTime<Utc>,
    /// Last write.
    pub updated_at: DateTime<Utc>,
}

/// A cart line expanded with its current product, for responses.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    /// Line id.
    pub id: Uuid,
    /// The current product record. `None` only on the degraded fallback
    /// path, when population itself failed.
    pub product: Option<Product>,
    /// Quantity, at least 1.
    pub quantity: u32,
}

/// A cart with items expanded to current products, for responses.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    /// Cart ID.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// Populated line items (unresolvable lines already pruned).
    pub items: Vec<CartItemView>,
    /// Reconciled total.
    pub total_price: Decimal,
}
