//! Checkout orchestration: cart to order, plus the order lifecycle.
//!
//! Order creation is deliberately two-phase for online payment methods: the
//! order is persisted as `processing` and the cart survives until payment
//! confirmation succeeds. Cash-on-delivery confirms immediately and empties
//! the cart in the same logical operation. The confirm and the cart clear
//! are two sequential writes with no compensating rollback; a crash between
//! them leaves a confirmed order with a stale cart, which the next cart
//! read re-prices.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use copperleaf_core::{InvalidTransition, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

use crate::db::{CartRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::models::cart::CartItem;
use crate::models::order::{Order, OrderItem, ShippingAddress};
use crate::models::product::Product;
use crate::models::user::User;

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart has no resolvable items to order.
    #[error("no items in cart")]
    EmptyCart,

    /// Order does not exist.
    #[error("order not found")]
    NotFound,

    /// Caller is neither the owner nor an admin.
    #[error("not authorized to access this order")]
    Forbidden,

    /// The lifecycle does not allow the requested status change.
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Freeze cart lines into order lines against current product data.
///
/// Unresolvable lines are skipped; the price captured here is the price at
/// order time, which can legitimately differ from what the user saw when
/// adding the item (cart reads re-price on every read anyway).
#[must_use]
pub fn freeze_items(
    items: &[CartItem],
    products: &HashMap<ProductId, Product>,
) -> (Vec<OrderItem>, Decimal) {
    let mut frozen = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;

    for item in items {
        let Some(product) = products.get(&item.product_id) else {
            continue;
        };

        total += product.price * Decimal::from(item.quantity);
        frozen.push(OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: item.quantity,
        });
    }

    (frozen, total)
}

/// Freeze cart lines for checkout, rejecting carts with nothing to order.
///
/// The decision gate for order creation: the service persists an order only
/// after this returns `Ok`, so an empty or all-unresolvable cart never
/// produces one.
///
/// # Errors
///
/// Returns `OrderError::EmptyCart` if no line resolves.
pub fn checkout_lines(
    items: &[CartItem],
    products: &HashMap<ProductId, Product>,
) -> Result<(Vec<OrderItem>, Decimal), OrderError> {
    let (frozen, total) = freeze_items(items, products);
    if frozen.is_empty() {
        return Err(OrderError::EmptyCart);
    }
    Ok((frozen, total))
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Create an order from the user's cart.
    ///
    /// The frozen line items and total are built strictly from the cart's
    /// currently populated items. The order is persisted as `processing`;
    /// cash-on-delivery orders are then confirmed immediately and the cart
    /// emptied. Online-payment orders keep their cart until confirmation.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` if the cart has zero resolvable
    /// items; no order is persisted in that case.
    pub async fn create_order(
        &self,
        user_id: UserId,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<Order, OrderError> {
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(OrderError::EmptyCart)?;

        let ids: Vec<ProductId> = cart.items.iter().map(|i| i.product_id).collect();
        let products = self.products.get_many(&ids).await?;

        let (items, total) = checkout_lines(&cart.items, &products)?;

        let order = self
            .orders
            .create(user_id, &items, &shipping_address, payment_method, total)
            .await?;

        tracing::info!(order_id = %order.id, %user_id, %payment_method, "order created");

        if payment_method.is_deferred() {
            // Deferred payment: confirm now and empty the cart. Two writes,
            // same logical operation.
            let confirmed = self.orders.set_status(order.id, OrderStatus::Confirmed).await?;
            self.carts.clear_for_user(user_id).await?;
            return Ok(confirmed);
        }

        Ok(order)
    }

    /// List the caller's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// List every order (admin).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_all().await?)
    }

    /// Get one order, enforcing that the caller owns it or is an admin.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    /// Returns `OrderError::Forbidden` if the caller may not see it.
    pub async fn get_for_user(&self, id: OrderId, user: &User) -> Result<Order, OrderError> {
        let order = self.orders.get(id).await?.ok_or(OrderError::NotFound)?;

        if order.user_id != user.id && !user.role.is_admin() {
            return Err(OrderError::Forbidden);
        }

        Ok(order)
    }

    /// Cancel an order.
    ///
    /// Allowed only while the order is `processing` or `confirmed`; any
    /// later status fails with the current status named in the error.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Transition` if the order has already shipped.
    pub async fn cancel(&self, id: OrderId, user: &User) -> Result<Order, OrderError> {
        let order = self.get_for_user(id, user).await?;

        let next = order.status.transition(OrderStatus::Cancelled)?;
        let cancelled = self.orders.set_status(order.id, next).await?;

        tracing::info!(order_id = %id, "order cancelled");
        Ok(cancelled)
    }

    /// Set an order's status (admin).
    ///
    /// Moving to `delivered` also stamps `is_delivered`/`delivered_at`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    /// Returns `OrderError::Transition` if the lifecycle forbids the move.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let order = self.orders.get(id).await?.ok_or(OrderError::NotFound)?;

        let next = order.status.transition(status)?;
        Ok(self.orders.set_status(order.id, next).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use copperleaf_core::Category;

    fn product(id: i32, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: "test".to_string(),
            price,
            category: Category::Other,
            image_url: "no-image.jpg".to_string(),
            in_stock: true,
            created_at: Utc::now(),
        }
    }

    fn lookup(products: Vec<Product>) -> HashMap<ProductId, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn test_freeze_copies_name_and_price() {
        let products = lookup(vec![product(1, Decimal::new(1050, 2))]);
        let items = vec![CartItem::new(ProductId::new(1), 2)];

        let (frozen, total) = freeze_items(&items, &products);
        assert_eq!(frozen.len(), 1);
        let line = frozen.first().expect("one frozen line");
        assert_eq!(line.name, "Product 1");
        assert_eq!(line.price, Decimal::new(1050, 2));
        assert_eq!(line.quantity, 2);
        assert_eq!(total, Decimal::new(2100, 2));
    }

    #[test]
    fn test_freeze_skips_unresolvable_lines() {
        let products = lookup(vec![product(1, Decimal::from(5))]);
        let items = vec![
            CartItem::new(ProductId::new(1), 1),
            CartItem::new(ProductId::new(404), 9),
        ];

        let (frozen, total) = freeze_items(&items, &products);
        assert_eq!(frozen.len(), 1);
        assert_eq!(total, Decimal::from(5));
    }

    #[test]
    fn test_freeze_all_unresolvable_is_empty() {
        let items = vec![CartItem::new(ProductId::new(1), 1)];
        let (frozen, total) = freeze_items(&items, &HashMap::new());
        assert!(frozen.is_empty());
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_checkout_rejects_empty_cart() {
        let result = checkout_lines(&[], &HashMap::new());
        assert!(matches!(result, Err(OrderError::EmptyCart)));
    }

    #[test]
    fn test_checkout_rejects_all_unresolvable_cart() {
        // Every line points at a deleted product: no order material at all.
        let items = vec![
            CartItem::new(ProductId::new(1), 2),
            CartItem::new(ProductId::new(2), 1),
        ];

        let result = checkout_lines(&items, &HashMap::new());
        assert!(matches!(result, Err(OrderError::EmptyCart)));
    }

    #[test]
    fn test_checkout_freezes_resolvable_lines() {
        let products = lookup(vec![product(1, Decimal::from(10))]);
        let items = vec![
            CartItem::new(ProductId::new(1), 2),
            CartItem::new(ProductId::new(404), 1),
        ];

        let (frozen, total) = checkout_lines(&items, &products).expect("one resolvable line");
        assert_eq!(frozen.len(), 1);
        assert_eq!(total, Decimal::from(20));
    }
}
