//! Cart service: reconciliation and mutation.
//!
//! The derived `total_price` on a cart is never trusted. Every read and
//! every mutation runs [`reconcile`] over the freshly populated line items,
//! so current product prices always win over whatever total was persisted
//! last. Lines whose product no longer resolves are pruned permanently as a
//! side effect of that read.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use copperleaf_core::{CartId, ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::cart::{Cart, CartItem, CartItemView, CartView};
use crate::models::product::Product;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Referenced product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// Product exists but cannot be added.
    #[error("product is out of stock")]
    OutOfStock,

    /// The user has no cart yet.
    #[error("cart not found")]
    CartNotFound,

    /// No line with the given id in the cart.
    #[error("item not found in cart")]
    ItemNotFound,

    /// Quantity must be at least 1.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Recompute a cart's line items and total against current product data.
///
/// Pure function, called identically from every read and mutation path:
///
/// - Lines whose product id is absent from `products` are dropped.
/// - The total is Σ `price × quantity` over the remaining lines.
/// - A resolvable product with a zero price contributes zero and is logged
///   as an anomaly, but the line is kept.
#[must_use]
pub fn reconcile(
    items: &[CartItem],
    products: &HashMap<ProductId, Product>,
) -> (Vec<CartItem>, Decimal) {
    let mut kept = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;

    for item in items {
        let Some(product) = products.get(&item.product_id) else {
            tracing::debug!(product_id = %item.product_id, "pruning cart line with dangling product");
            continue;
        };

        if product.price.is_zero() {
            tracing::warn!(
                product_id = %product.id,
                "cart line references a zero-priced product; contributing 0 to total"
            );
        } else {
            total += product.price * Decimal::from(item.quantity);
        }

        kept.push(item.clone());
    }

    (kept, total)
}

/// Apply an "add to cart" against in-memory line items.
///
/// Validates before mutating, so on any error the items are untouched:
///
/// - `quantity` of zero is rejected.
/// - The product must resolve and be in stock.
/// - An existing line for the same product is incremented, saturating at
///   `u32::MAX` so a huge quantity can never wrap to zero.
///
/// # Errors
///
/// Returns `CartError::InvalidQuantity`, `CartError::ProductNotFound`, or
/// `CartError::OutOfStock`; see above.
pub fn add_line(
    items: &mut Vec<CartItem>,
    product: Option<&Product>,
    quantity: u32,
) -> Result<(), CartError> {
    if quantity == 0 {
        return Err(CartError::InvalidQuantity);
    }

    let product = product.ok_or(CartError::ProductNotFound)?;
    if !product.in_stock {
        return Err(CartError::OutOfStock);
    }

    match items.iter_mut().find(|i| i.product_id == product.id) {
        Some(line) => line.quantity = line.quantity.saturating_add(quantity),
        None => items.push(CartItem::new(product.id, quantity)),
    }

    Ok(())
}

/// Last-resort cart view after both reconcile attempts failed: items
/// preserved but unpopulated, total reset to zero rather than left at a
/// stale nonzero value.
fn degraded_view(cart_id: CartId, user_id: UserId, items: Vec<CartItem>) -> CartView {
    CartView {
        id: cart_id,
        user_id,
        items: items
            .into_iter()
            .map(|item| CartItemView {
                id: item.id,
                product: None,
                quantity: item.quantity,
            })
            .collect(),
        total_price: Decimal::ZERO,
    }
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Get the user's cart, creating it lazily and reconciling it against
    /// current product data before returning.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if a database operation fails.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView, CartError> {
        let cart = self.carts.get_or_create(user_id).await?;
        self.reconcile_and_persist(cart).await
    }

    /// Add a product to the user's cart.
    ///
    /// Inserts a new line or increments the existing line for the same
    /// product, then reconciles and persists.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product does not exist;
    /// the cart is left unchanged.
    /// Returns `CartError::OutOfStock` if the product cannot be ordered;
    /// the cart is left unchanged.
    /// Returns `CartError::InvalidQuantity` if `quantity` is zero.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CartError> {
        let product = self.products.get(product_id).await?;
        let mut cart = self.carts.get_or_create(user_id).await?;

        add_line(&mut cart.items, product.as_ref(), quantity)?;

        self.reconcile_and_persist(cart).await
    }

    /// Change the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the user has no cart.
    /// Returns `CartError::ItemNotFound` if no line has the given id.
    /// Returns `CartError::InvalidQuantity` if `quantity` is zero.
    pub async fn update_item(
        &self,
        user_id: UserId,
        item_id: Uuid,
        quantity: u32,
    ) -> Result<CartView, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let line = cart
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(CartError::ItemNotFound)?;
        line.quantity = quantity;

        self.reconcile_with_fallback(cart).await
    }

    /// Remove a line from the cart.
    ///
    /// Removing an unknown line id is a no-op, matching the permissive
    /// delete semantics of the HTTP surface.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the user has no cart.
    pub async fn remove_item(&self, user_id: UserId, item_id: Uuid) -> Result<CartView, CartError> {
        let mut cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        cart.items.retain(|i| i.id != item_id);

        self.reconcile_with_fallback(cart).await
    }

    /// Empty the cart: items cleared, total reset to zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the user has no cart.
    pub async fn clear(&self, user_id: UserId) -> Result<CartView, CartError> {
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        self.carts.save(cart.id, &[], Decimal::ZERO).await?;

        Ok(CartView {
            id: cart.id,
            user_id: cart.user_id,
            items: Vec::new(),
            total_price: Decimal::ZERO,
        })
    }

    /// Primary path: populate, reconcile, persist, and build the response
    /// view in one sweep.
    async fn reconcile_and_persist(&self, mut cart: Cart) -> Result<CartView, CartError> {
        let ids: Vec<ProductId> = cart.items.iter().map(|i| i.product_id).collect();
        let products = self.products.get_many(&ids).await?;

        let (kept, total) = reconcile(&cart.items, &products);
        self.carts.save(cart.id, &kept, total).await?;

        cart.items = kept;
        cart.total_price = total;
        Ok(build_view(&cart, &products))
    }

    /// Mutation path with degraded fallback.
    ///
    /// If the primary reconcile fails mid-flight, the cart is re-read fresh
    /// and recomputed independently; if that fails too, the total is reset
    /// to zero rather than leaving a stale nonzero value of unknown
    /// provenance.
    async fn reconcile_with_fallback(&self, cart: Cart) -> Result<CartView, CartError> {
        let cart_id = cart.id;
        let user_id = cart.user_id;
        let items = cart.items.clone();

        // Persist the structural change first, keeping the previous total
        // until reconciliation replaces it.
        self.carts.save(cart_id, &items, cart.total_price).await?;

        match self.reconcile_and_persist(cart).await {
            Ok(view) => Ok(view),
            Err(CartError::Repository(err)) => {
                tracing::error!(%cart_id, error = %err, "cart reconcile failed; retrying fresh");

                match self.fresh_recompute(user_id).await {
                    Ok(view) => Ok(view),
                    Err(retry_err) => {
                        tracing::error!(
                            %cart_id,
                            error = %retry_err,
                            "fallback reconcile failed; resetting cart total to 0"
                        );
                        self.carts.save(cart_id, &items, Decimal::ZERO).await?;

                        Ok(degraded_view(cart_id, user_id, items))
                    }
                }
            }
            Err(other) => Err(other),
        }
    }

    /// Fallback path: re-read the cart and recompute from scratch.
    async fn fresh_recompute(&self, user_id: UserId) -> Result<CartView, CartError> {
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;
        self.reconcile_and_persist(cart).await
    }
}

/// Build the populated response view for a reconciled cart.
///
/// Every kept line resolves by construction; a line missing from the map
/// here would mean the product vanished mid-request, so it is shown
/// unpopulated rather than invented.
fn build_view(cart: &Cart, products: &HashMap<ProductId, Product>) -> CartView {
    CartView {
        id: cart.id,
        user_id: cart.user_id,
        items: cart
            .items
            .iter()
            .map(|item| CartItemView {
                id: item.id,
                product: products.get(&item.product_id).cloned(),
                quantity: item.quantity,
            })
            .collect(),
        total_price: cart.total_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use copperleaf_core::Category;

    fn product(id: i32, price: Decimal, in_stock: bool) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: "test".to_string(),
            price,
            category: Category::Other,
            image_url: "no-image.jpg".to_string(),
            in_stock,
            created_at: Utc::now(),
        }
    }

    fn lookup(products: Vec<Product>) -> HashMap<ProductId, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn test_reconcile_totals_price_times_quantity() {
        // Worked example: [(A, 10, qty 2), (B, 5, qty 1)] -> 25
        let products = lookup(vec![
            product(1, Decimal::from(10), true),
            product(2, Decimal::from(5), true),
        ]);
        let items = vec![
            CartItem::new(ProductId::new(1), 2),
            CartItem::new(ProductId::new(2), 1),
        ];

        let (kept, total) = reconcile(&items, &products);
        assert_eq!(kept.len(), 2);
        assert_eq!(total, Decimal::from(25));

        // Removing B's line -> 20
        let remaining: Vec<CartItem> = items
            .iter()
            .filter(|i| i.product_id != ProductId::new(2))
            .cloned()
            .collect();
        let (kept, total) = reconcile(&remaining, &products);
        assert_eq!(kept.len(), 1);
        assert_eq!(total, Decimal::from(20));
    }

    #[test]
    fn test_reconcile_prunes_dangling_lines() {
        let products = lookup(vec![product(1, Decimal::from(10), true)]);
        let items = vec![
            CartItem::new(ProductId::new(1), 1),
            CartItem::new(ProductId::new(999), 4), // deleted product
        ];

        let (kept, total) = reconcile(&items, &products);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].product_id, ProductId::new(1));
        assert_eq!(total, Decimal::from(10));
    }

    #[test]
    fn test_reconcile_keeps_zero_priced_lines() {
        let products = lookup(vec![
            product(1, Decimal::ZERO, true),
            product(2, Decimal::from(7), true),
        ]);
        let items = vec![
            CartItem::new(ProductId::new(1), 3),
            CartItem::new(ProductId::new(2), 1),
        ];

        let (kept, total) = reconcile(&items, &products);
        // Zero-priced line contributes nothing but is not dropped.
        assert_eq!(kept.len(), 2);
        assert_eq!(total, Decimal::from(7));
    }

    #[test]
    fn test_reconcile_empty_cart() {
        let (kept, total) = reconcile(&[], &HashMap::new());
        assert!(kept.is_empty());
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_reconcile_all_unresolvable() {
        let items = vec![
            CartItem::new(ProductId::new(1), 2),
            CartItem::new(ProductId::new(2), 5),
        ];

        let (kept, total) = reconcile(&items, &HashMap::new());
        assert!(kept.is_empty());
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_reconcile_uses_current_prices() {
        // The stored total is irrelevant; only current prices matter.
        let items = vec![CartItem::new(ProductId::new(1), 2)];

        let before = lookup(vec![product(1, Decimal::from(10), true)]);
        let (_, total) = reconcile(&items, &before);
        assert_eq!(total, Decimal::from(20));

        let repriced = lookup(vec![product(1, Decimal::from(15), true)]);
        let (_, total) = reconcile(&items, &repriced);
        assert_eq!(total, Decimal::from(30));
    }

    #[test]
    fn test_add_line_rejects_unknown_product() {
        let mut items = vec![CartItem::new(ProductId::new(1), 2)];
        let before = items.clone();

        let result = add_line(&mut items, None, 1);
        assert!(matches!(result, Err(CartError::ProductNotFound)));
        assert_eq!(items, before);
    }

    #[test]
    fn test_add_line_rejects_out_of_stock() {
        let sold_out = product(2, Decimal::from(5), false);
        let mut items = vec![CartItem::new(ProductId::new(1), 2)];
        let before = items.clone();

        let result = add_line(&mut items, Some(&sold_out), 1);
        assert!(matches!(result, Err(CartError::OutOfStock)));
        assert_eq!(items, before);
    }

    #[test]
    fn test_add_line_rejects_zero_quantity() {
        let p = product(1, Decimal::from(5), true);
        let mut items = Vec::new();

        let result = add_line(&mut items, Some(&p), 0);
        assert!(matches!(result, Err(CartError::InvalidQuantity)));
        assert!(items.is_empty());
    }

    #[test]
    fn test_add_line_merges_existing_line() {
        let p = product(1, Decimal::from(5), true);
        let mut items = vec![CartItem::new(ProductId::new(1), 2)];

        add_line(&mut items, Some(&p), 3).expect("add succeeds");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn test_add_line_saturates_instead_of_wrapping() {
        let p = product(1, Decimal::from(5), true);
        let mut items = vec![CartItem::new(ProductId::new(1), u32::MAX)];

        // A second add of the same product must never wrap past zero.
        add_line(&mut items, Some(&p), 1).expect("add succeeds");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, u32::MAX);
        assert!(items[0].quantity >= 1);
    }

    #[test]
    fn test_degraded_view_resets_total_and_keeps_items() {
        let items = vec![
            CartItem::new(ProductId::new(1), 2),
            CartItem::new(ProductId::new(2), 7),
        ];

        let view = degraded_view(CartId::new(9), UserId::new(3), items);
        assert_eq!(view.total_price, Decimal::ZERO);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[1].quantity, 7);
        assert!(view.items.iter().all(|i| i.product.is_none()));
    }

    #[test]
    fn test_reconcile_preserves_line_order() {
        let products = lookup(vec![
            product(1, Decimal::from(1), true),
            product(2, Decimal::from(2), true),
            product(3, Decimal::from(3), true),
        ]);
        let items = vec![
            CartItem::new(ProductId::new(3), 1),
            CartItem::new(ProductId::new(1), 1),
            CartItem::new(ProductId::new(2), 1),
        ];

        let (kept, _) = reconcile(&items, &products);
        let order: Vec<i32> = kept.iter().map(|i| i.product_id.as_i32()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }
}
