//! Cart repository.
//!
//! One row per user; line items travel as a JSONB document. There is no
//! optimistic concurrency token on the row, so concurrent writes from the
//! same user are last-write-wins.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use copperleaf_core::{CartId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<CartItem>>,
    total_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            items: row.items.0,
            total_price: row.total_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the cart belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, user_id, items, total_price, created_at, updated_at
            FROM carts
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Get the user's cart, creating an empty one if none exists yet.
    ///
    /// Carts are created lazily on first cart read/write and never deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // The no-op update makes RETURNING yield the row on conflict too.
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, items, total_price, created_at, updated_at
            ",
        )
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Persist a cart's items and derived total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    /// Returns `RepositoryError::NotFound` if the cart row vanished.
    pub async fn save(
        &self,
        cart_id: CartId,
        items: &[CartItem],
        total_price: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE carts
            SET items = $2, total_price = $3, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(cart_id.as_i32())
        .bind(Json(items))
        .bind(total_price)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Empty a user's cart (items cleared, total reset to zero).
    ///
    /// A user without a cart row is fine: there is nothing to empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn clear_for_user(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE carts
            SET items = '[]'::jsonb, total_price = 0, updated_at = now()
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
