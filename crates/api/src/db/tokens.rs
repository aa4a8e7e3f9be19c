//! Bearer token repository.
//!
//! Tokens are opaque: the client holds the random value, the database holds
//! only its SHA-256 digest. Lookup joins straight to the owning user.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use copperleaf_core::{Email, UserId};

use super::RepositoryError;
use crate::models::user::{Role, User};

/// Repository for API token operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a token digest for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO api_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.as_i32())
        .bind(token_hash)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Resolve a token digest to its owning user, if the token is still valid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored user is invalid.
    pub async fn find_user(&self, token_hash: &str) -> Result<Option<User>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct TokenUserRow {
            id: i32,
            name: String,
            email: String,
            role: String,
            created_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, TokenUserRow>(
            r"
            SELECT u.id, u.name, u.email, u.role, u.created_at
            FROM api_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.expires_at > now()
            ",
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = r.role.parse::<Role>().map_err(RepositoryError::DataCorruption)?;

        Ok(Some(User {
            id: UserId::new(r.id),
            name: r.name,
            email,
            role,
            created_at: r.created_at,
        }))
    }

    /// Delete a token by digest (logout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn revoke(&self, token_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM api_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
