//! Authentication service.
//!
//! Password registration and login, plus opaque bearer tokens. A token is
//! 32 random bytes handed to the client base64-encoded; only its SHA-256
//! digest is stored, so a database leak does not leak usable tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use thiserror::Error;

use copperleaf_core::{Email, EmailError};

use crate::db::{RepositoryError, TokenRepository, UserRepository};
use crate::models::user::{Role, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Random bytes per bearer token.
const TOKEN_BYTES: usize = 32;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(&'static str),

    /// Email already registered.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A freshly issued bearer token, returned to the client exactly once.
#[derive(Debug)]
pub struct IssuedToken(pub String);

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
    token_ttl_days: i64,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, token_ttl_days: i64) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
            token_ttl_days,
        }
    }

    /// Register a new user and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, IssuedToken), AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(name, &email, &password_hash, Role::User)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");

        let token = self.issue_token(&user).await?;
        Ok((user, token))
    }

    /// Login with email and password, issuing a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, IssuedToken), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.issue_token(&user).await?;
        Ok((user, token))
    }

    /// Resolve a bearer token to its user. `None` if the token is unknown
    /// or expired.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>, AuthError> {
        Ok(self.tokens.find_user(&token_digest(token)).await?)
    }

    /// Revoke a bearer token. Revoking an unknown token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the delete fails.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        Ok(self.tokens.revoke(&token_digest(token)).await?)
    }

    async fn issue_token(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let expires_at = Utc::now() + Duration::days(self.token_ttl_days);
        self.tokens
            .insert(user.id, &token_digest(&token), expires_at)
            .await?;

        Ok(IssuedToken(token))
    }
}

/// SHA-256 digest of a bearer token, hex-encoded. This is what we store.
fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Validate password strength: length, one uppercase letter, one lowercase
/// letter, one digit, and one non-alphanumeric character.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(
            "password must be at least 8 characters",
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(AuthError::WeakPassword(
            "password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(AuthError::WeakPassword(
            "password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword("password must contain a number"));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err(AuthError::WeakPassword(
            "password must contain a special character",
        ));
    }
    Ok(())
}

/// Hash a password using Argon2id. Also used by the CLI when creating
/// admin accounts.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        assert!(matches!(
            validate_password("Ab1!"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_password_needs_uppercase() {
        assert!(matches!(
            validate_password("abcdef1!"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_password_needs_lowercase() {
        assert!(matches!(
            validate_password("ABCDEF1!"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_password_needs_digit() {
        assert!(matches!(
            validate_password("Abcdefg!"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_password_needs_special_char() {
        assert!(matches!(
            validate_password("Abcdefg1"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validate_password("Abcdef1!").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Abcdef1!").expect("hashing succeeds");
        assert!(verify_password("Abcdef1!", &hash).is_ok());
        assert!(verify_password("wrong-password", &hash).is_err());
    }

    #[test]
    fn test_token_digest_is_hex_sha256() {
        let digest = token_digest("some-token");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        // Deterministic: same token, same digest.
        assert_eq!(digest, token_digest("some-token"));
    }
}
