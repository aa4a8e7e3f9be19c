//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! copperleaf-cli admin create -e admin@example.com -n "Admin Name" -p 'S3cure!pass'
//! ```

use copperleaf_core::Email;

use copperleaf_api::db::{RepositoryError, UserRepository};
use copperleaf_api::models::user::Role;
use copperleaf_api::services::auth::hash_password;

use super::{CliError, connect};

/// Create a new admin user.
///
/// Returns the ID of the created account.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, CliError> {
    let email =
        Email::parse(email).map_err(|e| CliError::InvalidInput(format!("Invalid email: {e}")))?;

    let password_hash =
        hash_password(password).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    tracing::info!("Creating admin user: {}", email.as_str());

    let user = users
        .create(name, &email, &password_hash, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::InvalidInput(format!(
                "A user already exists with email: {}",
                email.as_str()
            )),
            other => CliError::Repository(other),
        })?;

    tracing::info!("Admin user created!");
    tracing::info!("  ID: {}", user.id);
    tracing::info!("  Email: {}", user.email.as_str());
    tracing::info!("  Name: {}", user.name);

    Ok(user.id.as_i32())
}
