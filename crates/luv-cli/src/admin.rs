//! Account administration that bypasses the HTTP API.

use luv_core::hash_password;
use luv_models::users::UserRole;
use luv_models::validation::{is_strong_password, is_valid_username};
use sqlx::PgPool;
use uuid::Uuid;

use crate::CliError;

/// Creates an active admin account with a password.
pub async fn create_admin(
    db: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, CliError> {
    if !is_valid_username(username) {
        return Err("Username must be at least 3 characters of letters, digits or '_'".into());
    }
    if !is_strong_password(password) {
        return Err(
            "Password must have 8+ characters with lower and upper case letters, a digit and a symbol"
                .into(),
        );
    }

    let password_hash =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (username, email, password_hash, display_name, role)
         VALUES ($1, $2, $3, $1, 'admin')
         ON CONFLICT DO NOTHING
         RETURNING id",
    )
    .bind(username)
    .bind(email.trim().to_lowercase())
    .bind(&password_hash)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "A user with this username or email already exists".into())
}

/// Changes the role of the user with `email`.
pub async fn set_role(db: &PgPool, email: &str, role: UserRole) -> Result<(), CliError> {
    let updated = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .bind(role)
        .execute(db)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(format!("No user with email {}", email).into());
    }
    Ok(())
}
