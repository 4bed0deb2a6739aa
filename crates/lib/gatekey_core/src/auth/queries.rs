//! Auth-related database queries.
//!
//! Every query returns one fixed result shape; callers never see raw
//! rows.

use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::User;

/// Fetch a user by email, returning (id, name, password_hash).
///
/// The match is a case-sensitive exact comparison on the stored email.
pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<(String, String, String)>, AuthError> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        "SELECT id::text, name, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Create a new user, returning the user ID.
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<String, AuthError> {
    let user_id = sqlx::query_scalar::<_, String>(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id::text",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(user_id)
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT name, email FROM users WHERE id = $1::uuid",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(name, email)| User {
        id: user_id.to_string(),
        name,
        email,
    }))
}

/// Persist a refresh token for a user.
pub async fn store_refresh_token(
    pool: &PgPool,
    token: &str,
    user_id: &str,
    expires_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), AuthError> {
    sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2::uuid, $3)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Atomically consume a refresh token for rotation.
///
/// Deletes the row only if it belongs to `user_id` and has not expired,
/// and returns the number of rows removed. A result of zero means the
/// token was already rotated, revoked, expired, or forged — exactly one
/// concurrent caller can win.
pub async fn consume_refresh_token(
    pool: &PgPool,
    token: &str,
    user_id: &str,
) -> Result<u64, AuthError> {
    let result = sqlx::query(
        "DELETE FROM refresh_tokens \
         WHERE token = $1 AND user_id = $2::uuid AND expires_at > now()",
    )
    .bind(token)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Delete a refresh token unconditionally (logout). Idempotent:
/// deleting a token that is already gone is not an error.
pub async fn delete_refresh_token(pool: &PgPool, token: &str) -> Result<(), AuthError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}
