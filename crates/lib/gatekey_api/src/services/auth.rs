//! Session manager — registration, login, refresh rotation, logout,
//! and session validation over `gatekey_core::auth`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use gatekey_core::auth::jwt::{
    self, REFRESH_TOKEN_EXPIRY_DAYS, issue_access_token, issue_refresh_token,
};
use gatekey_core::auth::{password, queries};

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    LoginResponse, MessageResponse, PublicUser, RegisterResponse, TokenPairResponse,
};

/// Outcome of a proactive session check. Verification failure is a
/// result here, not an error: callers want to branch, not gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidity {
    Valid { user_id: String },
    Expired,
}

/// Issue an access/refresh pair and persist the refresh token.
///
/// Shared by registration, login, and rotation: every path that hands
/// tokens to a client goes through here so the store row and the
/// token's own expiry always line up.
async fn issue_session_tokens(
    pool: &PgPool,
    user_id: &str,
    config: &ApiConfig,
) -> AppResult<(String, String)> {
    let access_token = issue_access_token(user_id, config.access_token_secret.as_bytes())?;
    let refresh_token = issue_refresh_token(user_id, config.refresh_token_secret.as_bytes())?;

    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);
    queries::store_refresh_token(pool, &refresh_token, user_id, expires_at).await?;

    Ok((access_token, refresh_token))
}

/// Register a new user account.
///
/// If persisting the refresh token fails after the user row is
/// inserted, the user row remains — no rollback is attempted.
pub async fn register(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_plain: &str,
    config: &ApiConfig,
) -> AppResult<RegisterResponse> {
    if queries::email_exists(pool, email).await? {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = password::hash_password(password_plain)?;
    let user_id = queries::create_user(pool, name, email, &password_hash).await?;

    let (access_token, refresh_token) = issue_session_tokens(pool, &user_id, config).await?;

    info!(email, "registered new user");

    Ok(RegisterResponse {
        user: PublicUser {
            id: user_id,
            name: name.to_string(),
            email: email.to_string(),
        },
        access_token,
        refresh_token,
    })
}

/// Authenticate with email + password.
///
/// Unknown email and wrong password produce the same error. Prior
/// refresh tokens for the user stay live: concurrent sessions on
/// multiple devices are supported.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password_plain: &str,
    config: &ApiConfig,
) -> AppResult<LoginResponse> {
    let (user_id, name, password_hash) = queries::find_user_by_email(pool, email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_password(password_plain, &password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let (access_token, refresh_token) = issue_session_tokens(pool, &user_id, config).await?;

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        user: PublicUser {
            id: user_id,
            name,
            email: email.to_string(),
        },
        access_token,
        refresh_token,
    })
}

/// Exchange a refresh token for a new pair (single-use rotation).
///
/// The old row is removed with a conditional delete scoped to the
/// decoded user id and a live expiry; zero rows removed means the token
/// was already rotated, revoked, expired at the store level, or carries
/// a forged claim. Only the caller that wins the delete gets new tokens.
pub async fn refresh(
    pool: &PgPool,
    refresh_token: Option<&str>,
    config: &ApiConfig,
) -> AppResult<TokenPairResponse> {
    let token = refresh_token.ok_or(AppError::MissingRefreshToken)?;

    let claims = jwt::verify_refresh_token(token, config.refresh_token_secret.as_bytes())
        .map_err(|_| AppError::InvalidRefreshToken)?;

    let removed = queries::consume_refresh_token(pool, token, &claims.sub).await?;
    if removed == 0 {
        warn!(user_id = %claims.sub, "refresh token not found or already rotated");
        return Err(AppError::InvalidRefreshToken);
    }

    let (access_token, refresh_token) = issue_session_tokens(pool, &claims.sub, config).await?;

    Ok(TokenPairResponse {
        access_token,
        refresh_token,
    })
}

/// Revoke a refresh token.
///
/// Idempotent: deleting a token that is already gone still succeeds.
/// Access tokens already issued stay valid until natural expiry.
pub async fn logout(pool: &PgPool, refresh_token: Option<&str>) -> AppResult<MessageResponse> {
    let token = refresh_token.ok_or_else(|| AppError::Validation("Refresh token required".into()))?;

    queries::delete_refresh_token(pool, token).await?;

    Ok(MessageResponse {
        message: "Logout successful".to_string(),
    })
}

/// Check access-token freshness without gating a request.
///
/// Pure, stateless: signature and expiry only, no store access.
pub fn validate_session(access_token: &str, config: &ApiConfig) -> SessionValidity {
    match jwt::verify_access_token(access_token, config.access_token_secret.as_bytes()) {
        Ok(claims) => SessionValidity::Valid {
            user_id: claims.sub,
        },
        Err(_) => SessionValidity::Expired,
    }
}
