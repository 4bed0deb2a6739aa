//! Token issuance and verification.
//!
//! Access and refresh tokens are signed with distinct secrets, so a
//! leaked access secret cannot be used to forge refresh tokens and
//! vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{AccessClaims, RefreshClaims};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Generate a signed access token (HS256, 15 min expiry). Stateless.
pub fn issue_access_token(user_id: &str, secret: &[u8]) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Generate a signed refresh token (HS256, 7 day expiry) with a fresh
/// unique `jti`. The row persisted alongside it is what makes the
/// token revocable.
pub fn issue_refresh_token(user_id: &str, secret: &[u8]) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = RefreshClaims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp: (now + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify an access token, returning the claims on success.
///
/// Expiry is reported as `AuthError::TokenExpired`, distinct from a
/// bad signature or malformed token.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<AccessClaims, AuthError> {
    decode::<AccessClaims>(token, &DecodingKey::from_secret(secret), &validation())
        .map(|data| data.claims)
        .map_err(map_decode_error)
}

/// Verify a refresh token, returning the claims on success.
pub fn verify_refresh_token(token: &str, secret: &[u8]) -> Result<RefreshClaims, AuthError> {
    decode::<RefreshClaims>(token, &DecodingKey::from_secret(secret), &validation())
        .map(|data| data.claims)
        .map_err(map_decode_error)
}

fn validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // No clock skew allowance: a token is expired the second `exp` passes.
    validation.leeway = 0;
    validation
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(e.to_string()),
    }
}
