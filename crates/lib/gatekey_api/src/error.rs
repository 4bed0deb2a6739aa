//! Application error types.
//!
//! Every session-manager operation translates store/hash/sign failures
//! into one of these kinds at its boundary; nothing propagates to the
//! transport layer as an unhandled fault, and internal detail is never
//! leaked to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Sentinel code attached to expired-session errors so clients can
/// branch on forced logout without string-matching messages.
pub const SESSION_EXPIRED_CODE: &str = "SESSION_EXPIRED";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Email already exists")]
    DuplicateEmail,

    /// Unified for unknown email and wrong password so responses do not
    /// enable account enumeration.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Refresh token required")]
    MissingRefreshToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Invalid or expired token")]
    SessionExpired,

    #[error("Server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::DuplicateEmail => (StatusCode::BAD_REQUEST, None),
            AppError::InvalidCredentials => (StatusCode::BAD_REQUEST, None),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, None),
            AppError::MissingRefreshToken => (StatusCode::UNAUTHORIZED, None),
            AppError::InvalidRefreshToken => (StatusCode::FORBIDDEN, None),
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, None),
            AppError::SessionExpired => (StatusCode::FORBIDDEN, Some(SESSION_EXPIRED_CODE)),
            AppError::Internal(detail) => {
                error!(%detail, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };
        let body = Json(ErrorResponse {
            message: self.to_string(),
            code: code.map(|c| c.to_string()),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<gatekey_core::auth::AuthError> for AppError {
    fn from(e: gatekey_core::auth::AuthError) -> Self {
        use gatekey_core::auth::AuthError;
        match e {
            // Access-token context; refresh flows map token errors to
            // `InvalidRefreshToken` explicitly before `?` can get here.
            AuthError::TokenExpired | AuthError::InvalidToken(_) => AppError::SessionExpired,
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
