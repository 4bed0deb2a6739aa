//! Session guard — Bearer token extraction and access-token verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use gatekey_core::auth::jwt::verify_access_token;

use crate::AppState;
use crate::error::AppError;

/// Key used to store the authenticated user id in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies
/// the access token, and injects `AuthenticatedUser` into request
/// extensions. Stateless — no store access.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Access token required".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Access token required".into()))?;

    let claims = verify_access_token(token, state.config.access_token_secret.as_bytes())
        .map_err(|_| AppError::SessionExpired)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser(claims.sub));

    Ok(next.run(request).await)
}
