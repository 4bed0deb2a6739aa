//! Session validation handler.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{SessionResponse, SessionUser};
use crate::services::auth::{self, SessionValidity};

/// `GET /validate-session` — proactive session freshness check.
///
/// Parses the bearer header itself (instead of sitting behind the
/// guard) so clients get a structured expiry signal without attempting
/// a protected call.
pub async fn validate_session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SessionResponse>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("No token provided".into()))?;

    match auth::validate_session(token, &state.config) {
        SessionValidity::Valid { user_id } => Ok(Json(SessionResponse {
            message: "Session is valid".to_string(),
            user: SessionUser { id: user_id },
        })),
        SessionValidity::Expired => Err(AppError::SessionExpired),
    }
}
