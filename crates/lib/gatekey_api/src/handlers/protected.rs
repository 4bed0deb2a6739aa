//! Example protected route behind the session guard.

use axum::{Extension, Json};

use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::ProtectedResponse;

/// `GET /protected` — demonstrates the guard: reachable only with a
/// valid access token.
pub async fn protected_handler(
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> AppResult<Json<ProtectedResponse>> {
    Ok(Json(ProtectedResponse {
        message: "This is a protected route".to_string(),
        user_id,
    }))
}
