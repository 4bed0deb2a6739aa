//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{
    LoginRequest, LoginResponse, LogoutRequest, MessageResponse, RefreshRequest, RegisterRequest,
    RegisterResponse, TokenPairResponse,
};
use crate::services::auth;

/// `POST /register` — create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let resp = auth::register(
        &state.pool,
        &body.name,
        &body.email,
        &body.password,
        &state.config,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let resp = auth::login(&state.pool, &body.email, &body.password, &state.config).await?;
    Ok(Json(resp))
}

/// `POST /refresh-token` — exchange a refresh token for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let resp = auth::refresh(&state.pool, body.refresh_token.as_deref(), &state.config).await?;
    Ok(Json(resp))
}

/// `POST /logout` — revoke a refresh token.
pub async fn logout_handler(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::logout(&state.pool, body.refresh_token.as_deref()).await?;
    Ok(Json(resp))
}
