//! Router-level tests for the session guard and token endpoints that
//! need no live database: the pool is constructed lazily and these
//! paths all fail or succeed before any query runs.

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use gatekey_api::config::ApiConfig;
use gatekey_api::{AppState, router};
use gatekey_core::auth::jwt::issue_access_token;
use gatekey_core::models::auth::AccessClaims;
use tower::ServiceExt;

const ACCESS_SECRET: &str = "test-access-secret";
const REFRESH_SECRET: &str = "test-refresh-secret";

fn test_state() -> AppState {
    AppState {
        pool: sqlx::PgPool::connect_lazy("postgres://localhost:5432/gatekey_test")
            .expect("lazy pool"),
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: "postgres://localhost:5432/gatekey_test".into(),
            access_token_secret: ACCESS_SECRET.into(),
            refresh_token_secret: REFRESH_SECRET.into(),
        },
    }
}

async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = router(test_state()).oneshot(req).await.expect("request");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&body).expect("parse JSON");
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Build an access token whose expiry is already in the past.
fn expired_access_token() -> String {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: "11111111-1111-1111-1111-111111111111".into(),
        exp: (now - Duration::seconds(30)).timestamp(),
        iat: (now - Duration::seconds(90)).timestamp(),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
    )
    .expect("encode")
}

#[tokio::test]
async fn protected_without_token_is_401() {
    let (status, json) = send(get("/protected")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Access token required");
}

#[tokio::test]
async fn protected_with_wrong_scheme_is_401() {
    let req = Request::builder()
        .uri("/protected")
        .header(AUTHORIZATION, "Basic dXNlcjpwdw==")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_with_forged_token_is_403() {
    let (status, json) = send(get_with_token("/protected", "not.a.token")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "SESSION_EXPIRED");
}

#[tokio::test]
async fn protected_with_expired_token_is_403() {
    let (status, json) = send(get_with_token("/protected", &expired_access_token())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn protected_with_valid_token_returns_user_id() {
    let token = issue_access_token("22222222-2222-2222-2222-222222222222", ACCESS_SECRET.as_bytes())
        .expect("issue");
    let (status, json) = send(get_with_token("/protected", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "This is a protected route");
    assert_eq!(json["userId"], "22222222-2222-2222-2222-222222222222");
}

#[tokio::test]
async fn validate_session_without_token_is_401() {
    let (status, json) = send(get("/validate-session")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "No token provided");
}

#[tokio::test]
async fn validate_session_with_valid_token_is_200() {
    let token = issue_access_token("33333333-3333-3333-3333-333333333333", ACCESS_SECRET.as_bytes())
        .expect("issue");
    let (status, json) = send(get_with_token("/validate-session", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Session is valid");
    assert_eq!(json["user"]["id"], "33333333-3333-3333-3333-333333333333");
}

#[tokio::test]
async fn validate_session_with_expired_token_reports_code() {
    let (status, json) = send(get_with_token("/validate-session", &expired_access_token())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "SESSION_EXPIRED");
}

#[tokio::test]
async fn refresh_without_token_is_401() {
    let (status, json) = send(post_json("/refresh-token", serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Refresh token required");
}

#[tokio::test]
async fn refresh_with_forged_token_is_403() {
    let (status, json) = send(post_json(
        "/refresh-token",
        serde_json::json!({"refreshToken": "forged.refresh.token"}),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Invalid refresh token");
}

#[tokio::test]
async fn refresh_with_access_secret_signed_token_is_403() {
    // A token signed with the access secret must not pass refresh
    // verification.
    let token = issue_access_token("44444444-4444-4444-4444-444444444444", ACCESS_SECRET.as_bytes())
        .expect("issue");
    let (status, _) = send(post_json(
        "/refresh-token",
        serde_json::json!({"refreshToken": token}),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_without_token_is_400() {
    let (status, json) = send(post_json("/logout", serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Refresh token required");
}
