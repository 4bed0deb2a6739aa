//! Full auth-flow integration test — starts an ephemeral PostgreSQL,
//! runs migrations, and walks the whole session lifecycle through the
//! router: register → login → refresh rotation → logout.
//!
//! Requires PostgreSQL binaries on PATH (`pg_config`).

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use gatekey_api::config::ApiConfig;
use gatekey_api::{AppState, router};
use gatekey_core::db::LocalPg;
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    bearer: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).expect("parse JSON");
    (status, json)
}

#[tokio::test]
async fn session_lifecycle() {
    // Spin up an ephemeral PostgreSQL instance.
    let mut db = LocalPg::ephemeral().await.expect("LocalPg::ephemeral");
    db.setup().await.expect("db setup");
    db.start().await.expect("db start");

    let pool = sqlx::PgPool::connect(&db.connection_url())
        .await
        .expect("connect to ephemeral PG");
    gatekey_api::migrate(&pool).await.expect("migrations");

    let state = AppState {
        pool,
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: db.connection_url(),
            access_token_secret: "test-access-secret".into(),
            refresh_token_secret: "test-refresh-secret".into(),
        },
    };
    let app = router(state);

    // Register alice.
    let (status, reg) = send(
        &app,
        "POST",
        "/register",
        Some(serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "pw12345678",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reg["user"]["name"], "Alice");
    assert_eq!(reg["user"]["email"], "alice@example.com");
    let reg_access = reg["accessToken"].as_str().expect("accessToken").to_string();
    let reg_refresh = reg["refreshToken"].as_str().expect("refreshToken").to_string();
    assert!(!reg_access.is_empty());
    assert!(!reg_refresh.is_empty());

    // The registration access token immediately passes the guard and
    // decodes to the same user id.
    let (status, prot) = send(&app, "GET", "/protected", None, Some(&reg_access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prot["userId"], reg["user"]["id"]);

    // Registering the same email again fails, regardless of password.
    let (status, dup) = send(
        &app,
        "POST",
        "/register",
        Some(serde_json::json!({
            "name": "Mallory",
            "email": "alice@example.com",
            "password": "different-pw",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(dup["message"], "Email already exists");

    // Login with the same credentials: fresh issuance, tokens differ.
    let (status, login) = send(
        &app,
        "POST",
        "/login",
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": "pw12345678",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["message"], "Login successful");
    assert_eq!(login["user"]["id"], reg["user"]["id"]);
    let login_refresh = login["refreshToken"].as_str().expect("refreshToken").to_string();
    assert_ne!(login["accessToken"], reg["accessToken"]);
    assert_ne!(login_refresh, reg_refresh);

    // Wrong password and unknown email produce the same error.
    let (status_a, wrong_pw) = send(
        &app,
        "POST",
        "/login",
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": "wrong-password",
        })),
        None,
    )
    .await;
    let (status_b, no_user) = send(
        &app,
        "POST",
        "/login",
        Some(serde_json::json!({
            "email": "nobody@example.com",
            "password": "pw12345678",
        })),
        None,
    )
    .await;
    assert_eq!(status_a, StatusCode::BAD_REQUEST);
    assert_eq!(status_a, status_b);
    assert_eq!(wrong_pw["message"], no_user["message"]);
    assert_eq!(wrong_pw["message"], "Invalid email or password");

    // Rotate with the login refresh token.
    let (status, pair) = send(
        &app,
        "POST",
        "/refresh-token",
        Some(serde_json::json!({"refreshToken": login_refresh})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated_refresh = pair["refreshToken"].as_str().expect("refreshToken").to_string();
    assert_ne!(rotated_refresh, login_refresh);
    assert!(!pair["accessToken"].as_str().expect("accessToken").is_empty());

    // The rotated-away token is single-use: re-submitting it fails.
    let (status, rejected) = send(
        &app,
        "POST",
        "/refresh-token",
        Some(serde_json::json!({"refreshToken": login_refresh})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(rejected["message"], "Invalid refresh token");

    // Logout revokes the current refresh token.
    let (status, out) = send(
        &app,
        "POST",
        "/logout",
        Some(serde_json::json!({"refreshToken": rotated_refresh})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["message"], "Logout successful");

    // A revoked token cannot refresh.
    let (status, _) = send(
        &app,
        "POST",
        "/refresh-token",
        Some(serde_json::json!({"refreshToken": rotated_refresh})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Logout is idempotent: deleting an already-gone token succeeds.
    let (status, _) = send(
        &app,
        "POST",
        "/logout",
        Some(serde_json::json!({"refreshToken": rotated_refresh})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The registration refresh token from the other "device" is still
    // live: concurrent sessions are not revoked by login or rotation.
    let (status, _) = send(
        &app,
        "POST",
        "/refresh-token",
        Some(serde_json::json!({"refreshToken": reg_refresh})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    db.stop().await.expect("db stop");
}
