//! API server configuration.
//!
//! Built once at startup and passed through `AppState`; business logic
//! never reads the environment directly.

use std::path::PathBuf;

use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::info;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Signing secret for access tokens.
    pub access_token_secret: String,
    /// Signing secret for refresh tokens. Must differ from the access
    /// secret so one leaked key cannot forge the other token kind.
    pub refresh_token_secret: String,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `BIND_ADDR`            | `127.0.0.1:5000`                         |
    /// | `DATABASE_URL`         | `postgres://localhost:5432/gatekey`      |
    /// | `ACCESS_TOKEN_SECRET`  | generated & persisted to file            |
    /// | `REFRESH_TOKEN_SECRET` | generated & persisted to file            |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/gatekey".into()),
            access_token_secret: resolve_secret("ACCESS_TOKEN_SECRET", "access-secret"),
            refresh_token_secret: resolve_secret("REFRESH_TOKEN_SECRET", "refresh-secret"),
        }
    }
}

/// Resolve a signing secret: env var → persisted file → freshly generated.
///
/// Generated secrets are persisted so tokens survive a server restart.
pub fn resolve_secret(env_key: &str, file_name: &str) -> String {
    if let Ok(secret) = std::env::var(env_key)
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = secret_path(file_name);
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new signing secret");
    secret
}

/// Path to a persisted secret file.
fn secret_path(file_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gatekey")
        .join(file_name)
}
