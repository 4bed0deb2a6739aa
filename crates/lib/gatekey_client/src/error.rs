//! Client error types.

use thiserror::Error;

/// Errors surfaced by [`SessionClient`](crate::SessionClient).
///
/// `SessionExpired` is the only kind UIs branch on specially (forced
/// logout + redirect to login); `NoSession` means there was never a
/// session to expire, so the UI should not claim one ended.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No active session")]
    NoSession,

    #[error("Session expired")]
    SessionExpired,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Session store error: {0}")]
    Store(#[from] std::io::Error),

    #[error("Malformed session data: {0}")]
    Decode(#[from] serde_json::Error),
}
