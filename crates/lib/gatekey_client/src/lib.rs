//! # gatekey_client
//!
//! Session-aware HTTP client for the Gatekey API. Holds the current
//! `{user, access token, refresh token}` triple in a durable local
//! store, attaches the access token to every authorized call, and
//! transparently refreshes once on a 401 before surfacing expiry.

pub mod error;
pub mod models;
pub mod store;

use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientError;
use crate::models::{ApiErrorBody, AuthPayload, Session, SessionUser, TokenPair};
use crate::store::SessionStore;

/// HTTP client with a cached session.
///
/// The session moves through three states: anonymous (no stored
/// triple), authenticated, and refreshing. Authorized calls made while
/// anonymous short-circuit locally with [`ClientError::NoSession`] —
/// no network round trip, nothing cleared.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    store: SessionStore,
    session: Mutex<Option<Session>>,
}

impl SessionClient {
    /// Client against `base_url`, with the session persisted at the
    /// platform data directory. Any previously persisted session is
    /// picked up.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_store(base_url, SessionStore::default_path())
    }

    /// Client with an explicit session store.
    pub fn with_store(
        base_url: impl Into<String>,
        store: SessionStore,
    ) -> Result<Self, ClientError> {
        let session = store.load()?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
            session: Mutex::new(session),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<SessionUser> {
        self.session.lock().await.as_ref().map(|s| s.user.clone())
    }

    /// Whether a session triple is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Register a new account and start a session.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ClientError> {
        let resp = self
            .http
            .post(self.url("/register"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        self.adopt_session(resp).await
    }

    /// Log in and start a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        self.adopt_session(resp).await
    }

    /// Revoke the current refresh token server-side, then drop the
    /// local session. A no-op when already anonymous.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let refresh_token = {
            let session = self.session.lock().await;
            match session.as_ref() {
                Some(s) => s.refresh_token.clone(),
                None => return Ok(()),
            }
        };

        let result = self
            .http
            .post(self.url("/logout"))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await;

        // Local state goes regardless of what the server said.
        *self.session.lock().await = None;
        self.store.clear()?;

        let resp = result?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(())
    }

    /// Proactively check whether the held access token is still fresh.
    pub async fn validate_session(&self) -> Result<bool, ClientError> {
        let access_token = self.access_token().await.ok_or(ClientError::NoSession)?;
        let resp = self
            .http
            .get(self.url("/validate-session"))
            .bearer_auth(&access_token)
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Authorized GET returning the response JSON.
    ///
    /// On a 401 the client refreshes the token pair once and retries
    /// the original request once; a second 401 is surfaced as a plain
    /// API error, never another refresh.
    pub async fn get(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let stale = self.access_token().await.ok_or(ClientError::NoSession)?;

        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&stale)
            .send()
            .await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return decode_json(resp).await;
        }

        debug!(path, "access token rejected, attempting refresh");
        let fresh = self.refresh_access_token(&stale).await?;

        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&fresh)
            .send()
            .await?;
        decode_json(resp).await
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Rotate the token pair via `/refresh-token`.
    ///
    /// The session lock is held for the whole exchange, so concurrent
    /// 401s queue behind one in-flight rotation; a waiter that acquires
    /// the lock after the token already changed reuses the new token
    /// instead of spending another refresh.
    async fn refresh_access_token(&self, stale: &str) -> Result<String, ClientError> {
        let mut session = self.session.lock().await;

        let refresh_token = match session.as_ref() {
            Some(s) if s.access_token != stale => return Ok(s.access_token.clone()),
            Some(s) => s.refresh_token.clone(),
            None => return Err(ClientError::SessionExpired),
        };

        let resp = self
            .http
            .post(self.url("/refresh-token"))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !resp.status().is_success() {
            // Rotation rejected: the session is over.
            *session = None;
            self.store.clear()?;
            return Err(ClientError::SessionExpired);
        }

        let pair: TokenPair = resp.json().await?;
        match session.as_mut() {
            Some(s) => {
                s.access_token = pair.access_token;
                s.refresh_token = pair.refresh_token;
                self.store.save(s)?;
                Ok(s.access_token.clone())
            }
            // Unreachable while the lock is held, but never panic over it.
            None => Err(ClientError::SessionExpired),
        }
    }

    /// Store the session from a login/registration response.
    async fn adopt_session(&self, resp: reqwest::Response) -> Result<SessionUser, ClientError> {
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let payload: AuthPayload = resp.json().await?;
        let session = Session {
            user: payload.user.clone(),
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
        };
        self.store.save(&session)?;
        *self.session.lock().await = Some(session);
        Ok(payload.user)
    }
}

/// Map a non-success response to [`ClientError::Api`].
async fn api_error(resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let message = resp
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| "Server error".to_string());
    ClientError::Api { status, message }
}

async fn decode_json(resp: reqwest::Response) -> Result<serde_json::Value, ClientError> {
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }
    Ok(resp.json().await?)
}
