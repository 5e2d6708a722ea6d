//! Client for the hosted auth API (token grants, signup, recovery).
//!
//! Successful sign-in/sign-up/sign-out publish the resulting session state
//! through the [`SessionHub`] and keep the persisted copy in sync, so UI
//! readers update out-of-band from the call site.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::backend::types::{Session, SignUpOutcome, TokenResponse};
use crate::backend::{BackendError, BackendResult, USER_AGENT};
use crate::config::BackendConfig;
use crate::session::{self, SessionHub};

/// Client for the auth REST surface.
#[derive(Debug, Clone)]
pub struct AuthClient {
    backend: BackendConfig,
    http: reqwest::Client,
    hub: SessionHub,
}

impl AuthClient {
    /// Creates a new auth client publishing session changes to `hub`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(backend: BackendConfig, hub: SessionHub) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = backend.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { backend, http, hub })
    }

    /// The hub this client publishes to.
    pub fn hub(&self) -> &SessionHub {
        &self.hub
    }

    fn endpoint(&self, path: &str) -> BackendResult<url::Url> {
        self.backend
            .base_url
            .join(path)
            .map_err(|e| BackendError::parse(format!("Invalid endpoint {path}: {e}")))
    }

    fn post(&self, url: url::Url) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(&self.backend.anon_key)
    }

    /// Loads the initial session state: persisted session from disk, with a
    /// silent refresh when expired. Any failure settles to unauthenticated;
    /// no error is surfaced.
    pub async fn bootstrap(&self) -> Option<Session> {
        let persisted = match session::load_persisted() {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!("Discarding unreadable persisted session: {e:#}");
                None
            }
        };

        let Some(persisted) = persisted else {
            self.hub.publish(None);
            return None;
        };

        if !persisted.is_expired() {
            debug!(user = %persisted.user.email, "Restored persisted session");
            self.hub.publish(Some(persisted.clone()));
            return Some(persisted);
        }

        match self.refresh(&persisted.refresh_token).await {
            Ok(refreshed) => {
                debug!(user = %refreshed.user.email, "Refreshed expired session");
                self.store_session(&refreshed);
                Some(refreshed)
            }
            Err(e) => {
                warn!("Session refresh failed, treating as signed out: {e}");
                if let Err(e) = session::clear_persisted() {
                    warn!("Failed to clear stale session: {e:#}");
                }
                self.hub.publish(None);
                None
            }
        }
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    /// Returns a classified error on rejection or transport failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let mut url = self.endpoint("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let body = self
            .send(self.post(url).json(&json!({
                "email": email,
                "password": password,
            })))
            .await?;

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::parse(format!("Malformed token response: {e}")))?;
        let session = token.into_session();
        self.store_session(&session);
        Ok(session)
    }

    /// Registers a new account.
    ///
    /// Whether a live session is issued depends on the backend's
    /// email-confirmation policy; the outcome tells the caller which branch
    /// to take.
    ///
    /// # Errors
    /// Returns a classified error on rejection (e.g. duplicate email).
    pub async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome> {
        let url = self.endpoint("/auth/v1/signup")?;

        let body = self
            .send(self.post(url).json(&json!({
                "email": email,
                "password": password,
            })))
            .await?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| BackendError::parse(format!("Malformed signup response: {e}")))?;

        if value.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(value)
                .map_err(|e| BackendError::parse(format!("Malformed signup session: {e}")))?;
            let session = token.into_session();
            self.store_session(&session);
            Ok(SignUpOutcome::SessionIssued(session))
        } else {
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    /// Invalidates the current session server-side.
    ///
    /// The local session is cleared and `None` is published regardless of
    /// the HTTP result; the signed-out end state is enforced client-side.
    ///
    /// # Errors
    /// Returns the backend rejection, after local state is already cleared.
    pub async fn sign_out(&self) -> BackendResult<()> {
        let access_token = self.hub.snapshot().session.map(|s| s.access_token);

        if let Err(e) = session::clear_persisted() {
            warn!("Failed to clear persisted session: {e:#}");
        }
        self.hub.publish(None);

        let Some(access_token) = access_token else {
            return Ok(());
        };

        let url = self.endpoint("/auth/v1/logout")?;
        let request = self
            .http
            .post(url)
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(access_token);
        self.send(request).await?;
        Ok(())
    }

    /// Requests a password-reset email. Idempotent and safely retriable.
    ///
    /// # Errors
    /// Returns a classified error on rejection or transport failure.
    pub async fn send_reset_link(&self, email: &str) -> BackendResult<()> {
        let mut url = self.endpoint("/auth/v1/recover")?;
        if let Some(redirect) = &self.backend.reset_redirect {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }

        self.send(self.post(url).json(&json!({ "email": email })))
            .await?;
        Ok(())
    }

    /// Sets a new password for the signed-in user.
    ///
    /// # Errors
    /// Returns an error when no session is active or the backend rejects
    /// the new password.
    pub async fn update_password(&self, new_password: &str) -> BackendResult<()> {
        let Some(current) = self.hub.snapshot().session else {
            return Err(BackendError::new(
                super::BackendErrorKind::Api,
                "Not signed in.",
            ));
        };

        let url = self.endpoint("/auth/v1/user")?;
        let request = self
            .http
            .put(url)
            .header("apikey", &self.backend.anon_key)
            .bearer_auth(&current.access_token)
            .json(&json!({ "password": new_password }));
        self.send(request).await?;
        Ok(())
    }

    /// Exchanges a refresh token for a fresh session. Used by [`Self::bootstrap`].
    async fn refresh(&self, refresh_token: &str) -> BackendResult<Session> {
        let mut url = self.endpoint("/auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let body = self
            .send(self.post(url).json(&json!({ "refresh_token": refresh_token })))
            .await?;

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::parse(format!("Malformed refresh response: {e}")))?;
        Ok(token.into_session())
    }

    fn store_session(&self, session: &Session) {
        if let Err(e) = session::persist(session) {
            warn!("Failed to persist session: {e:#}");
        }
        self.hub.publish(Some(session.clone()));
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> BackendResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(&e))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(BackendError::api(status.as_u16(), &body))
        }
    }
}
