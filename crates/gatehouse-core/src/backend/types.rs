//! Wire and domain types shared by the backend clients.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-facing subset of session data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
}

/// Backend-issued proof of an authenticated user.
///
/// Created on successful sign-in/sign-up, destroyed on sign-out or expiry,
/// replaced on refresh. At most one active session per client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer token for API calls.
    pub access_token: String,
    /// Long-lived token used to mint a replacement session.
    pub refresh_token: String,
    /// Expiry as unix seconds.
    pub expires_at: i64,
    pub user: UserIdentity,
}

impl Session {
    /// Leeway so a token isn't presented moments before it lapses.
    const EXPIRY_LEEWAY_SECS: i64 = 30;

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() + Self::EXPIRY_LEEWAY_SECS >= self.expires_at
    }
}

/// Token-grant response from the auth API.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserIdentity,
}

impl TokenResponse {
    pub(crate) fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| Utc::now().timestamp() + self.expires_in.unwrap_or(3600));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Result of a sign-up attempt.
///
/// Backend policy decides the shape: email-confirmation-off issues a session
/// synchronously, confirmation-on answers with a bare user record instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SessionIssued(Session),
    ConfirmationRequired,
}

impl SignUpOutcome {
    pub fn session_issued(&self) -> bool {
        matches!(self, SignUpOutcome::SessionIssued(_))
    }
}

/// Application-owned profile record, one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub is_complete: bool,
}

impl Profile {
    /// Applies a partial patch, returning the resulting record.
    ///
    /// Only supplied fields change; applying the same patch twice yields the
    /// same record.
    pub fn merged(&self, patch: &ProfilePatch) -> Profile {
        Profile {
            user_id: self.user_id,
            firstname: patch.firstname.clone().unwrap_or_else(|| self.firstname.clone()),
            lastname: patch.lastname.clone().unwrap_or_else(|| self.lastname.clone()),
            email: patch.email.clone().unwrap_or_else(|| self.email.clone()),
            role: patch.role.clone().unwrap_or_else(|| self.role.clone()),
            is_complete: patch.is_complete.unwrap_or(self.is_complete),
        }
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.firstname.is_none()
            && self.lastname.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.is_complete.is_none()
    }
}

/// Fields for profile creation. `user_id` is never supplied by the client;
/// the creation procedure associates the row with the caller's identity
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    /// Defaults to "user" when omitted.
    pub role: Option<String>,
}
