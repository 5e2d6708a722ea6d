//! Client for the profiles table on the data API, plus the read cache.
//!
//! Fetch and patch go through equality filters on `profiles.user_id`;
//! creation goes through the `create_profile` remote procedure so the row is
//! associated with the caller's identity server-side.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::json;
use uuid::Uuid;

use crate::backend::types::{Profile, ProfileDraft, ProfilePatch};
use crate::backend::{BackendError, BackendResult, USER_AGENT};
use crate::config::BackendConfig;

/// Role assigned when a draft omits one.
const DEFAULT_ROLE: &str = "user";

/// Client for the data REST surface.
#[derive(Debug, Clone)]
pub struct ProfilesClient {
    backend: BackendConfig,
    http: reqwest::Client,
}

impl ProfilesClient {
    /// Creates a new profiles client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(backend: BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = backend.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { backend, http })
    }

    fn endpoint(&self, path: &str) -> BackendResult<url::Url> {
        self.backend
            .base_url
            .join(path)
            .map_err(|e| BackendError::parse(format!("Invalid endpoint {path}: {e}")))
    }

    /// Fetches the profile for `user_id`. Zero rows is a valid "no profile
    /// yet" state, reported as `Ok(None)`.
    ///
    /// # Errors
    /// Returns a classified error on rejection or transport failure.
    pub async fn get_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> BackendResult<Option<Profile>> {
        let mut url = self.endpoint("/rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("user_id", &format!("eq.{user_id}"));

        let body = self
            .send(
                self.http
                    .get(url)
                    .header("apikey", &self.backend.anon_key)
                    .bearer_auth(access_token),
            )
            .await?;

        let mut rows: Vec<Profile> = serde_json::from_str(&body)
            .map_err(|e| BackendError::parse(format!("Malformed profile rows: {e}")))?;

        // Equality filter on a unique key: 0 or 1 rows.
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Creates a profile through the `create_profile` procedure.
    ///
    /// # Errors
    /// Returns a classified error on rejection or transport failure.
    pub async fn create_profile(
        &self,
        access_token: &str,
        draft: &ProfileDraft,
    ) -> BackendResult<()> {
        let url = self.endpoint("/rest/v1/rpc/create_profile")?;

        self.send(
            self.http
                .post(url)
                .header("apikey", &self.backend.anon_key)
                .bearer_auth(access_token)
                .json(&json!({
                    "p_firstname": draft.firstname,
                    "p_lastname": draft.lastname,
                    "p_email": draft.email,
                    "p_role": draft.role.as_deref().unwrap_or(DEFAULT_ROLE),
                })),
        )
        .await?;
        Ok(())
    }

    /// Patches the profile for `user_id`. Only supplied fields change;
    /// applying the same patch twice yields the same stored state.
    ///
    /// # Errors
    /// Returns a classified error on rejection or transport failure.
    pub async fn update_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> BackendResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut url = self.endpoint("/rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user_id}"));

        self.send(
            self.http
                .patch(url)
                .header("apikey", &self.backend.anon_key)
                .header("Prefer", "return=minimal")
                .bearer_auth(access_token)
                .json(patch),
        )
        .await?;
        Ok(())
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

/// Read cache for profile fetches, keyed by user id.
///
/// `lookup` distinguishes "not cached" (`None`) from "cached as absent"
/// (`Some(None)`), matching the loading / confirmed-absent split callers
/// need. Any successful create or update must invalidate the entry so the
/// next read reflects the write.
#[derive(Debug, Clone, Default)]
pub struct ProfileCache {
    entries: HashMap<Uuid, Option<Profile>>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `user_id`, if any.
    pub fn lookup(&self, user_id: Uuid) -> Option<&Option<Profile>> {
        self.entries.get(&user_id)
    }

    /// Stores a fetch result (present or confirmed absent).
    pub fn store(&mut self, user_id: Uuid, profile: Option<Profile>) {
        self.entries.insert(user_id, profile);
    }

    /// Drops the entry for `user_id`; the next read goes to the backend.
    pub fn invalidate(&mut self, user_id: Uuid) {
        self.entries.remove(&user_id);
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
