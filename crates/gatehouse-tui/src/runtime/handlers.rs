//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return the `UiEvent` carrying the
//! operation's result. The runtime spawns them with a task lifecycle and
//! sends the result to the inbox; they never mutate state directly.

use gatehouse_core::backend::types::{ProfileDraft, ProfilePatch};
use gatehouse_core::backend::{AuthClient, BackendError, BackendErrorKind, ProfilesClient};
use uuid::Uuid;

use crate::events::UiEvent;

pub async fn sign_in(auth: AuthClient, email: String, password: String) -> UiEvent {
    UiEvent::SignInResult(auth.sign_in(&email, &password).await)
}

pub async fn sign_up(auth: AuthClient, email: String, password: String) -> UiEvent {
    let result = auth.sign_up(&email, &password).await;
    UiEvent::SignUpResult { email, result }
}

pub async fn sign_out(auth: AuthClient) -> UiEvent {
    UiEvent::SignOutResult(auth.sign_out().await)
}

pub async fn send_reset_link(auth: AuthClient, email: String, resend: bool) -> UiEvent {
    let result = auth.send_reset_link(&email).await;
    UiEvent::ResetLinkResult {
        email,
        resend,
        result,
    }
}

pub async fn update_password(auth: AuthClient, password: String) -> UiEvent {
    UiEvent::PasswordUpdateResult(auth.update_password(&password).await)
}

pub async fn load_profile(
    profiles: ProfilesClient,
    access_token: Option<String>,
    user_id: Uuid,
) -> UiEvent {
    let result = match access_token {
        Some(token) => profiles.get_profile(&token, user_id).await,
        None => Err(not_signed_in()),
    };
    UiEvent::ProfileLoaded { user_id, result }
}

pub async fn save_profile(
    profiles: ProfilesClient,
    access_token: Option<String>,
    user_id: Uuid,
    patch: ProfilePatch,
) -> UiEvent {
    let result = match access_token {
        Some(token) => profiles.update_profile(&token, user_id, &patch).await,
        None => Err(not_signed_in()),
    };
    UiEvent::ProfileSaved { user_id, result }
}

pub async fn create_profile(
    profiles: ProfilesClient,
    access_token: Option<String>,
    user_id: Uuid,
    draft: ProfileDraft,
) -> UiEvent {
    let result = match access_token {
        Some(token) => profiles.create_profile(&token, &draft).await,
        None => Err(not_signed_in()),
    };
    UiEvent::ProfileCreated { user_id, result }
}

fn not_signed_in() -> BackendError {
    BackendError::new(BackendErrorKind::Api, "Not signed in.")
}
