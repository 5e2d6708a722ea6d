//! Effects produced by the reducer and executed by the runtime.
//!
//! Each backend effect carries the task id the reducer allocated for it; the
//! matching result is dropped if the id has gone stale by the time it lands.

use gatehouse_core::backend::types::{ProfileDraft, ProfilePatch};
use uuid::Uuid;

use crate::common::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Exit the event loop.
    Quit,

    SignIn {
        task: TaskId,
        email: String,
        password: String,
    },
    SignUp {
        task: TaskId,
        email: String,
        password: String,
    },
    SignOut {
        task: TaskId,
    },
    SendResetLink {
        task: TaskId,
        email: String,
        resend: bool,
    },
    UpdatePassword {
        task: TaskId,
        password: String,
    },

    LoadProfile {
        task: TaskId,
        user_id: Uuid,
    },
    SaveProfile {
        task: TaskId,
        user_id: Uuid,
        patch: ProfilePatch,
    },
    CreateProfile {
        task: TaskId,
        user_id: Uuid,
        draft: ProfileDraft,
    },
}
