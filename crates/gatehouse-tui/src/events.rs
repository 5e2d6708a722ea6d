//! Events consumed by the reducer.
//!
//! Async handlers send these through the runtime inbox; the reducer is the
//! only consumer.

use crossterm::event::Event;
use gatehouse_core::backend::BackendError;
use gatehouse_core::backend::types::{Profile, Session, SignUpOutcome};
use gatehouse_core::session::SessionSnapshot;
use uuid::Uuid;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic timer; drives renders and notice expiry.
    Tick,
    /// Raw terminal input.
    Terminal(Event),
    /// Emitted each loop iteration with the current terminal size.
    Frame { width: u16, height: u16 },

    /// The session store published a new snapshot (initial load, sign-in,
    /// sign-out, refresh).
    SessionChanged(SessionSnapshot),

    /// An async task began.
    TaskStarted { kind: TaskKind, started: TaskStarted },
    /// An async task finished; the inner event is applied only if the task
    /// id still matches.
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    SignInResult(Result<Session, BackendError>),
    SignUpResult {
        email: String,
        result: Result<SignUpOutcome, BackendError>,
    },
    SignOutResult(Result<(), BackendError>),
    ResetLinkResult {
        email: String,
        resend: bool,
        result: Result<(), BackendError>,
    },
    PasswordUpdateResult(Result<(), BackendError>),

    ProfileLoaded {
        user_id: Uuid,
        result: Result<Option<Profile>, BackendError>,
    },
    ProfileSaved {
        user_id: Uuid,
        result: Result<(), BackendError>,
    },
    ProfileCreated {
        user_id: Uuid,
        result: Result<(), BackendError>,
    },
}
