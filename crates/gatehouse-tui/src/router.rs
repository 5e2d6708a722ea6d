//! Route table and session guard.
//!
//! Paths mirror the navigable surface: `/login`, `/register`,
//! `/forgot-password`, `/reset-password`, and the guarded `/home` shell with
//! `reports` and `profile` children. Anything else is the not-found page.

use gatehouse_core::session::SessionSnapshot;

/// Child page inside the authenticated shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeChild {
    Index,
    Reports,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Home(HomeChild),
    NotFound(String),
}

impl Route {
    /// Parses a path into a route; unknown paths land on not-found.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim();
        let normalized = trimmed.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(trimmed);

        match normalized {
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/forgot-password" => Route::ForgotPassword,
            "/reset-password" => Route::ResetPassword,
            "/home" => Route::Home(HomeChild::Index),
            "/home/reports" => Route::Home(HomeChild::Reports),
            "/home/profile" => Route::Home(HomeChild::Profile),
            other => Route::NotFound(other.to_string()),
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword => "/reset-password".to_string(),
            Route::Home(HomeChild::Index) => "/home".to_string(),
            Route::Home(HomeChild::Reports) => "/home/reports".to_string(),
            Route::Home(HomeChild::Profile) => "/home/profile".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// True for routes that require an active session.
    pub fn is_guarded(&self) -> bool {
        matches!(self, Route::Home(_))
    }

    /// Default landing route after sign-in.
    pub fn default_landing() -> Route {
        Route::Home(HomeChild::Index)
    }
}

/// Observable guard states for a guarded route.
///
/// Purely a function of the session snapshot; no independent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Session store not yet settled: render a placeholder.
    Loading,
    /// Settled with no session: redirect to login, preserving the
    /// originally requested route.
    Unauthenticated,
    /// Settled with a session: render the wrapped content.
    Authenticated,
}

impl GuardState {
    pub fn evaluate(snapshot: &SessionSnapshot) -> GuardState {
        if snapshot.is_loading() {
            GuardState::Loading
        } else if snapshot.session.is_some() {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        }
    }
}
