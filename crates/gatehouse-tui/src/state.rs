//! TUI state hierarchy.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── route: Route (current page)
//! │   ├── session: SessionSnapshot (read-only view of the session store)
//! │   ├── pending_redirect: Option<Route> (where to return after sign-in)
//! │   ├── pages: Pages (per-page form state, ephemeral)
//! │   ├── cache: ProfileCache (keyed by user id)
//! │   ├── tasks: Tasks / task_seq: TaskSeq (async task lifecycle)
//! │   └── notices: Notices (transient status messages)
//! └── overlay: Option<Overlay> (identity menu)
//! ```
//!
//! The split between `tui` and `overlay` lets overlay handlers borrow the
//! rest of the state mutably without conflicts.

use gatehouse_core::backend::ProfileCache;
use gatehouse_core::session::SessionSnapshot;

use crate::common::{TaskSeq, Tasks};
use crate::features::forgot_password::ForgotPasswordPage;
use crate::features::login::LoginPage;
use crate::features::profile::ProfilePage;
use crate::features::register::RegisterPage;
use crate::features::reset_password::ResetPasswordPage;
use crate::notify::Notices;
use crate::overlays::Overlay;
use crate::router::Route;

/// Per-page form state. Each page owns its fields and inline errors;
/// navigation away destroys them (see `Pages::reset_route`).
#[derive(Debug)]
pub struct Pages {
    pub login: LoginPage,
    pub register: RegisterPage,
    pub forgot_password: ForgotPasswordPage,
    pub reset_password: ResetPasswordPage,
    pub profile: ProfilePage,
}

impl Default for Pages {
    fn default() -> Self {
        Self {
            login: LoginPage::new(),
            register: RegisterPage::new(),
            forgot_password: ForgotPasswordPage::new(),
            reset_password: ResetPasswordPage::new(),
            profile: ProfilePage::new(),
        }
    }
}

impl Pages {
    /// Resets the page owning `route` to a fresh state.
    pub fn reset_route(&mut self, route: &Route) {
        match route {
            Route::Login => self.login = LoginPage::new(),
            Route::Register => self.register = RegisterPage::new(),
            Route::ForgotPassword => self.forgot_password = ForgotPasswordPage::new(),
            Route::ResetPassword => self.reset_password = ResetPasswordPage::new(),
            Route::Home(_) => self.profile = ProfilePage::new(),
            Route::NotFound(_) => {}
        }
    }
}

/// Main TUI state.
#[derive(Debug)]
pub struct TuiState {
    pub should_quit: bool,
    pub route: Route,
    pub session: SessionSnapshot,
    /// Originally requested route, preserved across the login redirect.
    pub pending_redirect: Option<Route>,
    pub pages: Pages,
    pub cache: ProfileCache,
    pub tasks: Tasks,
    pub task_seq: TaskSeq,
    pub notices: Notices,
    /// Terminal size from the last frame.
    pub size: (u16, u16),
    /// Tick counter driving the spinner.
    pub ticks: u64,
}

impl TuiState {
    pub fn new(start: Route) -> Self {
        Self {
            should_quit: false,
            route: start,
            session: SessionSnapshot::default(),
            pending_redirect: None,
            pages: Pages::default(),
            cache: ProfileCache::new(),
            tasks: Tasks::default(),
            task_seq: TaskSeq::default(),
            notices: Notices::default(),
            size: (0, 0),
            ticks: 0,
        }
    }

    /// Full client-side reset after sign-out: no cached state survives.
    pub fn reset_after_sign_out(&mut self) {
        self.pages = Pages::default();
        self.cache.clear();
        self.tasks.clear_all();
        self.pending_redirect = None;
        self.session = SessionSnapshot {
            settled: true,
            session: None,
        };
        self.route = Route::Login;
    }
}

/// Application state (split: tui + overlay).
#[derive(Debug)]
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(start: Route) -> Self {
        Self {
            tui: TuiState::new(start),
            overlay: None,
        }
    }
}
