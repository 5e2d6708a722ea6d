//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! This is the single source of truth for how events modify state.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use gatehouse_core::session::SessionSnapshot;

use crate::common::Form;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::profile::ProfileLoad;
use crate::features::{forgot_password, login, profile, register, reset_password, shell};
use crate::overlays::{Overlay, OverlayTransition, OverlayUpdate};
use crate::router::{GuardState, HomeChild, Route};
use crate::state::{AppState, TuiState};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.ticks = app.tui.ticks.wrapping_add(1);
            app.tui.notices.expire(Instant::now());
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.tui.size = (width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),

        UiEvent::SessionChanged(snapshot) => handle_session_changed(app, snapshot),

        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = app.tui.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else {
                vec![]
            }
        }

        UiEvent::SignInResult(result) => login::handle_result(&mut app.tui, result),
        UiEvent::SignUpResult { email, result } => {
            register::handle_result(&mut app.tui, &email, result)
        }
        UiEvent::SignOutResult(result) => {
            // The client-side sign-out happens regardless of what the
            // backend said; a failed revocation only gets a notice.
            app.overlay = None;
            app.tui.reset_after_sign_out();
            if result.is_err() {
                app.tui
                    .notices
                    .error("Error logging out. Please try again.");
            }
            vec![]
        }
        UiEvent::ResetLinkResult {
            email,
            resend,
            result,
        } => forgot_password::handle_result(&mut app.tui, email, resend, result),
        UiEvent::PasswordUpdateResult(result) => {
            reset_password::handle_result(&mut app.tui, result)
        }

        UiEvent::ProfileLoaded { user_id, result } => {
            profile::handle_loaded(&mut app.tui, user_id, result)
        }
        UiEvent::ProfileSaved { user_id, result } => {
            profile::handle_saved(&mut app.tui, user_id, result)
        }
        UiEvent::ProfileCreated { user_id, result } => {
            profile::handle_created(&mut app.tui, user_id, result)
        }
    }
}

/// Moves to `to`, enforcing the session guard.
///
/// Guarded targets without a settled session park the target in
/// `pending_redirect` and land on sign-in instead; sign-in success resumes
/// it. The page being left is reset so no form state leaks across visits.
pub fn navigate(tui: &mut TuiState, to: Route) -> Vec<UiEffect> {
    let leaving = tui.route.clone();
    tui.pages.reset_route(&leaving);

    if to.is_guarded() && GuardState::evaluate(&tui.session) == GuardState::Unauthenticated {
        tui.pending_redirect = Some(to);
        tui.route = Route::Login;
        return vec![];
    }

    tui.route = to;
    if tui.route == Route::Home(HomeChild::Profile)
        && GuardState::evaluate(&tui.session) == GuardState::Authenticated
    {
        return profile::enter(tui);
    }
    vec![]
}

fn handle_session_changed(app: &mut AppState, snapshot: SessionSnapshot) -> Vec<UiEffect> {
    app.tui.session = snapshot;
    if !app.tui.route.is_guarded() {
        return vec![];
    }

    match GuardState::evaluate(&app.tui.session) {
        GuardState::Loading => vec![],
        GuardState::Unauthenticated => {
            // The session ended under a guarded route (expiry, revocation,
            // sign-out elsewhere). Remember where the user was.
            app.overlay = None;
            let from = app.tui.route.clone();
            app.tui.pages.reset_route(&from);
            app.tui.pending_redirect = Some(from);
            app.tui.route = Route::Login;
            vec![]
        }
        GuardState::Authenticated => {
            // A session arriving while the profile page waits (e.g. the
            // initial restore settling) kicks off the fetch it was missing.
            if app.tui.route == Route::Home(HomeChild::Profile)
                && matches!(app.tui.pages.profile.load, ProfileLoad::Loading)
                && !app.tui.tasks.profile_load.is_running()
            {
                return profile::enter(&mut app.tui);
            }
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Paste(text) => {
            if app.overlay.is_none()
                && let Some(form) = active_form(&mut app.tui)
            {
                form.insert_str(&text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Ctrl+C quits from anywhere.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return vec![UiEffect::Quit];
    }

    if let Some(overlay) = app.overlay.as_mut() {
        let overlay_update = match overlay {
            Overlay::IdentityMenu(menu) => menu.handle_key(&mut app.tui, key),
        };
        return apply_overlay_update(app, overlay_update);
    }

    match &app.tui.route {
        Route::Login => login::handle_key(&mut app.tui, key),
        Route::Register => register::handle_key(&mut app.tui, key),
        Route::ForgotPassword => forgot_password::handle_key(&mut app.tui, key),
        Route::ResetPassword => reset_password::handle_key(&mut app.tui, key),
        Route::Home(_) => match GuardState::evaluate(&app.tui.session) {
            GuardState::Authenticated => shell::handle_key(app, key),
            GuardState::Loading | GuardState::Unauthenticated => vec![],
        },
        Route::NotFound(_) => shell::handle_not_found_key(app, key),
    }
}

fn apply_overlay_update(app: &mut AppState, overlay_update: OverlayUpdate) -> Vec<UiEffect> {
    let OverlayUpdate {
        transition,
        mut effects,
    } = overlay_update;
    match transition {
        OverlayTransition::Stay => effects,
        OverlayTransition::Close => {
            app.overlay = None;
            effects
        }
        OverlayTransition::CloseAndNavigate(to) => {
            app.overlay = None;
            let mut nav_effects = navigate(&mut app.tui, to);
            nav_effects.append(&mut effects);
            nav_effects
        }
    }
}

/// The form receiving pasted text on the current route, if any.
fn active_form(tui: &mut TuiState) -> Option<&mut Form> {
    match &tui.route {
        Route::Login => Some(&mut tui.pages.login.form),
        Route::Register => Some(&mut tui.pages.register.form),
        Route::ForgotPassword => match &mut tui.pages.forgot_password {
            forgot_password::ForgotPasswordPage::Form { form } => Some(form),
            forgot_password::ForgotPasswordPage::Confirmation { .. } => None,
        },
        Route::ResetPassword => Some(&mut tui.pages.reset_password.form),
        Route::Home(HomeChild::Profile) => match tui.pages.profile.load {
            ProfileLoad::Absent | ProfileLoad::Ready(_) => Some(&mut tui.pages.profile.form),
            ProfileLoad::Loading | ProfileLoad::Failed(_) => None,
        },
        Route::Home(_) | Route::NotFound(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use gatehouse_core::backend::{BackendError, BackendErrorKind};
    use gatehouse_core::backend::types::{
        Profile, Session, SignUpOutcome, UserIdentity,
    };
    use uuid::Uuid;

    use super::*;
    use crate::common::{TaskCompleted, TaskKind, TaskStarted};
    use crate::notify::NoticeLevel;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn session_for(user_id: Uuid) -> Session {
        Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: Utc::now().timestamp() + 3600,
            user: UserIdentity {
                id: user_id,
                email: "ada@example.com".to_string(),
            },
        }
    }

    fn signed_in_app(user_id: Uuid) -> AppState {
        let mut app = AppState::new(Route::Home(HomeChild::Index));
        app.tui.session = SessionSnapshot {
            settled: true,
            session: Some(session_for(user_id)),
        };
        app
    }

    fn fill(form: &mut Form, values: &[&str]) {
        for (field, value) in form.fields.iter_mut().zip(values) {
            field.value = (*value).to_string();
        }
    }

    #[test]
    fn test_invalid_email_blocks_sign_in() {
        let mut app = AppState::new(Route::Login);
        fill(&mut app.tui.pages.login.form, &["not-an-email", "secret1"]);

        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(
            app.tui.pages.login.form.fields[0].error.as_deref(),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn test_sign_in_submits_and_success_resumes_redirect() {
        let mut app = AppState::new(Route::Login);
        app.tui.session = SessionSnapshot {
            settled: true,
            session: None,
        };
        app.tui.pending_redirect = Some(Route::Home(HomeChild::Reports));
        fill(
            &mut app.tui.pages.login.form,
            &["ada@example.com", "secret1"],
        );

        let effects = update(&mut app, key(KeyCode::Enter));
        let [UiEffect::SignIn { task, email, .. }] = effects.as_slice() else {
            panic!("expected a sign-in effect, got {effects:?}");
        };
        assert_eq!(email, "ada@example.com");

        let task = *task;
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::SignIn,
                started: TaskStarted { id: task },
            },
        );
        assert!(app.tui.tasks.sign_in.is_running());

        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::SignIn,
                completed: TaskCompleted {
                    id: task,
                    result: Box::new(UiEvent::SignInResult(Ok(session_for(Uuid::new_v4())))),
                },
            },
        );

        assert!(!app.tui.tasks.sign_in.is_running());
        assert_eq!(app.tui.route, Route::Home(HomeChild::Reports));
        assert!(app.tui.pending_redirect.is_none());
        assert_eq!(
            app.tui.notices.current().map(|n| n.level),
            Some(NoticeLevel::Success)
        );
    }

    #[test]
    fn test_sign_in_failure_posts_classified_notice() {
        let mut app = AppState::new(Route::Login);
        let err = BackendError::api(400, r#"{"error_code":"invalid_credentials"}"#);

        update(&mut app, UiEvent::SignInResult(Err(err)));

        assert_eq!(app.tui.route, Route::Login);
        assert_eq!(
            app.tui.notices.current().map(|n| n.text.as_str()),
            Some("Wrong email or password.")
        );
    }

    #[test]
    fn test_stale_task_result_is_dropped() {
        let mut app = AppState::new(Route::Login);

        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::SignIn,
                started: TaskStarted { id: crate::common::TaskId(7) },
            },
        );

        // A result from an earlier incarnation must not touch state.
        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::SignIn,
                completed: TaskCompleted {
                    id: crate::common::TaskId(3),
                    result: Box::new(UiEvent::SignInResult(Ok(session_for(Uuid::new_v4())))),
                },
            },
        );

        assert!(app.tui.tasks.sign_in.is_running());
        assert_eq!(app.tui.route, Route::Login);
        assert!(app.tui.session.session.is_none());
    }

    #[test]
    fn test_guarded_route_redirects_when_session_settles_absent() {
        let mut app = AppState::new(Route::Home(HomeChild::Profile));
        assert!(app.tui.session.is_loading());

        update(
            &mut app,
            UiEvent::SessionChanged(SessionSnapshot {
                settled: true,
                session: None,
            }),
        );

        assert_eq!(app.tui.route, Route::Login);
        assert_eq!(
            app.tui.pending_redirect,
            Some(Route::Home(HomeChild::Profile))
        );
    }

    #[test]
    fn test_session_settling_on_profile_page_triggers_fetch() {
        let user_id = Uuid::new_v4();
        let mut app = AppState::new(Route::Home(HomeChild::Profile));

        let effects = update(
            &mut app,
            UiEvent::SessionChanged(SessionSnapshot {
                settled: true,
                session: Some(session_for(user_id)),
            }),
        );

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadProfile { user_id: id, .. }] if *id == user_id
        ));
    }

    #[test]
    fn test_sign_up_confirmation_required_returns_to_login() {
        let mut app = AppState::new(Route::Register);

        update(
            &mut app,
            UiEvent::SignUpResult {
                email: "new@example.com".to_string(),
                result: Ok(SignUpOutcome::ConfirmationRequired),
            },
        );

        assert_eq!(app.tui.route, Route::Login);
        let notice = app.tui.notices.current().unwrap();
        assert!(notice.text.contains("new@example.com"));
    }

    #[test]
    fn test_sign_up_with_session_lands_on_profile() {
        let mut app = AppState::new(Route::Register);

        let effects = update(
            &mut app,
            UiEvent::SignUpResult {
                email: "new@example.com".to_string(),
                result: Ok(SignUpOutcome::SessionIssued(session_for(Uuid::new_v4()))),
            },
        );

        assert_eq!(app.tui.route, Route::Home(HomeChild::Profile));
        // Landing on the profile page starts the fetch right away.
        assert!(matches!(effects.as_slice(), [UiEffect::LoadProfile { .. }]));
    }

    #[test]
    fn test_sign_out_resets_even_on_backend_error() {
        let user_id = Uuid::new_v4();
        let mut app = signed_in_app(user_id);
        app.tui.cache.store(user_id, None);

        update(
            &mut app,
            UiEvent::SignOutResult(Err(BackendError::api(500, "boom"))),
        );

        assert_eq!(app.tui.route, Route::Login);
        assert!(app.tui.session.settled);
        assert!(app.tui.session.session.is_none());
        assert!(app.tui.cache.lookup(user_id).is_none());
        assert_eq!(
            app.tui.notices.current().map(|n| n.text.as_str()),
            Some("Error logging out. Please try again.")
        );
    }

    #[test]
    fn test_resend_keeps_the_confirmed_address() {
        let mut app = AppState::new(Route::ForgotPassword);

        update(
            &mut app,
            UiEvent::ResetLinkResult {
                email: "ada@example.com".to_string(),
                resend: false,
                result: Ok(()),
            },
        );
        assert!(matches!(
            &app.tui.pages.forgot_password,
            forgot_password::ForgotPasswordPage::Confirmation { email } if email == "ada@example.com"
        ));

        let effects = update(&mut app, key(KeyCode::Char('r')));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SendResetLink { email, resend: true, .. }] if email == "ada@example.com"
        ));
    }

    #[test]
    fn test_profile_save_invalidates_cache_and_refetches() {
        let user_id = Uuid::new_v4();
        let mut app = signed_in_app(user_id);
        app.tui.route = Route::Home(HomeChild::Profile);
        app.tui.cache.store(
            user_id,
            Some(Profile {
                user_id,
                firstname: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                role: "user".to_string(),
                is_complete: true,
            }),
        );

        let effects = update(
            &mut app,
            UiEvent::ProfileSaved {
                user_id,
                result: Ok(()),
            },
        );

        assert!(app.tui.cache.lookup(user_id).is_none());
        assert!(matches!(effects.as_slice(), [UiEffect::LoadProfile { .. }]));
        assert_eq!(
            app.tui.notices.current().map(|n| n.text.as_str()),
            Some("Profile updated successfully!")
        );
    }

    #[test]
    fn test_navigating_to_profile_serves_from_cache() {
        let user_id = Uuid::new_v4();
        let mut app = signed_in_app(user_id);
        app.tui.cache.store(user_id, None);

        let effects = navigate(&mut app.tui, Route::Home(HomeChild::Profile));

        assert!(effects.is_empty());
        assert!(matches!(
            app.tui.pages.profile.load,
            ProfileLoad::Absent
        ));
    }

    #[test]
    fn test_profile_fetch_error_offers_retry_not_create() {
        let user_id = Uuid::new_v4();
        let mut app = signed_in_app(user_id);
        app.tui.route = Route::Home(HomeChild::Profile);

        let effects = update(
            &mut app,
            UiEvent::ProfileLoaded {
                user_id,
                result: Err(BackendError::new(
                    BackendErrorKind::Network,
                    "connection refused",
                )),
            },
        );

        // A failed fetch must not pass for a confirmed-absent profile.
        assert!(effects.is_empty());
        assert!(matches!(
            app.tui.pages.profile.load,
            ProfileLoad::Failed(_)
        ));
        assert!(app.tui.cache.lookup(user_id).is_none());

        // Enter retries the fetch instead of firing the creation procedure.
        let effects = update(&mut app, key(KeyCode::Enter));
        assert!(matches!(effects.as_slice(), [UiEffect::LoadProfile { .. }]));
        assert!(matches!(app.tui.pages.profile.load, ProfileLoad::Loading));
    }

    #[test]
    fn test_unchanged_profile_submit_skips_the_request() {
        let user_id = Uuid::new_v4();
        let mut app = signed_in_app(user_id);
        app.tui.route = Route::Home(HomeChild::Profile);
        app.tui.pages.profile.set_loaded(Some(Profile {
            user_id,
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            role: "user".to_string(),
            is_complete: true,
        }));

        let effects = update(&mut app, key(KeyCode::Enter));
        assert!(effects.is_empty());
        assert_eq!(
            app.tui.notices.current().map(|n| n.text.as_str()),
            Some("No changes to save.")
        );

        fill(&mut app.tui.pages.profile.form, &["Ada", "Byron"]);
        let effects = update(&mut app, key(KeyCode::Enter));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SaveProfile { patch, .. }] if patch.lastname.as_deref() == Some("Byron")
        ));
    }

    #[test]
    fn test_identity_menu_sign_out_flow() {
        let mut app = signed_in_app(Uuid::new_v4());

        update(
            &mut app,
            UiEvent::Terminal(Event::Key(KeyEvent::new(
                KeyCode::Char('p'),
                KeyModifiers::CONTROL,
            ))),
        );
        assert!(app.overlay.is_some());

        update(&mut app, key(KeyCode::Down));
        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(app.overlay.is_none());
        assert!(matches!(effects.as_slice(), [UiEffect::SignOut { .. }]));
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = AppState::new(Route::ForgotPassword);
        let effects = update(
            &mut app,
            UiEvent::Terminal(Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            ))),
        );
        assert_eq!(effects, vec![UiEffect::Quit]);
    }

    #[test]
    fn test_paste_goes_into_the_focused_field() {
        let mut app = AppState::new(Route::Login);

        update(
            &mut app,
            UiEvent::Terminal(Event::Paste("ada@example.com".to_string())),
        );

        assert_eq!(app.tui.pages.login.form.value(0), "ada@example.com");
    }
}
