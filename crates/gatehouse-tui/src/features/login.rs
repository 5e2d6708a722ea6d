//! Sign-in page.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gatehouse_core::backend::types::Session;
use gatehouse_core::backend::{AuthFailure, BackendError};
use gatehouse_core::{session::SessionSnapshot, validate};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::common::{Form, FormKey, TextField};
use crate::effects::UiEffect;
use crate::features::page_chrome;
use crate::router::Route;
use crate::state::TuiState;
use crate::update::navigate;

const EMAIL: usize = 0;
const PASSWORD: usize = 1;

#[derive(Debug)]
pub struct LoginPage {
    pub form: Form,
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![TextField::new("Email"), TextField::masked("Password")]),
        }
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        // Sign-in is the entry page; Esc exits the app from here.
        KeyCode::Esc => return vec![UiEffect::Quit],
        KeyCode::Char('n') if ctrl => return navigate(tui, Route::Register),
        KeyCode::Char('f') if ctrl => return navigate(tui, Route::ForgotPassword),
        _ => {}
    }

    match tui.pages.login.form.handle_key(key) {
        FormKey::Submit => submit(tui),
        FormKey::Handled | FormKey::Ignored => vec![],
    }
}

fn submit(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.tasks.sign_in.is_running() {
        return vec![];
    }

    let form = &mut tui.pages.login.form;
    form.clear_errors();

    let email = form.value(EMAIL).trim().to_string();
    let password = form.value(PASSWORD).to_string();

    if let Err(message) = validate::email(&email) {
        form.set_error(EMAIL, message);
    }
    if let Err(message) = validate::password(&password) {
        form.set_error(PASSWORD, message);
    }
    if form.has_errors() {
        return vec![];
    }

    vec![UiEffect::SignIn {
        task: tui.task_seq.next_id(),
        email,
        password,
    }]
}

/// Applies a sign-in result.
///
/// Success lands on the originally requested route (or the default landing
/// page) without waiting for the session-store event; the snapshot is set
/// here so the guard sees the new session immediately.
pub fn handle_result(tui: &mut TuiState, result: Result<Session, BackendError>) -> Vec<UiEffect> {
    match result {
        Ok(session) => {
            tui.session = SessionSnapshot {
                settled: true,
                session: Some(session),
            };
            tui.notices.success("Welcome back!");
            let target = tui
                .pending_redirect
                .take()
                .unwrap_or_else(Route::default_landing);
            navigate(tui, target)
        }
        Err(err) => {
            tui.notices
                .error(AuthFailure::classify(&err).user_message());
            vec![]
        }
    }
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let page = &tui.pages.login;
    let submitting = tui.tasks.sign_in.is_running();

    let body = page_chrome::render_card(
        frame,
        area,
        "Sign in",
        "Welcome back! Sign in to your account.",
        Color::Cyan,
    );

    page.form.render(frame, body, Color::Cyan);

    let hints = if submitting {
        "Signing in".to_string()
    } else {
        "Enter: sign in · Tab: next field · Ctrl+E: show/hide password · \
         Ctrl+N: create account · Ctrl+F: forgot password"
            .to_string()
    };
    page_chrome::render_hints(frame, body, page.form.height(), &hints, submitting);
}
