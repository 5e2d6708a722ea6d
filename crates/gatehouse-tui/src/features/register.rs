//! Registration page.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gatehouse_core::backend::types::SignUpOutcome;
use gatehouse_core::backend::{AuthFailure, BackendError};
use gatehouse_core::{session::SessionSnapshot, validate};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::common::{Form, FormKey, TextField};
use crate::effects::UiEffect;
use crate::features::page_chrome;
use crate::router::{HomeChild, Route};
use crate::state::TuiState;
use crate::update::navigate;

const EMAIL: usize = 0;
const PASSWORD: usize = 1;
const CONFIRM: usize = 2;

#[derive(Debug)]
pub struct RegisterPage {
    pub form: Form,
}

impl RegisterPage {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                TextField::new("Email"),
                TextField::masked("Password"),
                TextField::masked("Confirm password"),
            ]),
        }
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => return navigate(tui, Route::Login),
        KeyCode::Char('l') if ctrl => return navigate(tui, Route::Login),
        _ => {}
    }

    match tui.pages.register.form.handle_key(key) {
        FormKey::Submit => submit(tui),
        FormKey::Handled | FormKey::Ignored => vec![],
    }
}

fn submit(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.tasks.sign_up.is_running() {
        return vec![];
    }

    let form = &mut tui.pages.register.form;
    form.clear_errors();

    let email = form.value(EMAIL).trim().to_string();
    let password = form.value(PASSWORD).to_string();
    let confirm = form.value(CONFIRM).to_string();

    if let Err(message) = validate::email(&email) {
        form.set_error(EMAIL, message);
    }
    if let Err(message) = validate::password(&password) {
        form.set_error(PASSWORD, message);
    }
    if let Err(message) = validate::confirmation(&password, &confirm) {
        form.set_error(CONFIRM, message);
    }
    if form.has_errors() {
        return vec![];
    }

    vec![UiEffect::SignUp {
        task: tui.task_seq.next_id(),
        email,
        password,
    }]
}

/// Applies a sign-up result.
///
/// With email confirmation off the backend issues a session immediately and
/// the user lands on the profile page; with confirmation on there is no
/// session and the user is sent back to sign-in with a "check your email"
/// notice.
pub fn handle_result(
    tui: &mut TuiState,
    email: &str,
    result: Result<SignUpOutcome, BackendError>,
) -> Vec<UiEffect> {
    match result {
        Ok(SignUpOutcome::SessionIssued(session)) => {
            tui.session = SessionSnapshot {
                settled: true,
                session: Some(session),
            };
            tui.notices
                .success("Account created! Redirecting to your profile...");
            navigate(tui, Route::Home(HomeChild::Profile))
        }
        Ok(SignUpOutcome::ConfirmationRequired) => {
            tui.notices.success(format!(
                "Account created! Please check your email ({email}) to confirm your account."
            ));
            navigate(tui, Route::Login)
        }
        Err(err) => {
            tui.notices
                .error(AuthFailure::classify(&err).user_message());
            vec![]
        }
    }
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let page = &tui.pages.register;
    let submitting = tui.tasks.sign_up.is_running();

    let body = page_chrome::render_card(
        frame,
        area,
        "Create account",
        "Register to get started.",
        Color::Green,
    );

    page.form.render(frame, body, Color::Green);

    let hints = if submitting {
        "Creating account".to_string()
    } else {
        "Enter: create account · Tab: next field · Ctrl+E: show/hide password · Esc: back to sign in"
            .to_string()
    };
    page_chrome::render_hints(frame, body, page.form.height(), &hints, submitting);
}
