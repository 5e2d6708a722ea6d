//! Reset-password page (sets the new password after a recovery link).

use crossterm::event::{KeyCode, KeyEvent};
use gatehouse_core::backend::{AuthFailure, BackendError};
use gatehouse_core::validate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::common::{Form, FormKey, TextField};
use crate::effects::UiEffect;
use crate::features::page_chrome;
use crate::router::Route;
use crate::state::TuiState;
use crate::update::navigate;

const PASSWORD: usize = 0;
const CONFIRM: usize = 1;

#[derive(Debug)]
pub struct ResetPasswordPage {
    pub form: Form,
}

impl ResetPasswordPage {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                TextField::masked("New password"),
                TextField::masked("Confirm password"),
            ]),
        }
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if key.code == KeyCode::Esc {
        return navigate(tui, Route::Login);
    }

    match tui.pages.reset_password.form.handle_key(key) {
        FormKey::Submit => submit(tui),
        FormKey::Handled | FormKey::Ignored => vec![],
    }
}

fn submit(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.tasks.password_update.is_running() {
        return vec![];
    }

    let form = &mut tui.pages.reset_password.form;
    form.clear_errors();

    let password = form.value(PASSWORD).to_string();
    let confirm = form.value(CONFIRM).to_string();

    if let Err(message) = validate::password(&password) {
        form.set_error(PASSWORD, message);
    }
    if let Err(message) = validate::confirmation(&password, &confirm) {
        form.set_error(CONFIRM, message);
    }
    if form.has_errors() {
        return vec![];
    }

    vec![UiEffect::UpdatePassword {
        task: tui.task_seq.next_id(),
        password,
    }]
}

/// Applies a password-update result. Success returns to sign-in.
pub fn handle_result(tui: &mut TuiState, result: Result<(), BackendError>) -> Vec<UiEffect> {
    match result {
        Ok(()) => {
            tui.notices
                .success("Password updated! Please sign in with your new password.");
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
    let page = &tui.pages.reset_password;
    let submitting = tui.tasks.password_update.is_running();

    let body = page_chrome::render_card(
        frame,
        area,
        "Reset password",
        "Choose a new password for your account.",
        Color::Yellow,
    );

    page.form.render(frame, body, Color::Yellow);

    let hints = if submitting {
        "Updating password".to_string()
    } else {
        "Enter: update password · Ctrl+E: show/hide password · Esc: back to sign in".to_string()
    };
    page_chrome::render_hints(frame, body, page.form.height(), &hints, submitting);
}
