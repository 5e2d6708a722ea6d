//! Forgot-password page.
//!
//! Two states: the email form, and a confirmation panel shown after the
//! reset link is sent. Resending is idempotent and keeps the displayed
//! address unchanged; "use a different email" returns to a blank form.

use crossterm::event::{KeyCode, KeyEvent};
use gatehouse_core::backend::{AuthFailure, BackendError};
use gatehouse_core::validate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::{Form, FormKey, TextField};
use crate::effects::UiEffect;
use crate::features::page_chrome;
use crate::router::Route;
use crate::state::TuiState;
use crate::update::navigate;

const EMAIL: usize = 0;

#[derive(Debug)]
pub enum ForgotPasswordPage {
    Form { form: Form },
    /// Link sent; `email` is the confirmed address shown to the user.
    Confirmation { email: String },
}

impl ForgotPasswordPage {
    pub fn new() -> Self {
        ForgotPasswordPage::Form {
            form: Form::new(vec![TextField::new("Email")]),
        }
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if key.code == KeyCode::Esc {
        return navigate(tui, Route::Login);
    }

    match &mut tui.pages.forgot_password {
        ForgotPasswordPage::Form { form } => match form.handle_key(key) {
            FormKey::Submit => submit(tui),
            FormKey::Handled | FormKey::Ignored => vec![],
        },
        ForgotPasswordPage::Confirmation { email } => match key.code {
            // Resend goes out with the same confirmed address.
            KeyCode::Char('r') => {
                if tui.tasks.reset_link.is_running() {
                    return vec![];
                }
                let email = email.clone();
                vec![UiEffect::SendResetLink {
                    task: tui.task_seq.next_id(),
                    email,
                    resend: true,
                }]
            }
            KeyCode::Char('d') => {
                tui.pages.forgot_password = ForgotPasswordPage::new();
                vec![]
            }
            _ => vec![],
        },
    }
}

fn submit(tui: &mut TuiState) -> Vec<UiEffect> {
    if tui.tasks.reset_link.is_running() {
        return vec![];
    }

    let ForgotPasswordPage::Form { form } = &mut tui.pages.forgot_password else {
        return vec![];
    };
    form.clear_errors();

    let email = form.value(EMAIL).trim().to_string();
    if let Err(message) = validate::email(&email) {
        form.set_error(EMAIL, message);
        return vec![];
    }

    vec![UiEffect::SendResetLink {
        task: tui.task_seq.next_id(),
        email,
        resend: false,
    }]
}

/// Applies a reset-link result. First success swaps to the confirmation
/// panel; a resend success only posts a notice.
pub fn handle_result(
    tui: &mut TuiState,
    email: String,
    resend: bool,
    result: Result<(), BackendError>,
) -> Vec<UiEffect> {
    match result {
        Ok(()) => {
            if resend {
                tui.notices.success("Reset link resent!");
            } else {
                tui.pages.forgot_password = ForgotPasswordPage::Confirmation { email };
            }
        }
        Err(err) => {
            tui.notices
                .error(AuthFailure::classify(&err).user_message());
        }
    }
    vec![]
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let submitting = tui.tasks.reset_link.is_running();

    match &tui.pages.forgot_password {
        ForgotPasswordPage::Form { form } => {
            let body = page_chrome::render_card(
                frame,
                area,
                "Forgot password",
                "Enter your email and we'll send you a reset link.",
                Color::Magenta,
            );
            form.render(frame, body, Color::Magenta);

            let hints = if submitting {
                "Sending reset link".to_string()
            } else {
                "Enter: send reset link · Esc: back to sign in".to_string()
            };
            page_chrome::render_hints(frame, body, form.height(), &hints, submitting);
        }
        ForgotPasswordPage::Confirmation { email } => {
            let body = page_chrome::render_card(
                frame,
                area,
                "Check your email",
                "We sent a password reset link to:",
                Color::Magenta,
            );

            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    email.clone(),
                    Style::default().fg(Color::White),
                ))),
                Rect::new(body.x, body.y, body.width, 1),
            );

            let hints = if submitting {
                "Resending".to_string()
            } else {
                "r: resend link · d: use a different email · Esc: back to sign in".to_string()
            };
            page_chrome::render_hints(frame, body, 1, &hints, submitting);
        }
    }
}
