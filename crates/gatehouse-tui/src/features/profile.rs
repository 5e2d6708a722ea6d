//! Profile page (guarded child of the shell).
//!
//! Loads through the profile cache, distinguishing "still loading" from
//! "confirmed absent". Absent shows a create form backed by the creation
//! procedure; present shows an edit form issuing a partial patch. Either
//! write invalidates the cache entry and refetches.

use crossterm::event::{KeyCode, KeyEvent};
use gatehouse_core::backend::types::{Profile, ProfileDraft, ProfilePatch};
use gatehouse_core::backend::{AuthFailure, BackendError};
use gatehouse_core::validate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use uuid::Uuid;

use crate::common::{Form, FormKey, TextField};
use crate::effects::UiEffect;
use crate::features::page_chrome;
use crate::state::TuiState;

const FIRSTNAME: usize = 0;
const LASTNAME: usize = 1;

#[derive(Debug)]
pub enum ProfileLoad {
    Loading,
    /// Fetch confirmed there is no profile yet.
    Absent,
    Ready(Profile),
    /// The fetch itself failed; nothing is known about the profile.
    Failed(String),
}

#[derive(Debug)]
pub struct ProfilePage {
    pub load: ProfileLoad,
    pub form: Form,
}

impl ProfilePage {
    pub fn new() -> Self {
        Self {
            load: ProfileLoad::Loading,
            form: blank_form(),
        }
    }

    /// Installs a fetch result, prefilling the edit form when present.
    pub fn set_loaded(&mut self, profile: Option<Profile>) {
        match profile {
            Some(profile) => {
                self.form = Form::new(vec![
                    TextField::new("First name").with_value(profile.firstname.clone()),
                    TextField::new("Last name").with_value(profile.lastname.clone()),
                ]);
                self.load = ProfileLoad::Ready(profile);
            }
            None => {
                self.form = blank_form();
                self.load = ProfileLoad::Absent;
            }
        }
    }
}

fn blank_form() -> Form {
    Form::new(vec![
        TextField::new("First name"),
        TextField::new("Last name"),
    ])
}

fn busy(tui: &TuiState) -> bool {
    tui.tasks.profile_save.is_running() || tui.tasks.profile_create.is_running()
}

/// Entering the page: serve from the cache or fetch.
pub fn enter(tui: &mut TuiState) -> Vec<UiEffect> {
    let Some(user_id) = tui.session.user().map(|u| u.id) else {
        return vec![];
    };

    if let Some(cached) = tui.cache.lookup(user_id) {
        tui.pages.profile.set_loaded(cached.clone());
        return vec![];
    }

    tui.pages.profile.load = ProfileLoad::Loading;
    vec![UiEffect::LoadProfile {
        task: tui.task_seq.next_id(),
        user_id,
    }]
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match &tui.pages.profile.load {
        ProfileLoad::Loading => vec![],
        ProfileLoad::Failed(_) => match key.code {
            // The fetch failed; nothing to edit until a retry succeeds.
            KeyCode::Enter | KeyCode::Char('r') => enter(tui),
            _ => vec![],
        },
        ProfileLoad::Absent | ProfileLoad::Ready(_) => {
            match tui.pages.profile.form.handle_key(key) {
                FormKey::Submit => submit(tui),
                FormKey::Handled | FormKey::Ignored => vec![],
            }
        }
    }
}

fn submit(tui: &mut TuiState) -> Vec<UiEffect> {
    if busy(tui) {
        return vec![];
    }
    let Some(user) = tui.session.user().cloned() else {
        return vec![];
    };

    let form = &mut tui.pages.profile.form;
    form.clear_errors();

    let firstname = form.value(FIRSTNAME).trim().to_string();
    let lastname = form.value(LASTNAME).trim().to_string();

    if let Err(message) = validate::required("First name", &firstname) {
        form.set_error(FIRSTNAME, message);
    }
    if let Err(message) = validate::required("Last name", &lastname) {
        form.set_error(LASTNAME, message);
    }
    if form.has_errors() {
        return vec![];
    }

    match &tui.pages.profile.load {
        ProfileLoad::Ready(profile) => {
            let patch = ProfilePatch {
                firstname: Some(firstname),
                lastname: Some(lastname),
                ..ProfilePatch::default()
            };
            if profile.merged(&patch) == *profile {
                tui.notices.info("No changes to save.");
                return vec![];
            }
            vec![UiEffect::SaveProfile {
                task: tui.task_seq.next_id(),
                user_id: user.id,
                patch,
            }]
        }
        ProfileLoad::Absent => vec![UiEffect::CreateProfile {
            task: tui.task_seq.next_id(),
            user_id: user.id,
            draft: ProfileDraft {
                firstname,
                lastname,
                email: user.email,
                role: None,
            },
        }],
        ProfileLoad::Loading | ProfileLoad::Failed(_) => vec![],
    }
}

/// Applies a fetch result and populates the cache.
pub fn handle_loaded(
    tui: &mut TuiState,
    user_id: Uuid,
    result: Result<Option<Profile>, BackendError>,
) -> Vec<UiEffect> {
    match result {
        Ok(profile) => {
            tui.cache.store(user_id, profile.clone());
            tui.pages.profile.set_loaded(profile);
        }
        Err(err) => {
            // A failed fetch says nothing about whether a profile exists;
            // stay out of the create/edit forms and offer a retry instead.
            let message = AuthFailure::classify(&err).user_message();
            tui.notices.error(message.clone());
            tui.pages.profile.load = ProfileLoad::Failed(message);
        }
    }
    vec![]
}

/// Applies a patch result: invalidate the cache entry and refetch.
pub fn handle_saved(
    tui: &mut TuiState,
    user_id: Uuid,
    result: Result<(), BackendError>,
) -> Vec<UiEffect> {
    handle_write(tui, user_id, result, "Profile updated successfully!")
}

/// Applies a creation result: invalidate the cache entry and refetch.
pub fn handle_created(
    tui: &mut TuiState,
    user_id: Uuid,
    result: Result<(), BackendError>,
) -> Vec<UiEffect> {
    handle_write(tui, user_id, result, "Profile created successfully!")
}

fn handle_write(
    tui: &mut TuiState,
    user_id: Uuid,
    result: Result<(), BackendError>,
    success_notice: &str,
) -> Vec<UiEffect> {
    match result {
        Ok(()) => {
            tui.cache.invalidate(user_id);
            tui.notices.success(success_notice);
            tui.pages.profile.load = ProfileLoad::Loading;
            vec![UiEffect::LoadProfile {
                task: tui.task_seq.next_id(),
                user_id,
            }]
        }
        Err(err) => {
            tui.notices
                .error(AuthFailure::classify(&err).user_message());
            vec![]
        }
    }
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let page = &tui.pages.profile;

    match &page.load {
        ProfileLoad::Loading => {
            page_chrome::render_centered_line(frame, area, "Loading profile...", Color::DarkGray);
        }
        ProfileLoad::Failed(message) => {
            let body = page_chrome::render_card(
                frame,
                area,
                "Couldn't load your profile",
                message,
                Color::Red,
            );
            page_chrome::render_hints(frame, body, 0, "Enter: retry", false);
        }
        ProfileLoad::Absent => {
            let body = page_chrome::render_card(
                frame,
                area,
                "Create your profile",
                "Tell us who you are to finish setting up.",
                Color::Cyan,
            );
            page.form.render(frame, body, Color::Cyan);
            let submitting = tui.tasks.profile_create.is_running();
            let hints = if submitting {
                "Creating".to_string()
            } else {
                "Enter: create profile · Tab: next field".to_string()
            };
            page_chrome::render_hints(frame, body, page.form.height(), &hints, submitting);
        }
        ProfileLoad::Ready(profile) => {
            let body = page_chrome::render_card(
                frame,
                area,
                "Profile settings",
                "Update your personal details.",
                Color::Cyan,
            );
            page.form.render(frame, body, Color::Cyan);

            let meta_y = body.y + page.form.height() + 1;
            if meta_y < body.y + body.height {
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::styled("Email: ", Style::default().fg(Color::DarkGray)),
                        Span::raw(profile.email.clone()),
                        Span::styled("   Role: ", Style::default().fg(Color::DarkGray)),
                        Span::raw(profile.role.clone()),
                    ])),
                    Rect::new(body.x, meta_y, body.width, 1),
                );
            }

            let submitting = tui.tasks.profile_save.is_running();
            let hints = if submitting {
                "Updating".to_string()
            } else {
                "Enter: save changes · Tab: next field".to_string()
            };
            page_chrome::render_hints(frame, body, page.form.height() + 2, &hints, submitting);
        }
    }
}
