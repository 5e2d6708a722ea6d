//! Top-level frame renderer.
//!
//! Pure view over `AppState`: route dispatch, the session guard's loading
//! placeholder, the status line, and the active overlay on top.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::features::{forgot_password, login, page_chrome, register, reset_password, shell};
use crate::notify::NoticeLevel;
use crate::overlays::Overlay;
use crate::router::{GuardState, Route};
use crate::state::AppState;

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    if area.height < 2 {
        return;
    }

    // Bottom row is the status line; pages get the rest.
    let page_area = Rect::new(area.x, area.y, area.width, area.height - 1);
    let status_area = Rect::new(area.x, area.y + area.height - 1, area.width, 1);

    match &app.tui.route {
        Route::Login => login::render(&app.tui, frame, page_area),
        Route::Register => register::render(&app.tui, frame, page_area),
        Route::ForgotPassword => forgot_password::render(&app.tui, frame, page_area),
        Route::ResetPassword => reset_password::render(&app.tui, frame, page_area),
        Route::Home(_) => match GuardState::evaluate(&app.tui.session) {
            GuardState::Loading => {
                page_chrome::render_centered_line(
                    frame,
                    page_area,
                    "Loading session...",
                    Color::DarkGray,
                );
            }
            GuardState::Authenticated => shell::render(app, frame, page_area),
            // The reducer redirects on the next event; render nothing.
            GuardState::Unauthenticated => {}
        },
        Route::NotFound(path) => shell::render_not_found(path, frame, page_area),
    }

    render_status_line(app, frame, status_area);

    if let Some(overlay) = &app.overlay {
        match overlay {
            Overlay::IdentityMenu(menu) => menu.render(&app.tui, frame, page_area),
        }
    }
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();

    if app.tui.tasks.is_any_running() {
        let idx = usize::try_from(app.tui.ticks).unwrap_or(0) % SPINNER_FRAMES.len();
        spans.push(Span::styled(
            format!(" {} ", SPINNER_FRAMES[idx]),
            Style::default().fg(Color::Yellow),
        ));
    } else {
        spans.push(Span::raw("   "));
    }

    if let Some(notice) = app.tui.notices.current() {
        let color = match notice.level {
            NoticeLevel::Info => Color::Gray,
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        spans.push(Span::styled(
            notice.text.clone(),
            Style::default().fg(color),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    // Current path on the right, like a location bar.
    let path = app.tui.route.path();
    let width = u16::try_from(path.len() + 1).unwrap_or(0);
    if width < area.width {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                path,
                Style::default().fg(Color::DarkGray),
            ))),
            Rect::new(area.x + area.width - width, area.y, width, 1),
        );
    }
}
