//! Authenticated shell: nav bar plus the Home, Reports and Profile children.
//!
//! Only rendered once the session snapshot is settled and signed in; the
//! route guard in the reducer keeps unauthenticated traffic out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::effects::UiEffect;
use crate::features::{page_chrome, profile};
use crate::overlays::{IdentityMenuState, Overlay};
use crate::router::{HomeChild, Route};
use crate::state::AppState;
use crate::update::navigate;

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let Route::Home(child) = app.tui.route.clone() else {
        return vec![];
    };

    if key.code == KeyCode::Char('p') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.overlay = Some(Overlay::IdentityMenu(IdentityMenuState::open()));
        return vec![];
    }

    match child {
        HomeChild::Profile => profile::handle_key(&mut app.tui, key),
        HomeChild::Index | HomeChild::Reports => match key.code {
            KeyCode::Char('h') => navigate(&mut app.tui, Route::Home(HomeChild::Index)),
            KeyCode::Char('r') => navigate(&mut app.tui, Route::Home(HomeChild::Reports)),
            KeyCode::Char('p') => navigate(&mut app.tui, Route::Home(HomeChild::Profile)),
            KeyCode::Char('q') => vec![UiEffect::Quit],
            _ => vec![],
        },
    }
}

pub fn render(app: &AppState, frame: &mut Frame, area: Rect) {
    let Route::Home(child) = &app.tui.route else {
        return;
    };

    let nav = Rect::new(area.x, area.y, area.width, 1);
    render_nav(app, frame, nav, child);

    let body = Rect::new(
        area.x,
        area.y + 2,
        area.width,
        area.height.saturating_sub(2),
    );

    match child {
        HomeChild::Index => {
            page_chrome::render_centered_line(
                frame,
                body,
                "Welcome back. Press r for reports, p for your profile.",
                Color::Gray,
            );
        }
        HomeChild::Reports => {
            page_chrome::render_centered_line(
                frame,
                body,
                "Reports are coming soon. Press h to go back home.",
                Color::Gray,
            );
        }
        HomeChild::Profile => profile::render(&app.tui, frame, body),
    }
}

fn render_nav(app: &AppState, frame: &mut Frame, area: Rect, active: &HomeChild) {
    let tab = |label: &str, current: bool| {
        if current {
            Span::styled(
                format!(" {label} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {label} "), Style::default().fg(Color::Gray))
        }
    };

    let spans = vec![
        Span::styled(" gatehouse ", Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        tab("Home", matches!(active, HomeChild::Index)),
        tab("Reports", matches!(active, HomeChild::Reports)),
        tab("Profile", matches!(active, HomeChild::Profile)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    // Right side: signed-in identity and the menu hint.
    if let Some(user) = app.tui.session.user() {
        let right = format!("{} · Ctrl+P: menu ", user.email);
        let right_width = u16::try_from(right.width()).unwrap_or(area.width);
        if right_width < area.width {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    right,
                    Style::default().fg(Color::DarkGray),
                ))),
                Rect::new(
                    area.x + area.width - right_width,
                    area.y,
                    right_width,
                    1,
                ),
            );
        }
    }
}

/// Renders the catch-all page for paths the router does not know.
pub fn render_not_found(path: &str, frame: &mut Frame, area: Rect) {
    let mid = area.y + area.height / 2;
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Page not found",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )))
        .centered(),
        Rect::new(area.x, mid.saturating_sub(1), area.width, 1),
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("No route matches {path}. Press Esc to return to sign in."),
            Style::default().fg(Color::DarkGray),
        )))
        .centered(),
        Rect::new(area.x, mid + 1, area.width, 1),
    );
}

/// Keys on the not-found page.
pub fn handle_not_found_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => navigate(&mut app.tui, Route::Login),
        _ => vec![],
    }
}
