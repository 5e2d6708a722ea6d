//! Identity menu opened from the shell nav bar (Ctrl+P).

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

use super::OverlayUpdate;
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::router::{HomeChild, Route};
use crate::state::TuiState;

const ENTRIES: [&str; 2] = ["Profile settings", "Sign out"];

#[derive(Debug, Clone)]
pub struct IdentityMenuState {
    pub selected: usize,
}

impl IdentityMenuState {
    pub fn open() -> Self {
        Self { selected: 0 }
    }

    pub fn handle_key(&mut self, tui: &mut TuiState, key: KeyEvent) -> OverlayUpdate {
        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected < ENTRIES.len() - 1 {
                    self.selected += 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Enter => match self.selected {
                0 => OverlayUpdate::close_and_navigate(Route::Home(HomeChild::Profile)),
                _ => {
                    if tui.tasks.state_mut(TaskKind::SignOut).is_running() {
                        return OverlayUpdate::close();
                    }
                    OverlayUpdate::close_with(vec![UiEffect::SignOut {
                        task: tui.task_seq.next_id(),
                    }])
                }
            },
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, tui: &TuiState, frame: &mut Frame, area: Rect) {
        let width = 36u16.min(area.width.saturating_sub(2));
        let height = (ENTRIES.len() as u16 + 4).min(area.height);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 3;
        let popup = Rect::new(x, y, width, height);

        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Account ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        if let Some(user) = tui.session.user() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    user.email.clone(),
                    Style::default().fg(Color::DarkGray),
                ))),
                Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(1), 1),
            );
        }

        let items: Vec<ListItem> = ENTRIES
            .iter()
            .map(|entry| ListItem::new(Line::from(Span::raw(*entry))))
            .collect();
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        let list_area = Rect::new(
            inner.x,
            inner.y + 1,
            inner.width,
            inner.height.saturating_sub(1),
        );
        frame.render_stateful_widget(list, list_area, &mut list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_on_sign_out_emits_effect_and_closes() {
        let mut tui = TuiState::new(Route::Home(HomeChild::Index));
        let mut menu = IdentityMenuState::open();

        menu.handle_key(&mut tui, key(KeyCode::Down));
        let update = menu.handle_key(&mut tui, key(KeyCode::Enter));

        assert!(matches!(
            update.transition,
            super::super::OverlayTransition::Close
        ));
        assert!(matches!(update.effects.as_slice(), [UiEffect::SignOut { .. }]));
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut tui = TuiState::new(Route::Home(HomeChild::Index));
        let mut menu = IdentityMenuState::open();

        menu.handle_key(&mut tui, key(KeyCode::Up));
        assert_eq!(menu.selected, 0);

        menu.handle_key(&mut tui, key(KeyCode::Down));
        menu.handle_key(&mut tui, key(KeyCode::Down));
        assert_eq!(menu.selected, 1);
    }
}
