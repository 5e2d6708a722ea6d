//! Focusable single-line form fields with inline validation errors.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

/// Glyph used to mask password fields.
const MASK_CHAR: char = '•';

/// A single text field.
#[derive(Debug, Clone)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
    /// Masked fields render bullets unless revealed.
    pub masked: bool,
    pub revealed: bool,
    pub error: Option<String>,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
            revealed: false,
            error: None,
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Value as rendered: bullets for masked fields unless revealed.
    pub fn display_value(&self) -> String {
        if self.masked && !self.revealed {
            MASK_CHAR.to_string().repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Outcome of feeding a key to a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    /// Key consumed (edit or focus move).
    Handled,
    /// Enter pressed; the page should validate and submit.
    Submit,
    /// Key is not a form key.
    Ignored,
}

/// An ordered group of fields with one focused at a time.
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<TextField>,
    pub focused: usize,
}

impl Form {
    pub fn new(fields: Vec<TextField>) -> Self {
        Self { fields, focused: 0 }
    }

    pub fn value(&self, index: usize) -> &str {
        &self.fields[index].value
    }

    pub fn set_error(&mut self, index: usize, message: String) {
        self.fields[index].error = Some(message);
    }

    pub fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.error.is_some())
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }

    /// Inserts pasted text into the focused field.
    pub fn insert_str(&mut self, text: &str) {
        let field = &mut self.fields[self.focused];
        field.value.extend(text.chars().filter(|c| !c.is_control()));
        field.error = None;
    }

    /// Feeds a key event to the form.
    ///
    /// Tab/Down and BackTab/Up move focus, Ctrl+E toggles visibility of the
    /// focused masked field, Enter reports `Submit`. Editing a field clears
    /// its inline error.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormKey {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Enter => FormKey::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                FormKey::Handled
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                FormKey::Handled
            }
            KeyCode::Char('e') if ctrl => {
                let field = &mut self.fields[self.focused];
                if field.masked {
                    field.revealed = !field.revealed;
                }
                FormKey::Handled
            }
            KeyCode::Backspace => {
                let field = &mut self.fields[self.focused];
                field.value.pop();
                field.error = None;
                FormKey::Handled
            }
            KeyCode::Char(c) if !ctrl => {
                let field = &mut self.fields[self.focused];
                field.value.push(c);
                field.error = None;
                FormKey::Handled
            }
            _ => FormKey::Ignored,
        }
    }

    /// Height in rows this form needs (label+input line plus error lines).
    pub fn height(&self) -> u16 {
        self.fields
            .iter()
            .map(|f| 1 + u16::from(f.error.is_some()))
            .sum()
    }

    /// Renders the fields top to bottom starting at `area.y`.
    pub fn render(&self, frame: &mut Frame, area: Rect, accent: Color) {
        let mut y = area.y;
        let label_width = self
            .fields
            .iter()
            .map(|f| f.label.width())
            .max()
            .unwrap_or(0);

        for (index, field) in self.fields.iter().enumerate() {
            if y >= area.y + area.height {
                break;
            }

            let focused = index == self.focused;
            let label_style = if focused {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            let mut value = field.display_value();
            let available = (area.width as usize).saturating_sub(label_width + 4);
            while value.width() > available && !value.is_empty() {
                value.pop();
            }

            let mut spans = vec![
                Span::styled(format!("{:>label_width$}: ", field.label), label_style),
                Span::styled(value, Style::default().fg(Color::White)),
            ];
            if focused {
                spans.push(Span::styled("█", Style::default().fg(accent)));
            }
            if field.masked {
                let hint = if field.revealed { " (visible)" } else { "" };
                spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
            }

            frame.render_widget(
                Paragraph::new(Line::from(spans)),
                Rect::new(area.x, y, area.width, 1),
            );
            y += 1;

            if let Some(error) = &field.error {
                if y >= area.y + area.height {
                    break;
                }
                let indent = " ".repeat(label_width + 2);
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::raw(indent),
                        Span::styled(error.clone(), Style::default().fg(Color::Red)),
                    ])),
                    Rect::new(area.x, y, area.width, 1),
                );
                y += 1;
            }
        }
    }
}
