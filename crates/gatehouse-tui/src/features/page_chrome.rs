//! Shared rendering helpers for the form pages.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Width of the centered page card.
const CARD_WIDTH: u16 = 64;

/// Renders a centered, bordered card with a title and subtitle line.
/// Returns the body area below the subtitle.
pub fn render_card(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    subtitle: &str,
    accent: Color,
) -> Rect {
    let width = CARD_WIDTH.min(area.width.saturating_sub(2)).max(20);
    let height = area.height.saturating_sub(2).min(16).max(8);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 3;
    let card = Rect::new(x, y, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            subtitle.to_string(),
            Style::default().fg(Color::DarkGray),
        ))),
        Rect::new(inner.x, inner.y, inner.width, 1),
    );

    // Body starts below the subtitle and a blank spacer row.
    Rect::new(
        inner.x + 1,
        inner.y + 2,
        inner.width.saturating_sub(2),
        inner.height.saturating_sub(2),
    )
}

/// Renders the key-hint line `gap` rows below the form body start.
pub fn render_hints(frame: &mut Frame, body: Rect, gap: u16, text: &str, busy: bool) {
    let y = body.y + gap + 1;
    if y >= body.y + body.height {
        return;
    }

    let style = if busy {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let line = if busy {
        format!("{text}...")
    } else {
        text.to_string()
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(line, style))),
        Rect::new(body.x, y, body.width, 1),
    );
}

/// Renders a single centered message (loading placeholders, static pages).
pub fn render_centered_line(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let y = area.y + area.height / 2;
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(color),
        )))
        .centered(),
        Rect::new(area.x, y, area.width, 1),
    );
}
