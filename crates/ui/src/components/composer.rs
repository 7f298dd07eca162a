use crate::state::InputState;
use crate::theme::Theme;

use ratatui::{
    Frame,
    layout::{Alignment, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

const PLACEHOLDER: &str = "Type your message...";

/// Multi-line text box for the next message
pub struct Composer<'a> {
    input: &'a InputState,
    focused: bool,
}

impl<'a> Composer<'a> {
    pub fn new(input: &'a InputState, focused: bool) -> Self {
        Self { input, focused }
    }

    /// Columns available to text inside a composer of `width`
    pub fn text_width(width: u16) -> usize {
        width.saturating_sub(2).max(1) as usize
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border(self.focused))
            .style(Theme::panel());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.input.is_empty() {
            let hint = Span::styled(PLACEHOLDER, Style::default().fg(Theme::MUTED).bg(Theme::PANEL_BG));
            frame.render_widget(Paragraph::new(Line::from(hint)), inner);
            if self.focused {
                frame.set_cursor_position(Position::new(inner.x, inner.y));
            }
            return;
        }

        let (rows, (row, col)) = self.input.layout(inner.width as usize);
        let first = row.saturating_sub(inner.height as usize - 1);
        let lines: Vec<Line<'_>> =
            rows.into_iter().skip(first).take(inner.height as usize).map(Line::from).collect();
        frame.render_widget(Paragraph::new(lines).style(Theme::panel()), inner);

        if self.focused {
            let x = inner.x + (col as u16).min(inner.width - 1);
            let y = inner.y + (row - first) as u16;
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

/// Button next to the composer, dimmed while sending is gated off
pub struct SendButton {
    enabled: bool,
}

impl SendButton {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let style = Theme::send_button(self.enabled);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border(self.enabled))
            .style(style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let label = Paragraph::new(Span::styled("Send", style)).alignment(Alignment::Center);
        let middle = Rect { y: inner.y + inner.height.saturating_sub(1) / 2, height: inner.height.min(1), ..inner };
        frame.render_widget(label, middle);
    }
}
