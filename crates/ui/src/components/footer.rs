use crate::interaction::FocusTarget;
use crate::layout::LayoutMode;
use crate::theme::Theme;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

/// One-line status bar: copy indicator on the left, key hints on the right
pub struct Footer {
    mode: LayoutMode,
    focus: FocusTarget,
    copied: bool,
    can_send: bool,
}

impl Footer {
    pub fn new(mode: LayoutMode, focus: FocusTarget, copied: bool, can_send: bool) -> Self {
        Self { mode, focus, copied, can_send }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(12), Constraint::Min(0)])
            .split(area);

        frame.render_widget(Paragraph::new(Line::from(self.status())).style(Theme::base()), halves[0]);
        frame.render_widget(
            Paragraph::new(Line::from(self.hints())).alignment(Alignment::Right).style(Theme::base()),
            halves[1],
        );
    }

    fn status(&self) -> Vec<Span<'static>> {
        if self.copied {
            vec![Span::styled(" Copied!", Theme::success())]
        } else if !self.can_send {
            vec![Span::styled(" waiting…", Theme::muted())]
        } else {
            Vec::new()
        }
    }

    fn hints(&self) -> Vec<Span<'static>> {
        let pairs: &[(&str, &str)] = match (self.mode, self.focus) {
            (LayoutMode::Compact, _) => &[("Enter", "send"), ("^Y", "copy"), ("Esc", "quit")],
            (LayoutMode::Regular, FocusTarget::Input) => &[
                ("Enter", "send"),
                ("Shift+Enter", "newline"),
                ("Tab", "transcript"),
                ("Ctrl+Y", "copy"),
                ("Esc", "quit"),
            ],
            (LayoutMode::Regular, FocusTarget::Transcript) => &[
                ("↑↓", "scroll"),
                ("PgUp/PgDn", "page"),
                ("Tab", "input"),
                ("Ctrl+Y", "copy"),
                ("Esc", "quit"),
            ],
        };

        let mut spans = Vec::with_capacity(pairs.len() * 2);
        for (key, action) in pairs {
            spans.push(Span::styled(format!("[{key}]"), Style::default().fg(Theme::BLUE).bg(Theme::BG)));
            spans.push(Span::styled(format!(" {action}  "), Theme::muted()));
        }
        spans
    }
}
