use crate::theme::Theme;
use crate::transcript::RenderedTranscript;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// Scrollable pane showing the rendered transcript
///
/// The rightmost inner column is reserved for the scrollbar.
pub struct TranscriptPane<'a> {
    rendered: &'a RenderedTranscript,
    offset: usize,
    focused: bool,
}

impl<'a> TranscriptPane<'a> {
    pub fn new(rendered: &'a RenderedTranscript, offset: usize, focused: bool) -> Self {
        Self { rendered, offset, focused }
    }

    /// Area the transcript text occupies inside `area`
    pub fn content_area(area: Rect) -> Rect {
        let inner = Self::block(false).inner(area);
        Rect { width: inner.width.saturating_sub(1), ..inner }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Self::block(self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let content = Self::content_area(area);
        let visible = self.rendered.lines.iter().skip(self.offset).take(content.height as usize).cloned();
        let paragraph = Paragraph::new(visible.collect::<Vec<Line<'_>>>()).style(Theme::base());
        frame.render_widget(paragraph, content);

        self.render_scrollbar(frame, inner);
    }

    fn block(focused: bool) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border(focused))
            .style(Theme::base())
    }

    /// Thumb on the right edge, hidden while everything fits
    fn render_scrollbar(&self, frame: &mut Frame<'_>, area: Rect) {
        let visible_height = area.height as usize;
        let content_height = self.rendered.height();
        if area.width == 0 || visible_height <= 1 || content_height <= visible_height {
            return;
        }

        let max_offset = content_height - visible_height;
        let thumb_size = (visible_height * visible_height).div_ceil(content_height).max(1);
        let thumb_position = (self.offset.min(max_offset) * (visible_height - thumb_size)).div_ceil(max_offset);

        let x = area.x + area.width - 1;
        for y in 0..visible_height {
            let is_thumb = y >= thumb_position && y < thumb_position + thumb_size;
            let (symbol, style) = if is_thumb {
                ("┃", Style::default().fg(Theme::BLUE).bg(Theme::BG))
            } else {
                ("│", Style::default().fg(Theme::BORDER).bg(Theme::BG))
            };
            frame.render_widget(Paragraph::new(Span::styled(symbol, style)), Rect::new(x, area.y + y as u16, 1, 1));
        }
    }
}
