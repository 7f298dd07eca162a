use crate::markdown::{MarkdownRenderer, pad_to, spans_width};
use crate::theme::Theme;

use murmur_core::{Entry, UiConfig};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Narrowest bubble worth drawing
const MIN_BUBBLE_WIDTH: usize = 8;

/// Columns of padding inside each bubble edge
const BUBBLE_PADDING_X: usize = 1;

/// Layout options for transcript bubbles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Widest a bubble may grow, as a fraction of the pane width
    pub max_bubble_ratio: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { max_bubble_ratio: 0.8 }
    }
}

impl From<&UiConfig> for RenderOptions {
    fn from(config: &UiConfig) -> Self {
        Self { max_bubble_ratio: config.max_bubble_ratio }
    }
}

/// Transcript laid out for one pane width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedTranscript {
    pub lines: Vec<Line<'static>>,
    /// What a reader sees, without bubble padding or trailing blanks
    pub plain_text: String,
    pub width: usize,
}

impl RenderedTranscript {
    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

/// Lays entries out as chat bubbles
///
/// User bubbles hug the right edge and assistant bubbles the left. Hidden
/// entries are skipped.
pub struct TranscriptRenderer {
    markdown: MarkdownRenderer,
    options: RenderOptions,
}

impl TranscriptRenderer {
    pub fn new(markdown: MarkdownRenderer, options: RenderOptions) -> Self {
        Self { markdown, options }
    }

    pub fn from_config(config: &UiConfig) -> Self {
        Self::new(MarkdownRenderer::new(config.syntax_highlighting), RenderOptions::from(config))
    }

    /// Widest bubble for a pane of `width` columns
    pub fn max_bubble_width(&self, width: usize) -> usize {
        let scaled = (width as f32 * self.options.max_bubble_ratio).floor() as usize;
        scaled.max(MIN_BUBBLE_WIDTH).min(width)
    }

    pub fn render(&self, entries: &[Entry], width: usize) -> RenderedTranscript {
        let mut lines = Vec::new();
        let mut blocks = Vec::new();

        for entry in entries.iter().filter(|e| !e.is_hidden) {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            blocks.push(self.render_bubble(entry, width, &mut lines));
        }

        RenderedTranscript { lines, plain_text: blocks.join("\n\n"), width }
    }

    /// Append one bubble, returning its plain text
    fn render_bubble(&self, entry: &Entry, width: usize, lines: &mut Vec<Line<'static>>) -> String {
        let max_width = self.max_bubble_width(width);
        let body_width = max_width.saturating_sub(BUBBLE_PADDING_X * 2).max(1);
        let mut body = self.markdown.render(&entry.title, entry.role, body_width);
        if body.is_empty() {
            body.push(Line::default());
        }

        let content_width = body.iter().map(|l| l.width()).max().unwrap_or(0).min(body_width);
        let bubble_width = (content_width + BUBBLE_PADDING_X * 2).min(max_width);
        let margin = if entry.role.is_user() { width.saturating_sub(bubble_width) } else { 0 };
        let bubble = Style::default().fg(Theme::FG).bg(Theme::bubble_bg(entry.role));

        let plain = body
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");

        lines.push(self.bubble_row(Vec::new(), margin, bubble_width, bubble));
        for line in body {
            let spans = line.spans.into_iter().map(|s| Span::styled(s.content, bubble.patch(s.style))).collect();
            lines.push(self.bubble_row(spans, margin, bubble_width, bubble));
        }
        lines.push(self.bubble_row(Vec::new(), margin, bubble_width, bubble));

        plain.trim_end().to_string()
    }

    fn bubble_row(&self, body: Vec<Span<'static>>, margin: usize, bubble_width: usize, bubble: Style) -> Line<'static> {
        let mut spans = Vec::with_capacity(body.len() + 3);
        if margin > 0 {
            spans.push(Span::raw(" ".repeat(margin)));
        }

        let mut inner = vec![Span::styled(" ".repeat(BUBBLE_PADDING_X), bubble)];
        inner.extend(body);
        if spans_width(&inner) < bubble_width {
            pad_to(&mut inner, bubble_width, bubble);
        }
        spans.extend(inner);
        Line::from(spans)
    }
}

impl Default for TranscriptRenderer {
    fn default() -> Self {
        Self::new(MarkdownRenderer::plain(), RenderOptions::default())
    }
}
