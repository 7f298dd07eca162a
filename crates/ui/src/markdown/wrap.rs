use ratatui::style::Style;
use ratatui::text::Span;
use std::mem;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Styled run of inline text awaiting layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub style: Style,
    /// Never split at its own whitespace (inline code)
    pub atomic: bool,
}

impl Fragment {
    pub fn text(text: impl Into<String>, style: Style) -> Self {
        Self { text: text.into(), style, atomic: false }
    }

    pub fn atomic(text: impl Into<String>, style: Style) -> Self {
        Self { text: text.into(), style, atomic: true }
    }
}

#[derive(Debug, Default)]
struct Word {
    /// Style of the whitespace run in front of the word, if there was one
    space_before: Option<Style>,
    pieces: Vec<(String, Style)>,
    width: usize,
}

impl Word {
    fn push(&mut self, text: String, style: Style) {
        self.width += text.width();
        self.pieces.push((text, style));
    }
}

/// Greedy word wrap of styled fragments to `width` columns
///
/// Whitespace runs collapse to one space and vanish at line breaks. Words
/// wider than a line are broken between characters. Always returns at least
/// one (possibly empty) line.
pub fn wrap_fragments(fragments: &[Fragment], width: usize) -> Vec<Vec<Span<'static>>> {
    let width = width.max(1);
    let mut out = LineBuilder::new(width);

    for word in split_words(fragments) {
        if out.used > 0 && out.used + usize::from(word.space_before.is_some()) + word.width > width {
            out.break_line();
        }

        if out.used > 0
            && let Some(style) = word.space_before
        {
            out.push_str(" ", style, 1);
        }

        if word.width <= width - out.used {
            for (text, style) in word.pieces {
                let w = text.width();
                out.push_str(&text, style, w);
            }
        } else {
            for (text, style) in word.pieces {
                out.push_chars(&text, style);
            }
        }
    }

    out.finish()
}

/// Break spans between characters at `width`, keeping all whitespace
pub fn wrap_chars(spans: &[Span<'_>], width: usize) -> Vec<Vec<Span<'static>>> {
    let mut out = LineBuilder::new(width.max(1));
    for span in spans {
        out.push_chars(&span.content, span.style);
    }
    out.finish()
}

/// Display width of a run of spans
pub fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

/// Append a filler span so the spans reach `width` columns
pub fn pad_to(spans: &mut Vec<Span<'static>>, width: usize, style: Style) {
    let used = spans_width(spans);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
}

fn start_piece(current: &mut Word, pending: &mut Option<Style>, text: String, style: Style) {
    if current.pieces.is_empty() {
        current.space_before = pending.take();
    }
    current.push(text, style);
}

fn split_words(fragments: &[Fragment]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();
    let mut pending_space: Option<Style> = None;

    for fragment in fragments {
        if fragment.atomic {
            if !fragment.text.is_empty() {
                start_piece(&mut current, &mut pending_space, fragment.text.clone(), fragment.style);
            }
            continue;
        }

        let mut buf = String::new();
        for ch in fragment.text.chars() {
            if ch.is_whitespace() {
                if !buf.is_empty() {
                    start_piece(&mut current, &mut pending_space, mem::take(&mut buf), fragment.style);
                }
                if !current.pieces.is_empty() {
                    words.push(mem::take(&mut current));
                }
                pending_space = Some(fragment.style);
            } else {
                buf.push(ch);
            }
        }
        if !buf.is_empty() {
            start_piece(&mut current, &mut pending_space, buf, fragment.style);
        }
    }

    if !current.pieces.is_empty() {
        words.push(current);
    }
    words
}

struct LineBuilder {
    width: usize,
    lines: Vec<Vec<Span<'static>>>,
    line: Vec<Span<'static>>,
    used: usize,
}

impl LineBuilder {
    fn new(width: usize) -> Self {
        Self { width, lines: Vec::new(), line: Vec::new(), used: 0 }
    }

    fn break_line(&mut self) {
        self.lines.push(mem::take(&mut self.line));
        self.used = 0;
    }

    /// Append text, merging with the previous span when the style matches
    fn push_str(&mut self, text: &str, style: Style, width: usize) {
        if let Some(last) = self.line.last_mut()
            && last.style == style
        {
            last.content.to_mut().push_str(text);
        } else {
            self.line.push(Span::styled(text.to_string(), style));
        }
        self.used += width;
    }

    fn push_chars(&mut self, text: &str, style: Style) {
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if self.used > 0 && self.used + w > self.width {
                self.break_line();
            }
            let mut buf = [0u8; 4];
            self.push_str(ch.encode_utf8(&mut buf), style, w);
        }
    }

    fn finish(mut self) -> Vec<Vec<Span<'static>>> {
        if !self.line.is_empty() || self.lines.is_empty() {
            self.lines.push(self.line);
        }
        self.lines
    }
}
