use super::policy::{CodeStyle, CodeStylePolicy, fence_class};
use super::wrap::{Fragment, pad_to, wrap_chars, wrap_fragments};
use crate::syntax::SyntaxHighlighter;
use crate::theme::Theme;

use murmur_core::Role;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::mem;
use unicode_width::UnicodeWidthStr;

const TAB: &str = "    ";
const QUOTE_BAR: &str = "│ ";
const BULLET: &str = "• ";

/// Turns a message body into styled, wrapped terminal lines
///
/// Parsing is pulldown-cmark's; this type owns only the layout. Code nodes are
/// styled through [`CodeStylePolicy`].
pub struct MarkdownRenderer {
    highlighter: Option<SyntaxHighlighter>,
}

impl MarkdownRenderer {
    pub fn new(syntax_highlighting: bool) -> Self {
        Self { highlighter: syntax_highlighting.then(SyntaxHighlighter::new) }
    }

    pub fn plain() -> Self {
        Self { highlighter: None }
    }

    /// Render `source` for a message by `role`, wrapped to `width` columns
    ///
    /// Lines carry foreground styling only, except code which carries its own
    /// background. Empty input renders no lines.
    pub fn render(&self, source: &str, role: Role, width: usize) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut writer = Writer::new(role, width.max(1), self.highlighter.as_ref());
        for event in Parser::new_ext(source, options) {
            writer.event(event);
        }
        writer.finish()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

struct CodeBuffer {
    style: CodeStyle,
    text: String,
}

struct Writer<'h> {
    role: Role,
    width: usize,
    highlighter: Option<&'h SyntaxHighlighter>,
    lines: Vec<Line<'static>>,
    inline: Vec<Fragment>,
    styles: Vec<Style>,
    /// Next number for ordered lists, `None` for bullets
    lists: Vec<Option<u64>>,
    marker: Option<String>,
    quote_depth: usize,
    code: Option<CodeBuffer>,
}

impl<'h> Writer<'h> {
    fn new(role: Role, width: usize, highlighter: Option<&'h SyntaxHighlighter>) -> Self {
        Self {
            role,
            width,
            highlighter,
            lines: Vec::new(),
            inline: Vec::new(),
            styles: vec![Style::default().fg(Theme::FG)],
            lists: Vec::new(),
            marker: None,
            quote_depth: 0,
            code: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.text.push_str(&text);
                } else {
                    self.inline.push(Fragment::text(text.replace('\t', TAB), self.style()));
                }
            }
            Event::Code(text) => {
                let code = CodeStylePolicy::select(false, self.role, None);
                let pad = " ".repeat(usize::from(code.padding.left));
                let pad_right = " ".repeat(usize::from(code.padding.right));
                self.inline.push(Fragment::atomic(format!("{pad}{text}{pad_right}"), code.text_style()));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.inline.push(Fragment::text(html.trim_end().to_string(), Style::default().fg(Theme::MUTED)));
            }
            Event::SoftBreak => self.inline.push(Fragment::text(" ", self.style())),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.gap();
                let width = self.width.saturating_sub(self.prefix_width());
                let rule = Span::styled("─".repeat(width), Style::default().fg(Theme::BORDER));
                self.emit(vec![rule], true);
            }
            Event::TaskListMarker(done) => {
                let mark = if done { "[x] " } else { "[ ] " };
                self.inline.push(Fragment::text(mark, Style::default().fg(Theme::GREEN)));
            }
            Event::FootnoteReference(label) => {
                self.inline.push(Fragment::text(format!("[{label}]"), Style::default().fg(Theme::MUTED)));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.marker.is_none() {
                    self.gap();
                }
            }
            Tag::Heading { level, .. } => {
                self.flush();
                self.gap();
                let mut style = Style::default().fg(Theme::BLUE).add_modifier(Modifier::BOLD);
                if level == HeadingLevel::H1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                self.styles.push(style);
            }
            Tag::BlockQuote => {
                self.flush();
                self.gap();
                self.quote_depth += 1;
                let style = Style::default().fg(Theme::MUTED).add_modifier(Modifier::ITALIC);
                self.styles.push(style);
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.gap();
                let class = match kind {
                    CodeBlockKind::Fenced(info) => fence_class(&info),
                    CodeBlockKind::Indented => None,
                };
                let style = CodeStylePolicy::select(true, self.role, class.as_deref());
                self.code = Some(CodeBuffer { style, text: String::new() });
            }
            Tag::List(start) => {
                self.flush();
                if self.lists.is_empty() {
                    self.gap();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => BULLET.to_string(),
                };
                self.marker = Some(marker);
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { .. } => {
                let style = self.style().fg(Theme::CYAN).add_modifier(Modifier::UNDERLINED);
                self.styles.push(style);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Item => self.flush(),
            TagEnd::Heading(_) => {
                self.flush();
                self.pop_style();
            }
            TagEnd::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.emit_code_block(code);
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => self.pop_style(),
            _ => {}
        }
    }

    /// Blank separator line between blocks
    fn gap(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        (0..self.quote_depth).map(|_| Span::styled(QUOTE_BAR, Style::default().fg(Theme::BORDER))).collect()
    }

    fn quote_width(&self) -> usize {
        self.quote_depth * QUOTE_BAR.width()
    }

    /// Columns of list indentation in front of item text
    fn list_indent(&self) -> usize {
        self.lists.len().saturating_sub(1) * 2
    }

    fn prefix_width(&self) -> usize {
        self.quote_width() + if self.lists.is_empty() { 0 } else { self.list_indent() + 2 }
    }

    /// Push a finished line behind the quote bars, optionally indented for lists
    fn emit(&mut self, spans: Vec<Span<'static>>, indent: bool) {
        let mut line = self.quote_prefix();
        if indent && !self.lists.is_empty() {
            line.push(Span::raw(" ".repeat(self.list_indent() + 2)));
        }
        line.extend(spans);
        self.lines.push(Line::from(line));
    }

    /// Lay out pending inline text as one wrapped block
    fn flush(&mut self) {
        let marker = self.marker.take();
        if self.inline.is_empty() && marker.is_none() {
            return;
        }

        let fragments = mem::take(&mut self.inline);
        let indent = if self.lists.is_empty() { 0 } else { self.list_indent() };
        let marker_width = marker.as_ref().map_or(0, |m| m.width());
        let hang = if self.lists.is_empty() { 0 } else { marker_width.max(2) };
        let available = self.width.saturating_sub(self.quote_width() + indent + hang);

        for (i, body) in wrap_fragments(&fragments, available).into_iter().enumerate() {
            let mut line = self.quote_prefix();
            if indent + hang > 0 {
                line.push(Span::raw(" ".repeat(indent)));
                match (&marker, i) {
                    (Some(m), 0) => line.push(Span::styled(m.clone(), Style::default().fg(Theme::YELLOW))),
                    _ => line.push(Span::raw(" ".repeat(hang))),
                }
            }
            line.extend(body);
            self.lines.push(Line::from(line));
        }
    }

    fn emit_code_block(&mut self, code: CodeBuffer) {
        let CodeBuffer { style, text } = code;
        let block_width = self.width.saturating_sub(self.prefix_width()).max(1);
        let bg = Style::default().bg(style.background);
        let pad = style.padding;
        let inner = block_width.saturating_sub(usize::from(pad.left + pad.right)).max(1);

        let source = text.replace('\t', TAB);
        let body: Vec<Vec<Span<'static>>> = match (self.highlighter, style.language()) {
            (Some(highlighter), Some(lang)) if highlighter.knows(lang) => highlighter.highlight_lines(&source, lang),
            _ => source.lines().map(|l| vec![Span::styled(l.to_string(), style.text_style())]).collect(),
        };

        for row in 0..pad.top {
            let mut spans = Vec::new();
            if row == 0 {
                let corner = if style.rounded { "╭" } else { " " };
                spans.push(Span::styled(corner, bg.fg(Theme::BORDER)));
                if let Some(lang) = style.language() {
                    spans.push(Span::styled(format!(" {lang}"), bg.fg(Theme::MUTED)));
                }
            }
            pad_to(&mut spans, block_width, bg);
            self.emit(spans, true);
        }

        for source_line in body {
            for chunk in wrap_chars(&source_line, inner) {
                let mut spans = vec![Span::styled(" ".repeat(usize::from(pad.left)), bg)];
                spans.extend(chunk.into_iter().map(|s| {
                    let patched = s.style.bg(style.background);
                    Span::styled(s.content, patched)
                }));
                pad_to(&mut spans, block_width, bg);
                self.emit(spans, true);
            }
        }

        for row in 0..pad.bottom {
            let mut spans = Vec::new();
            if row + 1 == pad.bottom && style.rounded {
                spans.push(Span::styled("╰", bg.fg(Theme::BORDER)));
            }
            pad_to(&mut spans, block_width, bg);
            self.emit(spans, true);
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if let Some(code) = self.code.take() {
            self.emit_code_block(code);
        }
        self.flush();

        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>()).collect()
    }

    fn render(source: &str, width: usize) -> Vec<Line<'static>> {
        MarkdownRenderer::plain().render(source, Role::Assistant, width)
    }

    #[test]
    fn test_empty_body_renders_nothing() {
        assert!(render("", 40).is_empty());
    }

    #[test]
    fn test_paragraphs_are_separated() {
        let lines = render("first paragraph\n\nsecond paragraph", 40);
        assert_eq!(text(&lines), vec!["first paragraph", "", "second paragraph"]);
    }

    #[test]
    fn test_soft_break_joins_lines() {
        let lines = render("one\ntwo", 40);
        assert_eq!(text(&lines), vec!["one two"]);
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        let lines = render("alpha beta gamma delta", 11);
        assert_eq!(text(&lines), vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_emphasis_styles() {
        let lines = render("plain **bold** _it_", 40);
        let bold = lines[0].spans.iter().find(|s| s.content == "bold").map(|s| s.style);
        assert!(bold.is_some_and(|s| s.add_modifier.contains(Modifier::BOLD)));
        let italic = lines[0].spans.iter().find(|s| s.content == "it").map(|s| s.style);
        assert!(italic.is_some_and(|s| s.add_modifier.contains(Modifier::ITALIC)));
    }

    #[test]
    fn test_bullet_list() {
        let lines = render("- one\n- two", 40);
        assert_eq!(text(&lines), vec!["• one", "• two"]);
    }

    #[test]
    fn test_ordered_list_continues_numbering() {
        let lines = render("3. three\n4. four", 40);
        assert_eq!(text(&lines), vec!["3. three", "4. four"]);
    }

    #[test]
    fn test_list_item_hangs_on_wrap() {
        let lines = render("- aaaa bbbb", 8);
        assert_eq!(text(&lines), vec!["• aaaa", "  bbbb"]);
    }

    #[test]
    fn test_block_quote_prefix() {
        let lines = render("> quoted", 40);
        assert_eq!(text(&lines), vec!["│ quoted"]);
    }

    #[test]
    fn test_fenced_code_block_uses_role_background() {
        let lines = MarkdownRenderer::plain().render("```rust\nfn main() {}\n```", Role::User, 20);
        let rows = text(&lines);

        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("╭ rust"));
        assert_eq!(rows[1].trim_end(), " fn main() {}");
        assert!(rows[2].starts_with("╰"));
        assert!(rows.iter().all(|r| r.chars().count() == 20));

        let code_span = lines[1].spans.iter().find(|s| s.content.contains("fn main")).map(|s| s.style.bg);
        assert_eq!(code_span, Some(Some(Theme::code_bg(Role::User))));
    }

    #[test]
    fn test_code_block_without_language_has_no_label() {
        let lines = render("```\nplain\n```", 12);
        let rows = text(&lines);
        assert_eq!(rows[0].trim_end(), "╭");
        assert_eq!(rows[1].trim_end(), " plain");
    }

    #[test]
    fn test_code_block_preserves_indentation() {
        let lines = render("```\nif x {\n    y();\n}\n```", 30);
        assert_eq!(text(&lines)[2].trim_end(), "     y();");
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let lines = render("before\n\n```python\nprint('hi')", 30);
        let rows = text(&lines);
        assert_eq!(rows[0], "before");
        assert!(rows.iter().any(|r| r.contains("print('hi')")));
    }

    #[test]
    fn test_inline_code_is_padded_span() {
        let lines = render("run `cargo test` now", 40);
        assert_eq!(text(&lines), vec!["run  cargo test  now"]);

        let code = lines[0].spans.iter().find(|s| s.content.contains("cargo")).map(|s| s.style.bg);
        assert_eq!(code, Some(Some(Theme::code_bg(Role::Assistant))));
    }

    #[test]
    fn test_highlighted_block_when_enabled() {
        let renderer = MarkdownRenderer::new(true);
        let lines = renderer.render("```rust\nlet x = 1;\n```", Role::Assistant, 30);
        assert!(lines[1].spans.len() > 2);
        assert!(lines[1].spans.iter().all(|s| s.style.bg == Some(Theme::code_bg(Role::Assistant))));
    }

    #[test]
    fn test_heading_and_rule() {
        let lines = render("# Title\n\n---\n\nafter", 10);
        let rows = text(&lines);
        assert_eq!(rows[0], "Title");
        assert_eq!(rows[2], "─".repeat(10));
        assert_eq!(rows[4], "after");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::UNDERLINED));
    }
}
