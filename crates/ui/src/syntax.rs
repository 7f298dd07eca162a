use ratatui::style::{Color, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const THEME_NAME: &str = "base16-ocean.dark";

/// Syntax highlighter for fenced code blocks
///
/// Loading syntect's syntax and theme sets is expensive, so one highlighter is
/// built per renderer and reused for every block.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set.themes.remove(THEME_NAME).unwrap_or_default();
        Self { syntax_set: SyntaxSet::load_defaults_newlines(), theme }
    }

    /// Whether a language token maps to a known grammar
    pub fn knows(&self, lang: &str) -> bool {
        self.find_syntax(lang).is_some()
    }

    /// Highlight a code block, returning one span list per source line
    ///
    /// Trailing newlines are stripped from the spans. Lines that fail to
    /// highlight fall back to the theme's plain text color.
    pub fn highlight_lines(&self, code: &str, lang: &str) -> Vec<Vec<Span<'static>>> {
        let syntax = self.find_syntax(lang).unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let fallback = Style::default().fg(self.fallback_color());

        LinesWithEndings::from(code)
            .map(|line| match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => merge_ranges(ranges.into_iter().map(|(style, text)| {
                    (Style::default().fg(syntect_to_ratatui_color(&style.foreground)), text)
                })),
                Err(e) => {
                    tracing::debug!(error = %e, lang, "syntax highlighting failed for line");
                    vec![Span::styled(strip_newline(line).to_string(), fallback)]
                }
            })
            .collect()
    }

    /// Default text color from the theme
    pub fn fallback_color(&self) -> Color {
        self.theme
            .settings
            .foreground
            .map(|c| syntect_to_ratatui_color(&c))
            .unwrap_or(Color::Rgb(198, 200, 209))
    }

    fn find_syntax(&self, lang: &str) -> Option<&syntect::parsing::SyntaxReference> {
        let lang = lang.trim();
        if lang.is_empty() {
            return None;
        }
        self.syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_name(lang))
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Join adjacent ranges of equal style into a single span
fn merge_ranges<'t>(ranges: impl Iterator<Item = (Style, &'t str)>) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    for (style, text) in ranges {
        let text = strip_newline(text);
        if text.is_empty() {
            continue;
        }

        if let Some(last) = spans.last_mut()
            && last.style == style
        {
            let mut joined = last.content.to_string();
            joined.push_str(text);
            last.content = joined.into();
        } else {
            spans.push(Span::styled(text.to_string(), style));
        }
    }

    spans
}

fn strip_newline(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

fn syntect_to_ratatui_color(color: &syntect::highlighting::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}
