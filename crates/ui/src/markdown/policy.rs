use crate::theme::Theme;
use murmur_core::Role;
use ratatui::style::{Color, Style};
use ratatui::widgets::Padding;
use regex::Regex;
use std::sync::LazyLock;

static LANGUAGE_CLASS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"language-(\w+)").ok());

/// How a code node sits in the surrounding text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLayout {
    /// Its own full-width rows
    Block,
    /// A span inside a line of text
    Inline,
}

/// Style descriptor for one code node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeStyle {
    pub layout: CodeLayout,
    pub background: Color,
    pub padding: Padding,
    pub rounded: bool,
    /// `language-<name>` class for downstream highlighting, if the node had one
    pub language_class: Option<String>,
}

impl CodeStyle {
    /// Language name without the `language-` prefix
    pub fn language(&self) -> Option<&str> {
        self.language_class.as_deref().and_then(language_from_class)
    }

    pub fn is_block(&self) -> bool {
        self.layout == CodeLayout::Block
    }

    /// Base text style for the node's cells
    pub fn text_style(&self) -> Style {
        let fg = if self.is_block() { Theme::FG } else { Theme::CYAN };
        Style::default().fg(fg).bg(self.background)
    }
}

/// Chooses how code nodes look inside a message bubble
///
/// A pure function of whether the node is a block, who wrote the message, and
/// the node's class attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeStylePolicy;

impl CodeStylePolicy {
    pub fn select(is_block: bool, role: Role, class: Option<&str>) -> CodeStyle {
        let background = Theme::code_bg(role);

        if is_block {
            CodeStyle {
                layout: CodeLayout::Block,
                background,
                padding: Padding::uniform(1),
                rounded: true,
                language_class: class.and_then(language_from_class).map(|lang| format!("language-{lang}")),
            }
        } else {
            CodeStyle {
                layout: CodeLayout::Inline,
                background,
                padding: Padding::horizontal(1),
                rounded: true,
                language_class: None,
            }
        }
    }
}

/// Extract `<name>` from a class string containing `language-<name>`
pub fn language_from_class(class: &str) -> Option<&str> {
    LANGUAGE_CLASS.as_ref()?.captures(class).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Class attribute a fenced block's info string maps to
///
/// The first word of the info string names the language; an empty info string
/// yields no class.
pub fn fence_class(info: &str) -> Option<String> {
    info.split_whitespace().next().map(|lang| format!("language-{lang}"))
}
