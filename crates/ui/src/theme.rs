use murmur_core::Role;
use ratatui::style::{Color, Modifier, Style};

/// Iceberg color theme for the murmur TUI
///
/// Based on iceberg.vim color scheme (https://github.com/cocopon/iceberg.vim)
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Primary background: deep blue-black (fills terminal)
    pub const BG: Color = Color::Rgb(22, 24, 33);

    /// Foreground: light blue-gray (primary text)
    pub const FG: Color = Color::Rgb(198, 200, 209);

    /// Secondary background: composer and footer
    pub const PANEL_BG: Color = Color::Rgb(30, 33, 50);

    /// User-authored bubbles
    pub const USER_BG: Color = Color::Rgb(39, 44, 66);

    /// Assistant-authored bubbles
    pub const ASSISTANT_BG: Color = Color::Rgb(30, 33, 50);

    /// Code inside user bubbles
    pub const USER_CODE_BG: Color = Color::Rgb(50, 57, 84);

    /// Code inside assistant bubbles
    pub const ASSISTANT_CODE_BG: Color = Color::Rgb(22, 24, 33);

    pub const COMMENT: Color = Color::Rgb(107, 112, 137);
    pub const BLUE: Color = Color::Rgb(132, 160, 198);
    pub const CYAN: Color = Color::Rgb(137, 184, 194);
    pub const PURPLE: Color = Color::Rgb(160, 147, 199);
    pub const GREEN: Color = Color::Rgb(180, 190, 130);
    pub const YELLOW: Color = Color::Rgb(226, 164, 120);
    pub const RED: Color = Color::Rgb(226, 120, 120);

    /// Muted text: dimmed foreground
    pub const MUTED: Color = Color::Rgb(107, 112, 137);

    /// Border color
    pub const BORDER: Color = Color::Rgb(60, 65, 90);

    /// Border of the focused pane
    pub const FOCUS_BORDER: Color = Color::Rgb(132, 160, 198);

    /// Base style for all text
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    /// Muted style (for secondary text)
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED).bg(Self::BG)
    }

    /// Success style
    pub fn success() -> Style {
        Style::default().fg(Self::GREEN).bg(Self::BG).add_modifier(Modifier::BOLD)
    }

    /// Panel style
    pub fn panel() -> Style {
        Style::default().fg(Self::FG).bg(Self::PANEL_BG)
    }

    /// Border style, highlighted when the pane has focus
    pub fn border(focused: bool) -> Style {
        if focused { Style::default().fg(Self::FOCUS_BORDER) } else { Style::default().fg(Self::BORDER) }
    }

    /// Bubble background for a message author
    pub fn bubble_bg(role: Role) -> Color {
        match role {
            Role::User => Self::USER_BG,
            Role::Assistant => Self::ASSISTANT_BG,
        }
    }

    /// Code background for a message author
    pub fn code_bg(role: Role) -> Color {
        match role {
            Role::User => Self::USER_CODE_BG,
            Role::Assistant => Self::ASSISTANT_CODE_BG,
        }
    }

    /// Label color for a message author
    pub fn role_color(role: Role) -> Color {
        match role {
            Role::User => Self::BLUE,
            Role::Assistant => Self::PURPLE,
        }
    }

    /// Send button style
    pub fn send_button(enabled: bool) -> Style {
        if enabled {
            Style::default().fg(Self::BG).bg(Self::GREEN).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Self::MUTED).bg(Self::PANEL_BG)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_values() {
        assert!(matches!(Theme::BG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::FG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::PANEL_BG, Color::Rgb(_, _, _)));
    }

    #[test]
    fn test_role_shades_differ() {
        assert_ne!(Theme::bubble_bg(Role::User), Theme::bubble_bg(Role::Assistant));
        assert_ne!(Theme::code_bg(Role::User), Theme::code_bg(Role::Assistant));
    }

    #[test]
    fn test_code_bg_stands_out_from_bubble() {
        for role in [Role::User, Role::Assistant] {
            assert_ne!(Theme::code_bg(role), Theme::bubble_bg(role));
        }
    }

    #[test]
    fn test_styles() {
        let base = Theme::base();
        assert_eq!(base.fg, Some(Theme::FG));
        assert_eq!(base.bg, Some(Theme::BG));

        assert_eq!(Theme::border(true).fg, Some(Theme::FOCUS_BORDER));
        assert_eq!(Theme::border(false).fg, Some(Theme::BORDER));
        assert_ne!(Theme::send_button(true), Theme::send_button(false));
    }
}
