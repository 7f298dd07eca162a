use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the send button column, borders included
pub const SEND_BUTTON_WIDTH: u16 = 10;

/// Composer rows, borders included
const MIN_COMPOSER_HEIGHT: u16 = 3;
const MAX_COMPOSER_HEIGHT: u16 = 8;

/// Layout breakpoints
///
/// - >= 60 cols: Regular layout with full key hints
/// - < 60 cols: Compact layout, short hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Regular,
    Compact,
}

impl From<u16> for LayoutMode {
    fn from(width: u16) -> Self {
        if width >= 60 { Self::Regular } else { Self::Compact }
    }
}

/// Calculated layout for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuiLayout {
    pub mode: LayoutMode,
    /// Scrollable transcript pane
    pub transcript: Rect,
    /// Text box
    pub composer: Rect,
    /// Send button beside the text box
    pub send_button: Rect,
    /// Key hints and the copy indicator (1 line)
    pub footer: Rect,
}

impl TuiLayout {
    /// Split `area` for a composer holding `input_rows` rows of text
    pub fn calculate(area: Rect, input_rows: usize) -> Self {
        let mode = LayoutMode::from(area.width);
        let composer_height = composer_height(input_rows).min(area.height.saturating_sub(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(composer_height), Constraint::Length(1)])
            .split(area);

        let input_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(SEND_BUTTON_WIDTH)])
            .split(chunks[1]);

        Self { mode, transcript: chunks[0], composer: input_row[0], send_button: input_row[1], footer: chunks[2] }
    }
}

/// Composer height for `input_rows` lines of text
pub fn composer_height(input_rows: usize) -> u16 {
    let rows = u16::try_from(input_rows).unwrap_or(u16::MAX).saturating_add(2);
    rows.clamp(MIN_COMPOSER_HEIGHT, MAX_COMPOSER_HEIGHT)
}
