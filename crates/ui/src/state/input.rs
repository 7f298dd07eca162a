use unicode_width::UnicodeWidthChar;

/// State for the input composer
///
/// `cursor` is a byte offset into `buffer` and always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current input buffer
    pub buffer: String,
    /// Cursor position
    pub cursor: usize,
    /// Sent messages, oldest first
    pub message_history: Vec<String>,
    /// Current position in history (None = new message)
    pub history_index: Option<usize>,
    /// Draft saved while browsing history
    pub temp_buffer: Option<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the whole buffer, cursor at the end
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.buffer.len();
        self.reset_history_navigation();
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.buffer.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.buffer.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    /// Start of the current line
    pub fn move_home(&mut self) {
        self.cursor = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
    }

    /// End of the current line
    pub fn move_end(&mut self) {
        self.cursor = self.buffer[self.cursor..].find('\n').map_or(self.buffer.len(), |i| self.cursor + i);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the buffer, leaving the composer empty
    pub fn take(&mut self) -> String {
        let buffer = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.reset_history_navigation();
        buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Add a message to history (typically called after sending a message)
    pub fn add_to_history(&mut self, message: String) {
        if let Some(last) = self.message_history.last()
            && last == &message
        {
            return;
        }
        self.message_history.push(message);
        self.reset_history_navigation();
    }

    /// Navigate up in history (older messages)
    pub fn navigate_up(&mut self) {
        if self.message_history.is_empty() {
            return;
        }

        if self.history_index.is_none() && !self.buffer.is_empty() {
            self.temp_buffer = Some(self.buffer.clone());
        }

        let new_index = match self.history_index {
            None => self.message_history.len() - 1,
            Some(idx) => idx.saturating_sub(1),
        };

        if let Some(message) = self.message_history.get(new_index) {
            self.buffer = message.clone();
            self.cursor = self.buffer.len();
            self.history_index = Some(new_index);
        }
    }

    /// Navigate down in history (newer messages), restoring the draft at the end
    pub fn navigate_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };

        if idx + 1 >= self.message_history.len() {
            self.buffer = self.temp_buffer.take().unwrap_or_default();
            self.history_index = None;
        } else if let Some(message) = self.message_history.get(idx + 1) {
            self.buffer = message.clone();
            self.history_index = Some(idx + 1);
        }
        self.cursor = self.buffer.len();
    }

    pub fn reset_history_navigation(&mut self) {
        self.history_index = None;
        self.temp_buffer = None;
    }

    pub fn is_navigating_history(&self) -> bool {
        self.history_index.is_some()
    }

    /// Lay the buffer out in rows of at most `width` columns
    ///
    /// Returns the rows and the cursor's `(row, column)`. Explicit newlines
    /// start new rows; long lines break between characters.
    pub fn layout(&self, width: usize) -> (Vec<String>, (usize, usize)) {
        let width = width.max(1);
        let mut rows = vec![String::new()];
        let mut col = 0;
        let mut cursor = (0, 0);

        for (i, ch) in self.buffer.char_indices() {
            if i == self.cursor {
                cursor = (rows.len() - 1, col);
            }
            if ch == '\n' {
                rows.push(String::new());
                col = 0;
                continue;
            }

            let w = ch.width().unwrap_or(0);
            if col + w > width && col > 0 {
                rows.push(String::new());
                col = 0;
                if i == self.cursor {
                    cursor = (rows.len() - 1, 0);
                }
            }
            if let Some(row) = rows.last_mut() {
                row.push(ch);
            }
            col += w;
        }

        if self.cursor >= self.buffer.len() {
            cursor = (rows.len() - 1, col);
        }
        (rows, cursor)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.buffer[self.cursor..].chars().next().map(|c| self.cursor + c.len_utf8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_state() {
        let mut input = InputState::new();
        input.insert_char('h');
        input.insert_char('i');
        assert_eq!(input.text(), "hi");
        assert_eq!(input.cursor, 2);

        input.backspace();
        assert_eq!(input.text(), "h");

        let taken = input.take();
        assert_eq!(taken, "h");
        assert!(input.is_empty());
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputState::new();
        input.insert_str("héllo");
        input.move_left();
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "hllo");

        input.move_home();
        input.delete();
        assert_eq!(input.text(), "llo");
    }

    #[test]
    fn test_home_end_are_line_relative() {
        let mut input = InputState::new();
        input.set_text("first\nsecond");
        input.move_home();
        assert_eq!(input.cursor, 6);

        input.move_left();
        input.move_home();
        assert_eq!(input.cursor, 0);

        input.move_end();
        assert_eq!(input.cursor, 5);
    }

    #[test]
    fn test_newline_insertion() {
        let mut input = InputState::new();
        input.insert_str("a");
        input.insert_newline();
        input.insert_str("b");
        assert_eq!(input.text(), "a\nb");
    }

    #[test]
    fn test_history_navigation() {
        let mut input = InputState::new();
        input.add_to_history("first".to_string());
        input.add_to_history("second".to_string());
        input.set_text("draft");

        input.navigate_up();
        assert_eq!(input.text(), "second");
        input.navigate_up();
        assert_eq!(input.text(), "first");
        input.navigate_up();
        assert_eq!(input.text(), "first");

        input.navigate_down();
        assert_eq!(input.text(), "second");
        input.navigate_down();
        assert_eq!(input.text(), "draft");
        assert!(!input.is_navigating_history());
    }

    #[test]
    fn test_add_to_history_prevents_duplicates() {
        let mut input = InputState::new();
        input.add_to_history("same".to_string());
        input.add_to_history("same".to_string());
        assert_eq!(input.message_history.len(), 1);
    }

    #[test]
    fn test_layout_wraps_and_tracks_cursor() {
        let mut input = InputState::new();
        input.set_text("abcdef\nxy");

        let (rows, cursor) = input.layout(4);
        assert_eq!(rows, vec!["abcd", "ef", "xy"]);
        assert_eq!(cursor, (2, 2));

        input.cursor = 4;
        assert_eq!(input.layout(4).1, (1, 0));

        input.cursor = 6;
        assert_eq!(input.layout(4).1, (1, 2));
    }

    #[test]
    fn test_layout_empty() {
        let input = InputState::new();
        assert_eq!(input.layout(10), (vec![String::new()], (0, 0)));
    }

    #[test]
    fn test_layout_trailing_newline_moves_cursor_down() {
        let mut input = InputState::new();
        input.set_text("line\n");
        assert_eq!(input.layout(10), (vec!["line".to_string(), String::new()], (1, 0)));
    }
}
