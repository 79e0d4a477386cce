//! Text editing for the focused field.

/// An editable text value with a cursor measured in characters.
///
/// The value may hold newlines (the notes field); the line-wise cursor
/// movements treat each `\n` as a line break.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text value, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    /// Replace the value, keeping the cursor where it was when possible.
    pub fn reset_keep_cursor(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.cursor.min(self.char_len());
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_offset(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move to the start of the current line.
    pub fn move_home(&mut self) {
        let (_, col) = self.cursor_line_col();
        self.cursor -= col;
    }

    /// Move to the end of the current line.
    pub fn move_end(&mut self) {
        let (line, col) = self.cursor_line_col();
        let line_len = self.value.split('\n').nth(line).map(|l| l.chars().count()).unwrap_or(0);
        self.cursor += line_len - col;
    }

    /// Move to the same column on the previous line, if there is one.
    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line > 0 {
            self.cursor = self.index_at(line - 1, col);
        }
    }

    /// Move to the same column on the next line, if there is one.
    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line + 1 < self.value.split('\n').count() {
            self.cursor = self.index_at(line + 1, col);
        }
    }

    /// Zero-based (line, column) of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.value.chars().take(self.cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Character index of `col` on `line`, clamped to the line length.
    fn index_at(&self, line: usize, col: usize) -> usize {
        let mut idx = 0;
        for (n, text) in self.value.split('\n').enumerate() {
            let len = text.chars().count();
            if n == line {
                return idx + col.min(len);
            }
            idx += len + 1;
        }
        self.char_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_multibyte_text() {
        let mut field = InputField::with_value("café");
        field.handle_backspace();
        field.handle_char('é');
        field.handle_char('!');
        assert_eq!(field.value, "café!");
        field.move_cursor_left();
        field.move_cursor_left();
        field.handle_delete();
        assert_eq!(field.value, "caf!");
        assert_eq!(field.cursor, 3);
    }

    #[test]
    fn test_line_navigation() {
        let mut field = InputField::with_value("first line\nab\nthird");
        assert_eq!(field.cursor_line_col(), (2, 5));
        field.move_up();
        assert_eq!(field.cursor_line_col(), (1, 2));
        field.move_up();
        assert_eq!(field.cursor_line_col(), (0, 2));
        field.move_end();
        assert_eq!(field.cursor_line_col(), (0, 10));
        field.move_down();
        assert_eq!(field.cursor_line_col(), (1, 2));
        field.move_home();
        assert_eq!(field.cursor_line_col(), (1, 0));
        field.handle_char('>');
        assert_eq!(field.value, "first line\n>ab\nthird");
    }

    #[test]
    fn test_reset_keeps_cursor_in_bounds() {
        let mut field = InputField::with_value("long value");
        field.reset_keep_cursor("short");
        assert_eq!(field.cursor, 5);
        field.move_cursor_left();
        field.reset_keep_cursor("shorter");
        assert_eq!(field.cursor, 4);
        assert_eq!(InputField::new().cursor, 0);
    }
}
