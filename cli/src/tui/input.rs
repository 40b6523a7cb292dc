use unicode_width::UnicodeWidthStr;

/// Single-line text buffer with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Terminal columns between the start of the text and the cursor.
    pub fn cursor_width(&self) -> u16 {
        let prefix = &self.value[..self.byte_index(self.cursor)];
        prefix.width() as u16
    }

    pub fn insert(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor);
        self.value.insert(byte_index, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let byte_index = self.byte_index(self.cursor - 1);
            self.value.remove(byte_index);
            self.cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_index = self.byte_index(self.cursor);
            self.value.remove(byte_index);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .chars()
            .take(char_index)
            .map(|c| c.len_utf8())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_move() {
        let mut input = TextInput::default();
        for c in "milk".chars() {
            input.insert(c);
        }
        input.move_home();
        input.insert('#');
        input.move_end();
        input.backspace();

        assert_eq!(input.value(), "#mil");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::with_value("牛乳を買う");
        input.move_left();
        input.move_left();
        input.backspace();

        assert_eq!(input.value(), "牛乳買う");
        assert_eq!(input.cursor(), 2);
        assert_eq!(input.cursor_width(), 4);

        input.delete();
        assert_eq!(input.value(), "牛乳う");
    }

    #[test]
    fn test_bounds_are_respected() {
        let mut input = TextInput::with_value("ab");
        input.move_right();
        input.delete();
        assert_eq!(input.value(), "ab");

        input.move_home();
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "ab");
        assert_eq!(input.cursor(), 0);
    }
}
