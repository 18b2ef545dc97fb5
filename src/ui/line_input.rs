use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::ThemeColors;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
    /// Tab / Shift-Tab: move focus to the next or previous field.
    FocusNext,
    FocusPrev,
}

/// Single-line text field used by the login, profile and typed-answer
/// forms.
#[derive(Clone, Debug, Default)]
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    /// Render every char as `•` (access tokens).
    masked: bool,
    max_chars: Option<usize>,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            masked: false,
            max_chars: None,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (String, Option<char>, String) {
        let shown: String = if self.masked {
            self.text.chars().map(|_| '•').collect()
        } else {
            self.text.clone()
        };
        let before: String = shown.chars().take(self.cursor).collect();
        let mut rest = shown.chars().skip(self.cursor);
        let at = rest.next();
        (before, at, rest.collect())
    }

    /// Styled line with a block cursor when `focused`.
    pub fn line(&self, colors: &ThemeColors, focused: bool) -> Line<'static> {
        let (before, at, after) = self.render_parts();
        let text_style = Style::default().fg(colors.fg());
        if !focused {
            return Line::from(Span::styled(format!("{before}{}{after}", at.map(String::from).unwrap_or_default()), text_style));
        }
        let cursor_style = Style::default()
            .fg(colors.text_cursor_fg())
            .bg(colors.text_cursor_bg())
            .add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled(before, text_style),
            Span::styled(at.map(String::from).unwrap_or_else(|| " ".to_string()), cursor_style),
            Span::styled(after, text_style),
        ])
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Tab => return InputResult::FocusNext,
            KeyCode::BackTab => return InputResult::FocusPrev,

            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.text.chars().count());
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.chars().count(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.remove_char(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.text.chars().count() {
                    self.remove_char(self.cursor);
                }
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = 0;
            }
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = self.text.chars().count();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear();
            }
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.delete_word_back();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self
                    .max_chars
                    .is_some_and(|max| self.text.chars().count() >= max)
                {
                    return InputResult::Continue;
                }
                let byte_offset = self.char_to_byte(self.cursor);
                self.text.insert(byte_offset, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_char(&mut self, char_idx: usize) {
        let start = self.char_to_byte(char_idx);
        let end = self.char_to_byte(char_idx + 1);
        self.text.replace_range(start..end, "");
    }

    /// unix-word-rubout: skip whitespace, then non-whitespace.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let start_byte = self.char_to_byte(pos);
        let end_byte = self.char_to_byte(self.cursor);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(input: &mut LineInput, text: &str) {
        for ch in text.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn hangul_insert_and_backspace() {
        let mut input = LineInput::new("");
        type_str(&mut input, "왠지");
        assert_eq!(input.value(), "왠지");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Right));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "지");
        assert_eq!(input.cursor, 0);
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "");
        input.handle(key(KeyCode::Delete));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn ctrl_w_word_delete() {
        let mut input = LineInput::new("문을 잠갔다  ");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "문을 ");

        let mut empty = LineInput::new("");
        empty.handle(ctrl('w'));
        assert_eq!(empty.value(), "");
    }

    #[test]
    fn max_chars_blocks_further_input() {
        let mut input = LineInput::new("").max_chars(3);
        type_str(&mut input, "가나다라");
        assert_eq!(input.value(), "가나다");
    }

    #[test]
    fn masked_rendering_hides_text() {
        let input = LineInput::new("ya29").masked();
        let (before, at, after) = input.render_parts();
        assert_eq!(before, "••••");
        assert_eq!(at, None);
        assert_eq!(after, "");
        assert_eq!(input.value(), "ya29");
    }

    #[test]
    fn control_keys_map_to_results() {
        let mut input = LineInput::new("x");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
        assert_eq!(input.handle(key(KeyCode::Tab)), InputResult::FocusNext);
        assert_eq!(input.handle(key(KeyCode::BackTab)), InputResult::FocusPrev);
        input.handle(ctrl('a'));
        assert_eq!(input.cursor, 0);
        input.handle(ctrl('e'));
        assert_eq!(input.cursor, 1);
        input.handle(ctrl('u'));
        assert!(input.is_empty());
    }
}
