use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor backing the search and filter prompt.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize, // In chars, not bytes
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        let result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (kc, km) => self.key(kc, km),
        };
        trace!("Input: {:?} -> {:?}", key.code, result);
        result
    }

    /// Replaces the input and moves the curser behind it.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.contains(KeyModifiers::CONTROL) {
            return self.get();
        }
        if let Some(chr) = code.as_char() {
            self.current_input.insert(self.getbytepos(), chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(inputter: &mut Inputter, s: &str) {
        for c in s.chars() {
            press(inputter, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_and_enter_finishes() {
        let mut inputter = Inputter::default();
        type_str(&mut inputter, "country=us");
        let result = press(&mut inputter, KeyCode::Enter);
        assert_eq!(result.input, "country=us");
        assert!(result.finished);
        assert!(!result.canceled);
    }

    #[test]
    fn insert_and_backspace_at_curser() {
        let mut inputter = Inputter::default();
        type_str(&mut inputter, "helo");
        press(&mut inputter, KeyCode::Left);
        type_str(&mut inputter, "l");
        assert_eq!(inputter.get().input, "hello");

        press(&mut inputter, KeyCode::Home);
        press(&mut inputter, KeyCode::Right);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "ello");
        assert_eq!(result.curser_pos, 0);

        // Backspace at the start is a no-op
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "ello");
    }

    #[test]
    fn multibyte_chars_are_edited_by_char() {
        let mut inputter = Inputter::default();
        inputter.set("Zürich");
        assert_eq!(inputter.get().curser_pos, 6);
        press(&mut inputter, KeyCode::Left);
        press(&mut inputter, KeyCode::Left);
        press(&mut inputter, KeyCode::Left);
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "Zrich");
        press(&mut inputter, KeyCode::End);
        press(&mut inputter, KeyCode::Right);
        assert_eq!(inputter.get().curser_pos, 5);
    }

    #[test]
    fn escape_cancels_and_clears() {
        let mut inputter = Inputter::default();
        type_str(&mut inputter, "abc");
        let result = press(&mut inputter, KeyCode::Esc);
        assert!(result.canceled);
        assert!(result.finished);
        assert!(result.input.is_empty());

        inputter.clear();
        assert_eq!(inputter.get(), InputResult::default());
    }
}
