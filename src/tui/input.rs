//! Single-line text input

use super::event::Key;

/// Result of feeding a key to a [`TextInput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Edited,
    Submitted(String),
    Cancelled,
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Enter submits (and empties the field), Esc cancels
    pub fn handle_key(&mut self, key: Key) -> InputOutcome {
        match key {
            Key::Char(c) => {
                self.value.push(c);
                InputOutcome::Edited
            }
            Key::Backspace => {
                self.value.pop();
                InputOutcome::Edited
            }
            Key::Ctrl('u') => {
                self.value.clear();
                InputOutcome::Edited
            }
            Key::Enter => InputOutcome::Submitted(std::mem::take(&mut self.value)),
            Key::Esc => InputOutcome::Cancelled,
            _ => InputOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_submit() {
        let mut input = TextInput::new();
        for c in "fix: typo".chars() {
            input.handle_key(Key::Char(c));
        }
        input.handle_key(Key::Backspace);
        assert_eq!(input.value(), "fix: typ");
        assert_eq!(
            input.handle_key(Key::Enter),
            InputOutcome::Submitted("fix: typ".to_string())
        );
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_escape_keeps_value() {
        let mut input = TextInput::with_value("draft");
        assert_eq!(input.handle_key(Key::Esc), InputOutcome::Cancelled);
        assert_eq!(input.value(), "draft");
        assert_eq!(input.handle_key(Key::Tab), InputOutcome::Ignored);
    }
}
