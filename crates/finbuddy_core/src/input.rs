//! crates/finbuddy_core/src/input.rs
//!
//! The chat composer's key handling. A bare Enter commits the buffer; Enter
//! with any modifier held inserts a literal line break instead.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        alt: false,
        ctrl: false,
    };

    pub fn any(&self) -> bool {
        self.shift || self.alt || self.ctrl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The commit key was pressed; carries the buffer contents. The buffer is
    /// only cleared once the send is accepted.
    Submit(String),
    Edited,
}

/// Text being composed in the chat screen.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    buffer: String,
}

impl ChatInput {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn apply(&mut self, press: KeyPress) -> KeyOutcome {
        match press.key {
            Key::Enter if press.modifiers.any() => {
                self.buffer.push('\n');
                KeyOutcome::Edited
            }
            Key::Enter => KeyOutcome::Submit(self.buffer.clone()),
            Key::Backspace => {
                self.buffer.pop();
                KeyOutcome::Edited
            }
            Key::Char(c) => {
                self.buffer.push(c);
                KeyOutcome::Edited
            }
        }
    }

    /// Types every character of `text` as plain key presses.
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.apply(KeyPress::plain(Key::Char(c)));
        }
    }
}
