//! Key classification
//!
//! Surfaces translate their native key events into [`KeyInput`]; the session
//! only ever acts on the resulting [`KeyAction`].

/// A pressed key as reported by the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Text produced by the key after layout translation.
    /// Control combinations arrive as their C0 code (Ctrl-C is `'\u{3}'`).
    Char(char),
    /// Main Return/Enter key
    Enter,
    /// Keypad Enter
    KeypadEnter,
    /// Keypad digit 0-9
    KeypadDigit(u8),
    Escape,
    Backspace,
    /// F1..Fn
    Function(u8),
    /// Shift, Control, Alt, Super, ... pressed on their own
    Modifier,
    /// Arrows, Home/End, Page Up/Down, Insert, Delete
    Navigation,
    /// Anything the surface could not classify
    Unknown,
}

/// What the session does with a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Insert(char),
    DeleteLast,
    Submit,
    Cancel,
    Ignore,
}

impl KeyInput {
    /// Fold keypad keys onto their main-keyboard equivalents
    pub fn normalize(self) -> Self {
        match self {
            KeyInput::KeypadEnter => KeyInput::Enter,
            KeyInput::KeypadDigit(digit) if digit <= 9 => KeyInput::Char(char::from(b'0' + digit)),
            other => other,
        }
    }

    /// Map the key to a session action
    pub fn action(self) -> KeyAction {
        match self.normalize() {
            KeyInput::Enter => KeyAction::Submit,
            KeyInput::Escape => KeyAction::Cancel,
            KeyInput::Backspace => KeyAction::DeleteLast,
            KeyInput::Char(c) => KeyAction::Insert(c),
            KeyInput::KeypadEnter
            | KeyInput::KeypadDigit(_)
            | KeyInput::Function(_)
            | KeyInput::Modifier
            | KeyInput::Navigation
            | KeyInput::Unknown => KeyAction::Ignore,
        }
    }
}
