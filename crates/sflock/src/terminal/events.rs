//! crossterm event translation

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use sflock_core::{KeyInput, SessionEvent};

/// Translate a terminal event into a session event
pub fn translate(event: Event) -> SessionEvent {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => SessionEvent::Key(key_input(key)),
        Event::Resize(..) | Event::FocusGained => SessionEvent::Expose,
        _ => SessionEvent::Other,
    }
}

/// Classify a key press.
///
/// Keypad state is only reported once keyboard enhancement is pushed; without
/// it keypad keys arrive as `Enter` and plain digits.
pub fn key_input(key: KeyEvent) -> KeyInput {
    let keypad = key.state.contains(KeyEventState::KEYPAD);

    match key.code {
        KeyCode::Enter if keypad => KeyInput::KeypadEnter,
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Char(c) if keypad => c
            .to_digit(10)
            .map(|digit| KeyInput::KeypadDigit(digit as u8))
            .unwrap_or(KeyInput::Char(c)),
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyInput::Char(control_code(c))
        }
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Tab | KeyCode::BackTab => KeyInput::Char('\t'),
        KeyCode::Esc => KeyInput::Escape,
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::F(n) => KeyInput::Function(n),
        KeyCode::Modifier(_) => KeyInput::Modifier,
        KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Insert
        | KeyCode::Delete => KeyInput::Navigation,
        _ => KeyInput::Unknown,
    }
}

/// C0 code a terminal would send for Ctrl+`c`
fn control_code(c: char) -> char {
    match c {
        ' ' => '\0',
        'a'..='z' | 'A'..='Z' | '@' | '[' | '\\' | ']' | '^' | '_' => {
            char::from(c as u8 & 0x1f)
        }
        other => other,
    }
}
