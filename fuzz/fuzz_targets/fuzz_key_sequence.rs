#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sflock_core::{KeyInput, LockConfig, Outcome, Session, SessionState};

#[derive(Arbitrary, Debug)]
enum Key {
    Char(char),
    Enter,
    KeypadEnter,
    KeypadDigit(u8),
    Escape,
    Backspace,
    Function(u8),
    Other,
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        match key {
            Key::Char(c) => KeyInput::Char(c),
            Key::Enter => KeyInput::Enter,
            Key::KeypadEnter => KeyInput::KeypadEnter,
            Key::KeypadDigit(d) => KeyInput::KeypadDigit(d),
            Key::Escape => KeyInput::Escape,
            Key::Backspace => KeyInput::Backspace,
            Key::Function(n) => KeyInput::Function(n),
            Key::Other => KeyInput::Unknown,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Input {
    passphrase: Vec<u8>,
    keys: Vec<Key>,
}

fuzz_target!(|input: Input| {
    let verifier = |candidate: &[u8]| candidate == input.passphrase.as_slice();
    let mut session = Session::new(&verifier, &LockConfig::testing());
    session.grab_acquired();

    for key in input.keys {
        let outcome = session.handle_key(key.into());

        match outcome {
            Outcome::Unlocked => {
                assert_eq!(session.state(), SessionState::Unlocked);
                assert_eq!(session.displayed_len(), 0);
                return;
            }
            Outcome::Mismatch | Outcome::Cleared => {
                assert_eq!(session.displayed_len(), 0);
            }
            _ => {}
        }

        assert_eq!(session.state(), SessionState::Locked);
        assert!(session.displayed_len() <= 32);
    }
});
