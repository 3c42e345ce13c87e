//! Lock session state machine and event loop
//!
//! One thread, one surface, one verifier. The loop repaints when something
//! changed, blocks for the next event, and feeds it to the state machine
//! until the passphrase is accepted or the surface fails.

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::buffer::SecretBuffer;
use crate::config::LockConfig;
use crate::error::{InsertRejected, Result, SurfaceError};
use crate::grab::GrabManager;
use crate::keys::{KeyAction, KeyInput};
use crate::surface::{Background, DisplaySurface, SessionEvent};
use crate::verifier::CredentialVerifier;

/// Lock session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for exclusive input
    AcquiringGrab,
    /// Accepting passphrase input
    Locked,
    /// Verifier call in progress
    Verifying,
    /// Passphrase accepted
    Unlocked,
    /// Session ended without unlocking
    Aborted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Unlocked | SessionState::Aborted)
    }
}

/// Pending-repaint flag
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    dirty: bool,
}

impl RenderRequest {
    pub fn mark(&mut self) {
        self.dirty = true;
    }

    pub fn is_pending(&self) -> bool {
        self.dirty
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// What a single event did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No state change
    Ignored,
    /// Repaint requested by the surface
    Exposed,
    /// Buffer gained or lost a character
    Edited,
    /// Buffer refused the character
    Rejected(InsertRejected),
    /// Buffer emptied by cancel
    Cleared,
    /// Passphrase checked and refused
    Mismatch,
    /// Passphrase checked and accepted
    Unlocked,
}

/// The lock session
pub struct Session<'v, V: CredentialVerifier + ?Sized> {
    state: SessionState,
    buffer: SecretBuffer,
    verifier: &'v V,
    render: RenderRequest,
    background: Background,
    /// Background last pushed to the surface
    painted: Option<Background>,
}

impl<'v, V: CredentialVerifier + ?Sized> Session<'v, V> {
    pub fn new(verifier: &'v V, config: &LockConfig) -> Self {
        Self {
            state: SessionState::AcquiringGrab,
            buffer: SecretBuffer::with_capacity(config.capacity),
            verifier,
            render: RenderRequest::default(),
            background: Background::Normal,
            painted: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of mask glyphs currently shown
    pub fn displayed_len(&self) -> usize {
        self.buffer.snapshot_for_display()
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn render_request(&self) -> RenderRequest {
        self.render
    }

    /// Input is ours; start accepting keys
    pub fn grab_acquired(&mut self) {
        if self.state == SessionState::AcquiringGrab {
            self.transition(SessionState::Locked);
            self.render.mark();
        }
    }

    /// End the session without unlocking
    pub fn abort(&mut self) {
        self.buffer.clear();
        if !self.state.is_terminal() {
            self.transition(SessionState::Aborted);
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Outcome {
        if self.state != SessionState::Locked {
            return Outcome::Ignored;
        }

        match event {
            SessionEvent::Key(key) => self.handle_key(key),
            SessionEvent::Expose => {
                self.render.mark();
                Outcome::Exposed
            }
            SessionEvent::Other => Outcome::Ignored,
        }
    }

    pub fn handle_key(&mut self, key: KeyInput) -> Outcome {
        if self.state != SessionState::Locked {
            return Outcome::Ignored;
        }

        match key.action() {
            KeyAction::Insert(c) => self.insert(c),
            KeyAction::DeleteLast => {
                if self.buffer.delete_last() {
                    self.edited();
                    Outcome::Edited
                } else {
                    Outcome::Ignored
                }
            }
            KeyAction::Cancel => {
                self.buffer.clear();
                self.edited();
                Outcome::Cleared
            }
            KeyAction::Submit => self.verify(),
            KeyAction::Ignore => Outcome::Ignored,
        }
    }

    fn insert(&mut self, c: char) -> Outcome {
        let mut utf8 = Zeroizing::new([0u8; 4]);
        let encoded = c.encode_utf8(&mut utf8[..]);

        match self.buffer.insert(encoded.as_bytes()) {
            Ok(()) => {
                self.edited();
                Outcome::Edited
            }
            Err(rejected) => {
                debug!(%rejected, "key not added to passphrase");
                Outcome::Rejected(rejected)
            }
        }
    }

    fn verify(&mut self) -> Outcome {
        self.transition(SessionState::Verifying);
        let matched = self.verifier.verify(self.buffer.commit().as_bytes());
        self.buffer.clear();

        if matched {
            self.transition(SessionState::Unlocked);
            info!("passphrase accepted");
            Outcome::Unlocked
        } else {
            self.transition(SessionState::Locked);
            self.background = Background::Failure;
            self.render.mark();
            debug!("passphrase rejected");
            Outcome::Mismatch
        }
    }

    fn edited(&mut self) {
        self.background = Background::Normal;
        self.render.mark();
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// Push pending changes to the surface, if any
    pub fn repaint<S: DisplaySurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> std::result::Result<(), SurfaceError> {
        if !self.render.take() {
            return Ok(());
        }

        if self.painted != Some(self.background) {
            surface.set_background(self.background)?;
            self.painted = Some(self.background);
        }
        surface.draw_masked_field(self.buffer.snapshot_for_display())
    }

    /// Run the event loop until the session leaves `Locked`.
    ///
    /// A surface error aborts the session and is returned.
    pub fn drive<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S) -> Result<SessionState> {
        while self.state == SessionState::Locked {
            let next = self
                .repaint(surface)
                .and_then(|()| surface.next_event());

            match next {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(e) => {
                    self.abort();
                    return Err(e.into());
                }
            }
        }

        Ok(self.state)
    }
}

/// Run a whole lock session on `surface`.
///
/// Hides the cursor, grabs input, loops until unlocked, then releases the
/// grab and destroys the surface. Release and destroy happen exactly once
/// on every path, including grab failure and surface errors.
pub fn run_session<S, V>(surface: &mut S, verifier: &V, config: &LockConfig) -> Result<SessionState>
where
    S: DisplaySurface + ?Sized,
    V: CredentialVerifier + ?Sized,
{
    let mut session = Session::new(verifier, config);
    let result = lock_and_drive(&mut session, surface, config);
    surface.destroy();

    match &result {
        Ok(state) => info!(state = ?state, "session ended"),
        Err(e) => warn!(error = %e, "session aborted"),
    }
    result
}

fn lock_and_drive<S, V>(
    session: &mut Session<'_, V>,
    surface: &mut S,
    config: &LockConfig,
) -> Result<SessionState>
where
    S: DisplaySurface + ?Sized,
    V: CredentialVerifier + ?Sized,
{
    if let Err(e) = surface.set_cursor_invisible() {
        session.abort();
        return Err(e.into());
    }

    let mut grab = match GrabManager::new(config.grab).acquire(surface) {
        Ok(grab) => grab,
        Err(failure) => {
            session.abort();
            return Err(failure.into());
        }
    };

    session.grab_acquired();
    let result = session.drive(&mut *grab);
    grab.release();
    result
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::{GrabFailure, SessionError};
    use crate::testing::RecordingSurface;

    fn reject_all(_: &[u8]) -> bool {
        false
    }

    fn locked<V: CredentialVerifier + ?Sized>(verifier: &V) -> Session<'_, V> {
        let mut session = Session::new(verifier, &LockConfig::testing());
        session.grab_acquired();
        session
    }

    fn type_text<V: CredentialVerifier + ?Sized>(session: &mut Session<'_, V>, text: &str) {
        for c in text.chars() {
            session.handle_key(KeyInput::Char(c));
        }
    }

    #[test]
    fn test_session_starts_acquiring() {
        let session = Session::new(&reject_all, &LockConfig::testing());
        assert_eq!(session.state(), SessionState::AcquiringGrab);
        assert!(!session.render_request().is_pending());
    }

    #[test]
    fn test_grab_acquired_locks_and_requests_paint() {
        let session = locked(&reject_all);
        assert_eq!(session.state(), SessionState::Locked);
        assert!(session.render_request().is_pending());
    }

    #[test]
    fn test_keys_before_lock_are_ignored() {
        let mut session = Session::new(&reject_all, &LockConfig::testing());
        assert_eq!(session.handle_key(KeyInput::Char('a')), Outcome::Ignored);
        assert_eq!(session.displayed_len(), 0);
    }

    #[test]
    fn test_ignored_keys_leave_no_dirty_flag() {
        let mut session = locked(&reject_all);
        session.render.take();

        for key in [KeyInput::Function(5), KeyInput::Modifier, KeyInput::Navigation] {
            assert_eq!(session.handle_key(key), Outcome::Ignored);
        }
        assert!(!session.render_request().is_pending());
        assert_eq!(session.state(), SessionState::Locked);
    }

    #[test]
    fn test_rejected_insert_leaves_no_dirty_flag() {
        let mut session = locked(&reject_all);
        session.render.take();

        let outcome = session.handle_key(KeyInput::Char('\u{3}'));
        assert_eq!(outcome, Outcome::Rejected(InsertRejected::ControlOnly));
        assert!(!session.render_request().is_pending());
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut session = locked(&reject_all);
        session.render.take();

        assert_eq!(session.handle_key(KeyInput::Backspace), Outcome::Ignored);
        assert!(!session.render_request().is_pending());
    }

    #[test]
    fn test_mismatch_returns_to_locked_with_failure_background() {
        let mut session = locked(&reject_all);
        type_text(&mut session, "wrong");

        assert_eq!(session.handle_key(KeyInput::Enter), Outcome::Mismatch);
        assert_eq!(session.state(), SessionState::Locked);
        assert_eq!(session.displayed_len(), 0);
        assert_eq!(session.background(), Background::Failure);
        assert!(session.render_request().is_pending());
    }

    #[test]
    fn test_edit_after_mismatch_restores_background() {
        let mut session = locked(&reject_all);
        session.handle_key(KeyInput::Enter);

        session.handle_event(SessionEvent::Expose);
        assert_eq!(session.background(), Background::Failure);

        session.handle_key(KeyInput::Char('a'));
        assert_eq!(session.background(), Background::Normal);
    }

    #[test]
    fn test_cancel_skips_verifier() {
        let calls = Cell::new(0);
        let verifier = |_: &[u8]| {
            calls.set(calls.get() + 1);
            true
        };
        let mut session = locked(&verifier);
        type_text(&mut session, "half");

        assert_eq!(session.handle_key(KeyInput::Escape), Outcome::Cleared);
        assert_eq!(session.displayed_len(), 0);
        assert_eq!(session.state(), SessionState::Locked);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_empty_submit_reaches_verifier() {
        let seen = Cell::new(None);
        let verifier = |candidate: &[u8]| {
            seen.set(Some(candidate.len()));
            false
        };
        let mut session = locked(&verifier);

        assert_eq!(session.handle_key(KeyInput::Enter), Outcome::Mismatch);
        assert_eq!(seen.get(), Some(0));
    }

    #[test]
    fn test_match_unlocks_and_clears() {
        let verifier = |candidate: &[u8]| candidate == b"secret";
        let mut session = locked(&verifier);
        type_text(&mut session, "secret");

        assert_eq!(session.handle_key(KeyInput::KeypadEnter), Outcome::Unlocked);
        assert_eq!(session.state(), SessionState::Unlocked);
        assert_eq!(session.displayed_len(), 0);

        // Terminal state swallows further input
        assert_eq!(session.handle_key(KeyInput::Char('x')), Outcome::Ignored);
        assert_eq!(session.displayed_len(), 0);
    }

    #[test]
    fn test_repaint_pushes_background_only_on_change() {
        let mut surface = RecordingSurface::default();
        let mut session = locked(&reject_all);

        session.repaint(&mut surface).unwrap();
        session.handle_key(KeyInput::Char('a'));
        session.repaint(&mut surface).unwrap();
        session.handle_key(KeyInput::Enter);
        session.repaint(&mut surface).unwrap();
        session.handle_key(KeyInput::Char('b'));
        session.repaint(&mut surface).unwrap();
        // Nothing pending
        session.repaint(&mut surface).unwrap();

        assert_eq!(
            surface.backgrounds,
            vec![Background::Normal, Background::Failure, Background::Normal]
        );
        assert_eq!(surface.draws, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_run_session_unlocks_and_tears_down_once() {
        let mut surface = RecordingSurface::with_events([
            SessionEvent::Key(KeyInput::Char('o')),
            SessionEvent::Key(KeyInput::Char('k')),
            SessionEvent::Key(KeyInput::Enter),
        ]);
        let verifier = |candidate: &[u8]| candidate == b"ok";

        let state = run_session(&mut surface, &verifier, &LockConfig::testing()).unwrap();

        assert_eq!(state, SessionState::Unlocked);
        assert!(surface.cursor_hidden);
        assert_eq!(surface.draws, vec![0, 1, 2]);
        assert_eq!(surface.ungrab_calls, 1);
        assert_eq!(surface.destroy_calls, 1);
    }

    #[test]
    fn test_run_session_grab_failure_tears_down_once() {
        let mut surface = RecordingSurface {
            keyboard_refusals: u32::MAX,
            ..Default::default()
        };

        let err = run_session(&mut surface, &reject_all, &LockConfig::testing()).unwrap_err();

        assert!(matches!(
            err,
            SessionError::Grab(GrabFailure::Keyboard { attempts: 3 })
        ));
        assert!(surface.draws.is_empty());
        assert_eq!(surface.ungrab_calls, 1);
        assert_eq!(surface.destroy_calls, 1);
    }

    #[test]
    fn test_run_session_surface_error_aborts() {
        let mut surface = RecordingSurface::with_events([SessionEvent::Key(KeyInput::Char('a'))]);

        let err = run_session(&mut surface, &reject_all, &LockConfig::testing()).unwrap_err();

        assert!(matches!(err, SessionError::Display(SurfaceError::Event(_))));
        assert_eq!(surface.ungrab_calls, 1);
        assert_eq!(surface.destroy_calls, 1);
    }

    #[test]
    fn test_mismatch_is_quiet_at_default_level() {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut session = locked(&reject_all);
            type_text(&mut session, "wrong");
            assert_eq!(session.handle_key(KeyInput::Enter), Outcome::Mismatch);
        });

        // stderr shares the tty with the lock screen
        assert!(captured.0.lock().unwrap().is_empty());
    }
}
