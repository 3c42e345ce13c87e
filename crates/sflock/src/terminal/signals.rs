//! Termination signals
//!
//! A terminal keeps raw mode, mouse capture and the alternate screen after
//! the process dies, so SIGTERM, SIGHUP and SIGINT only raise a flag. The
//! event wait notices it and fails, which unwinds through the normal
//! release and teardown path.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use sflock_core::SurfaceError;
use tracing::debug;

/// How long one event poll blocks before the flag is checked again
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Signals that end the session
pub const TERMINATION_SIGNALS: [i32; 3] = [SIGTERM, SIGHUP, SIGINT];

/// Set once a termination signal has arrived
#[derive(Clone, Debug, Default)]
pub struct Termination {
    requested: Arc<AtomicBool>,
}

impl Termination {
    /// Route the termination signals into a fresh flag
    pub fn register() -> io::Result<Self> {
        let termination = Self::default();
        for signal in TERMINATION_SIGNALS {
            signal_hook::flag::register(signal, Arc::clone(&termination.requested))?;
        }
        debug!(signals = ?TERMINATION_SIGNALS, "termination signals registered");
        Ok(termination)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Wait for the next terminal event, giving up once termination is
    /// requested. `poll` blocks for at most the given timeout and returns
    /// `None` when nothing arrived.
    pub fn wait_for_event<F>(&self, mut poll: F) -> Result<Event, SurfaceError>
    where
        F: FnMut(Duration) -> io::Result<Option<Event>>,
    {
        loop {
            if self.is_requested() {
                return Err(SurfaceError::Event("terminated by signal".into()));
            }

            match poll(POLL_INTERVAL) {
                Ok(Some(event)) => return Ok(event),
                Ok(None) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(SurfaceError::Event(e.to_string())),
            }
        }
    }
}

/// Poll the controlling terminal through crossterm
pub fn poll_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}
