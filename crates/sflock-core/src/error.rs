//! Error types for the lock session

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors reported by a display surface implementation
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface could not be created
    #[error("cannot open display: {0}")]
    Open(String),

    /// A single grab attempt was refused; the grab manager retries these
    #[error("grab refused: {0}")]
    Grab(String),

    /// Drawing or changing the background failed
    #[error("draw failed: {0}")]
    Draw(String),

    /// Waiting for the next event failed
    #[error("event wait failed: {0}")]
    Event(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exclusive input could not be acquired within the retry budget
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GrabFailure {
    #[error("cannot grab pointer after {attempts} attempts")]
    Pointer { attempts: u32 },

    #[error("cannot grab keyboard after {attempts} attempts")]
    Keyboard { attempts: u32 },
}

/// Why the secret buffer refused an insert.
///
/// Carries lengths only, never content.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InsertRejected {
    #[error("input contains only control characters")]
    ControlOnly,

    #[error("input of {requested} bytes does not fit ({len}/{capacity} used)")]
    Overflow {
        len: usize,
        requested: usize,
        capacity: usize,
    },
}

/// Fatal errors that end a lock session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Display surface failure
    #[error(transparent)]
    Display(#[from] SurfaceError),

    /// Grab retry budget exhausted
    #[error(transparent)]
    Grab(#[from] GrabFailure),
}
