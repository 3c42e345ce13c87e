//! Process-level errors and exit codes

use sflock_core::{GrabFailure, SessionError, SurfaceError};
use thiserror::Error;

/// Result type alias for startup and session failures
pub type Result<T> = std::result::Result<T, LockError>;

/// Reading the credential store or dropping privileges failed
#[derive(Debug, Error)]
pub enum PrivilegeError {
    #[error("cannot read the password database: sflock must be installed set-uid root")]
    NotPrivileged,

    #[error("no passwd entry for uid {uid}")]
    NoPasswdEntry { uid: u32 },

    #[error("no shadow entry for {user}")]
    NoShadowEntry { user: String },

    #[error("account {user} has no usable password hash")]
    UnusableHash { user: String },

    #[error("cannot drop privileges: {0}")]
    Drop(#[source] std::io::Error),

    #[error("privileges could be regained after dropping them")]
    Regainable,
}

/// Fatal errors, each ending the process with a non-zero status
#[derive(Debug, Error)]
pub enum LockError {
    /// Bad command line
    #[error("usage: sflock [-v]")]
    Usage,

    #[error(transparent)]
    Privilege(#[from] PrivilegeError),

    #[error(transparent)]
    Display(#[from] SurfaceError),

    #[error(transparent)]
    Grab(#[from] GrabFailure),
}

impl From<SessionError> for LockError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Display(e) => LockError::Display(e),
            SessionError::Grab(e) => LockError::Grab(e),
        }
    }
}

impl LockError {
    /// Exit status reported to the environment
    pub fn exit_code(&self) -> u8 {
        match self {
            LockError::Usage => 1,
            LockError::Privilege(_) => 2,
            LockError::Display(_) => 3,
            LockError::Grab(_) => 4,
        }
    }
}
