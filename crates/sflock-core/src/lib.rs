//! sflock core
//!
//! Everything that decides whether the screen stays locked lives here:
//! - [`buffer`]: the bounded, zeroing secret accumulator
//! - [`grab`]: exclusive pointer/keyboard acquisition with bounded retry
//! - [`session`]: the single-threaded lock state machine and event loop
//!
//! The display and the credential store are consumed through the
//! [`DisplaySurface`] and [`CredentialVerifier`] traits; concrete
//! implementations live in the `sflock` binary crate.

pub mod buffer;
pub mod config;
pub mod error;
pub mod grab;
pub mod keys;
pub mod session;
pub mod surface;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::{SecretBuffer, SecretView, DEFAULT_CAPACITY};
pub use config::LockConfig;
pub use error::{GrabFailure, InsertRejected, Result, SessionError, SurfaceError};
pub use grab::{GrabHandle, GrabManager, GrabPolicy};
pub use keys::{KeyAction, KeyInput};
pub use session::{run_session, Outcome, RenderRequest, Session, SessionState};
pub use surface::{Background, DisplaySurface, SessionEvent};
pub use verifier::CredentialVerifier;
