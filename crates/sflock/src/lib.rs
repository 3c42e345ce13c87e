//! sflock - terminal screen locker
//!
//! Glue between the lock session in `sflock-core` and the host: command-line
//! parsing, the system credential verifier, and a full-screen terminal
//! surface.

pub mod cli;
pub mod credential;
pub mod error;
pub mod terminal;
pub mod theme;

pub use cli::{Cli, Command};
pub use credential::SystemVerifier;
pub use error::{LockError, PrivilegeError};
pub use terminal::{TerminalSurface, Termination};
pub use theme::Theme;
