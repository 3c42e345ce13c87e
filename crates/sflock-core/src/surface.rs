//! Display surface seam
//!
//! The session never draws or reads input itself; it drives whatever
//! implements [`DisplaySurface`].

use crate::error::SurfaceError;
use crate::keys::KeyInput;

/// Background fill of the lock surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    /// Normal locked appearance
    #[default]
    Normal,
    /// Shown after a rejected passphrase
    Failure,
}

/// Input and display events delivered to the session loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A key was pressed
    Key(KeyInput),
    /// The surface contents were lost and must be repainted
    Expose,
    /// Anything else (pointer motion, key release, ...)
    Other,
}

/// Full-screen lock surface.
///
/// Creating the surface is the implementor's constructor; everything the
/// session needs afterwards goes through this trait.
pub trait DisplaySurface {
    /// Hide the pointer cursor over the surface
    fn set_cursor_invisible(&mut self) -> Result<(), SurfaceError>;

    /// Try once to take exclusive pointer input
    fn grab_pointer(&mut self) -> Result<(), SurfaceError>;

    /// Try once to take exclusive keyboard input
    fn grab_keyboard(&mut self) -> Result<(), SurfaceError>;

    /// Release every grab held. Must tolerate grabs that were never taken.
    fn ungrab_all(&mut self) -> Result<(), SurfaceError>;

    /// Repaint the surface with `count` mask glyphs in the entry field
    fn draw_masked_field(&mut self, count: usize) -> Result<(), SurfaceError>;

    /// Change the background used by subsequent repaints
    fn set_background(&mut self, background: Background) -> Result<(), SurfaceError>;

    /// Block until the next event arrives
    fn next_event(&mut self) -> Result<SessionEvent, SurfaceError>;

    /// Tear the surface down. Idempotent.
    fn destroy(&mut self);
}
