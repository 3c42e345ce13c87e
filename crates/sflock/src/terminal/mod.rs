//! Full-screen terminal lock surface
//!
//! Pointer grab is mouse capture, keyboard grab is raw mode: while both are
//! held every key and click is delivered to sflock and interrupt/suspend
//! keys no longer raise signals. Signals sent from outside end the session
//! through the same teardown as an unlock.

mod events;
mod render;
mod signals;

pub use events::{key_input, translate};
pub use render::draw;
pub use signals::Termination;

use std::io::{self, IsTerminal, Stdout};

use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::prelude::*;
use sflock_core::{Background, DisplaySurface, SessionEvent, SurfaceError};
use tracing::debug;

use crate::theme::Theme;

/// The lock surface on the controlling terminal
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
    background: Background,
    termination: Termination,
    /// Keyboard enhancement flags were pushed and must be popped
    enhanced_keys: bool,
    destroyed: bool,
}

/// Report keypad keys distinctly on terminals that support it
pub fn keyboard_flags() -> KeyboardEnhancementFlags {
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
}

impl TerminalSurface {
    /// Switch stdout to the alternate screen and take it over
    pub fn create_fullscreen(theme: Theme) -> Result<Self, SurfaceError> {
        let mut stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(SurfaceError::Open("stdout is not a terminal".into()));
        }
        let termination =
            Termination::register().map_err(|e| SurfaceError::Open(e.to_string()))?;

        execute!(stdout, EnterAlternateScreen).map_err(|e| SurfaceError::Open(e.to_string()))?;
        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(SurfaceError::Open(e.to_string()));
            }
        };

        let mut surface = Self {
            terminal,
            theme,
            background: Background::Normal,
            termination,
            enhanced_keys: false,
            destroyed: false,
        };
        surface.enhance_keys();
        surface
            .terminal
            .clear()
            .map_err(|e| SurfaceError::Open(e.to_string()))?;

        debug!("terminal surface created");
        Ok(surface)
    }

    fn enhance_keys(&mut self) {
        if !supports_keyboard_enhancement().unwrap_or(false) {
            debug!("keyboard enhancement unsupported, keypad reported as main keys");
            return;
        }

        match execute!(
            self.terminal.backend_mut(),
            PushKeyboardEnhancementFlags(keyboard_flags())
        ) {
            Ok(()) => self.enhanced_keys = true,
            Err(e) => debug!(error = %e, "cannot enable keyboard enhancement"),
        }
    }
}

impl DisplaySurface for TerminalSurface {
    fn set_cursor_invisible(&mut self) -> Result<(), SurfaceError> {
        self.terminal
            .hide_cursor()
            .map_err(|e| SurfaceError::Draw(e.to_string()))
    }

    fn grab_pointer(&mut self) -> Result<(), SurfaceError> {
        execute!(self.terminal.backend_mut(), EnableMouseCapture)
            .map_err(|e| SurfaceError::Grab(e.to_string()))
    }

    fn grab_keyboard(&mut self) -> Result<(), SurfaceError> {
        enable_raw_mode().map_err(|e| SurfaceError::Grab(e.to_string()))
    }

    fn ungrab_all(&mut self) -> Result<(), SurfaceError> {
        // Attempt both even if the first fails
        let keyboard = disable_raw_mode();
        let pointer = execute!(self.terminal.backend_mut(), DisableMouseCapture);
        keyboard.and(pointer).map_err(SurfaceError::from)
    }

    fn draw_masked_field(&mut self, count: usize) -> Result<(), SurfaceError> {
        let background = self.background;
        let theme = &self.theme;
        self.terminal
            .draw(|frame| render::draw(frame, count, background, theme))
            .map(|_| ())
            .map_err(|e| SurfaceError::Draw(e.to_string()))
    }

    fn set_background(&mut self, background: Background) -> Result<(), SurfaceError> {
        self.background = background;
        Ok(())
    }

    fn next_event(&mut self) -> Result<SessionEvent, SurfaceError> {
        let event = self.termination.wait_for_event(signals::poll_terminal)?;
        Ok(events::translate(event))
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        if self.enhanced_keys {
            let _ = execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags);
        }

        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
        debug!("terminal surface destroyed");
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}
