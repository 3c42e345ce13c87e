//! In-memory surface for unit tests

use std::collections::VecDeque;

use crate::error::SurfaceError;
use crate::surface::{Background, DisplaySurface, SessionEvent};

#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    /// Refuse this many pointer grabs before succeeding
    pub pointer_refusals: u32,
    /// Refuse this many keyboard grabs before succeeding
    pub keyboard_refusals: u32,
    pub pointer_attempts: u32,
    pub keyboard_attempts: u32,
    pub pointer_held: bool,
    pub keyboard_held: bool,
    pub cursor_hidden: bool,
    pub ungrab_calls: u32,
    pub destroy_calls: u32,
    pub draws: Vec<usize>,
    pub backgrounds: Vec<Background>,
    pub events: VecDeque<SessionEvent>,
}

impl RecordingSurface {
    pub fn with_events(events: impl IntoIterator<Item = SessionEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl DisplaySurface for RecordingSurface {
    fn set_cursor_invisible(&mut self) -> Result<(), SurfaceError> {
        self.cursor_hidden = true;
        Ok(())
    }

    fn grab_pointer(&mut self) -> Result<(), SurfaceError> {
        self.pointer_attempts += 1;
        if self.pointer_attempts <= self.pointer_refusals {
            return Err(SurfaceError::Grab("pointer busy".into()));
        }
        self.pointer_held = true;
        Ok(())
    }

    fn grab_keyboard(&mut self) -> Result<(), SurfaceError> {
        self.keyboard_attempts += 1;
        if self.keyboard_attempts <= self.keyboard_refusals {
            return Err(SurfaceError::Grab("keyboard busy".into()));
        }
        self.keyboard_held = true;
        Ok(())
    }

    fn ungrab_all(&mut self) -> Result<(), SurfaceError> {
        self.ungrab_calls += 1;
        self.pointer_held = false;
        self.keyboard_held = false;
        Ok(())
    }

    fn draw_masked_field(&mut self, count: usize) -> Result<(), SurfaceError> {
        self.draws.push(count);
        Ok(())
    }

    fn set_background(&mut self, background: Background) -> Result<(), SurfaceError> {
        self.backgrounds.push(background);
        Ok(())
    }

    fn next_event(&mut self) -> Result<SessionEvent, SurfaceError> {
        self.events
            .pop_front()
            .ok_or_else(|| SurfaceError::Event("event queue drained".into()))
    }

    fn destroy(&mut self) {
        self.destroy_calls += 1;
    }
}
