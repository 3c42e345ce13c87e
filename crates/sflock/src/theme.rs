//! Lock screen colours and glyphs

use ratatui::style::{Color, Style};
use sflock_core::Background;

/// sflock palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Locked background
    pub background: Color,
    /// Background after a rejected passphrase
    pub failure: Color,
    /// Rule and mask glyph colour
    pub foreground: Color,
    /// Glyph drawn once per entered byte
    pub mask: char,
    /// Glyph used for the horizontal rule above the field
    pub rule: char,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Black,
            failure: Color::Rgb(255, 69, 0), // #FF4500 - orange red
            foreground: Color::White,
            mask: '*',
            rule: '─',
        }
    }
}

impl Theme {
    pub fn background_color(&self, background: Background) -> Color {
        match background {
            Background::Normal => self.background,
            Background::Failure => self.failure,
        }
    }

    /// Base style for every cell of the surface
    pub fn base(&self, background: Background) -> Style {
        Style::default()
            .fg(self.foreground)
            .bg(self.background_color(background))
    }
}
