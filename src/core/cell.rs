//! Terminal Cell
//!
//! Represents a single cell in the terminal grid: one optional codepoint and
//! the graphic rendition it was printed with. Cells are plain values; the
//! engine never mutates a cell that is already on the grid, it replaces it.

use serde::{Deserialize, Serialize};

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// The glyph in this cell, if any
    pub ch: Option<char>,
    /// Background color
    pub background: Color,
    /// Foreground color
    pub foreground: Color,
    /// Bold / faint
    pub intensity: Intensity,
    /// Italic or upright
    pub style: TextStyle,
    /// Blink rate
    pub blink: Blink,
    /// Swap foreground and background when drawn
    pub reversed: bool,
}

impl Cell {
    /// Create a default-styled cell holding `c`
    pub fn new(c: char) -> Self {
        Self {
            ch: Some(c),
            ..Default::default()
        }
    }

    /// Copy of this cell with its glyph replaced
    pub fn with_char(&self, c: char) -> Self {
        Self {
            ch: Some(c),
            ..self.clone()
        }
    }

    /// Copy of this cell with the glyph removed but rendition kept
    pub fn without_char(&self) -> Self {
        Self {
            ch: None,
            ..self.clone()
        }
    }

    /// The character to display, a space when the cell is empty
    pub fn display_char(&self) -> char {
        self.ch.unwrap_or(' ')
    }

    /// True when every attribute matches a fresh default cell
    pub fn has_default_rendition(&self) -> bool {
        self.without_char() == Cell::default()
    }
}

/// Cell color: one of the eight base palette entries, the terminal default,
/// or a literal RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// Base palette (0-7)
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Base palette color for `index`, which must be below 8
    pub fn palette(index: u8) -> Self {
        debug_assert!(index < 8, "palette index {} out of range", index);
        Color::Indexed(index & 0x07)
    }
}

/// Character intensity (SGR 1 / 2 / 22)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Intensity {
    #[default]
    Normal,
    High,
    Low,
}

/// Character style (SGR 3 / 23)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextStyle {
    #[default]
    Normal,
    Italic,
}

/// Blink status (SGR 5 / 6 / 25)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Blink {
    #[default]
    None,
    Slow,
    Fast,
}
