//! Deterministic snapshot generation
//!
//! Snapshots capture the visible terminal state in a serializable format
//! for testing, debugging and handing frames to a renderer on another
//! thread. Given the same input stream, the terminal must produce identical
//! snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Blink, Cell, Color, Intensity, TextStyle};
use super::screen::ScreenBuffer;

/// A complete snapshot of the terminal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Visible grid content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    /// Cursor state
    pub cursor: CursorSnapshot,
    /// Scroll region
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    /// Terminal modes
    pub modes: ModesSnapshot,
    /// Window title
    pub title: String,
    /// Whether on alternate screen
    pub alternate_screen: bool,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Character content, empty for a blank cell
    pub content: String,
    /// Foreground color
    pub fg: ColorSnapshot,
    /// Background color
    pub bg: ColorSnapshot,
    /// Rendition flags
    #[serde(default, skip_serializing_if = "StyleSnapshot::is_plain")]
    pub style: StyleSnapshot,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Default,
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

/// Snapshot of rendition attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink_slow: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink_fast: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reversed: bool,
}

impl StyleSnapshot {
    fn is_plain(&self) -> bool {
        *self == StyleSnapshot::default()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
    pub blinking: bool,
}

/// Snapshot of terminal modes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModesSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub application_cursor: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub application_keypad: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub line_drawing: bool,
}

impl From<&Color> for ColorSnapshot {
    fn from(color: &Color) -> Self {
        match color {
            Color::Default => ColorSnapshot::Default,
            Color::Indexed(i) => ColorSnapshot::Indexed { index: *i },
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb {
                r: *r,
                g: *g,
                b: *b,
            },
        }
    }
}

impl From<&Cell> for StyleSnapshot {
    fn from(cell: &Cell) -> Self {
        StyleSnapshot {
            bold: cell.intensity == Intensity::High,
            faint: cell.intensity == Intensity::Low,
            italic: cell.style == TextStyle::Italic,
            blink_slow: cell.blink == Blink::Slow,
            blink_fast: cell.blink == Blink::Fast,
            reversed: cell.reversed,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            content: cell.ch.map(String::from).unwrap_or_default(),
            fg: ColorSnapshot::from(&cell.foreground),
            bg: ColorSnapshot::from(&cell.background),
            style: StyleSnapshot::from(cell),
        }
    }
}

impl CellSnapshot {
    fn blank() -> Self {
        CellSnapshot::from(&Cell::default())
    }
}

impl Snapshot {
    /// Capture a screen buffer. Cursor visibility, modes and title are
    /// terminal-level state and start at their defaults here.
    pub fn from_screen(screen: &ScreenBuffer) -> Self {
        let mut grid = Vec::with_capacity(screen.rows());

        for row in 0..screen.rows() {
            let row_cells = screen
                .row(row)
                .iter()
                .map(|cell| cell.as_ref().map_or_else(CellSnapshot::blank, CellSnapshot::from))
                .collect();
            grid.push(row_cells);
        }

        let (col, row) = screen.cursor();

        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: CursorSnapshot {
                col,
                row,
                visible: true,
                blinking: false,
            },
            scroll_top: screen.scroll_top(),
            scroll_bottom: screen.scroll_bottom(),
            modes: ModesSnapshot::default(),
            title: String::new(),
            alternate_screen: false,
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get a simple text representation of the screen (for debugging)
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row {
                if cell.content.is_empty() {
                    result.push(' ');
                } else {
                    result.push_str(&cell.content);
                }
            }
            // Trim trailing spaces and add newline
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        // Remove trailing empty lines
        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare the grids of two snapshots, ignoring cursor and modes
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.grid == other.grid
    }
}
