//! Parser output
//!
//! The tokenizer splits the stream into runs of printable text and
//! recognized control sequences. Numeric defaults are already substituted;
//! range checks are left to the terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One unit of parser output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Text to print as-is (may contain `'\n'`)
    Text(String),
    /// A recognized control sequence
    Command(Command),
}

/// Direction or target of a cursor movement command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorMotion {
    Up,
    Down,
    Right,
    Left,
    /// Top-left corner
    Home,
    /// Bottom-right corner
    End,
    /// Absolute column (1-based)
    Column,
    /// Absolute row (1-based)
    Row,
    /// Up one row, scrolling at the top margin
    ReverseIndex,
}

/// A set/reset mode parameter such as `?25` or `4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// DEC private mode (`?` prefix)
    pub private: bool,
    pub code: u32,
}

impl Mode {
    pub const fn dec(code: u32) -> Self {
        Self {
            private: true,
            code,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.private {
            write!(f, "?{}", self.code)
        } else {
            write!(f, "{}", self.code)
        }
    }
}

/// A recognized control sequence with its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `ESC ] n ; text BEL`
    OsControl { code: u32, text: String },
    /// Relative/absolute single-axis moves and reverse index
    CursorMove { n: u32, motion: CursorMotion },
    /// `ESC [ row ; col H` (1-based)
    CursorPosition { row: u32, col: u32 },
    /// `ESC 7`
    SaveCursor,
    /// `ESC 8`
    RestoreCursor,
    /// `ESC [ ... m`
    GraphicRendition(Vec<u32>),
    DeleteChars(u32),
    InsertLines(u32),
    InsertChars(u32),
    DeleteLines(u32),
    EraseChars(u32),
    EraseInLine(u32),
    EraseInDisplay(u32),
    /// `ESC ( B`
    AsciiMode,
    /// `ESC ( 0`
    LineDrawingMode,
    /// `ESC =`
    KeypadApplicationMode,
    /// `ESC >`
    KeypadNumericMode,
    /// `ESC [ ?n h` / `ESC [ ?n l`
    SetMode { mode: Mode, enable: bool },
    /// `ESC [ top ; bottom r`; `bottom == None` means the screen height
    ScrollMargins { top: u32, bottom: Option<u32> },
    /// `ESC [ code ; a ; b t`; empty fields are `None`
    WindowManipulation {
        code: Option<u32>,
        a: Option<u32>,
        b: Option<u32>,
    },
    /// `ESC P text ESC \`
    DeviceControlString(String),
    /// `ESC [ 6 n`
    ReportCursor,
    PrimaryDeviceAttributes,
    SecondaryDeviceAttributes,
    TertiaryDeviceAttributes,
    Bell,
    Backspace,
    Tab,
    CarriageReturn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::dec(1049).to_string(), "?1049");
        assert_eq!(
            Mode {
                private: false,
                code: 4
            }
            .to_string(),
            "4"
        );
    }

    #[test]
    fn test_token_json() {
        let token = Token::Command(Command::CursorMove {
            n: 3,
            motion: CursorMotion::Up,
        });
        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(token, back);
    }
}
