//! Control sequence patterns
//!
//! Each recognizer is anchored at the start of its input and either matches
//! a complete sequence or fails without side effects. [`match_at`] tries
//! them in priority order and the first match wins, so a more specific
//! recognizer must appear before a more general one sharing its prefix.
//!
//! The recognizers work on bytes. Every delimiter they stop on is ASCII, so
//! all the slices they take fall on `char` boundaries.

use super::actions::{Command, CursorMotion, Mode};

pub(crate) const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;
const BS: u8 = 0x08;
const TAB: u8 = 0x09;
const CR: u8 = 0x0d;

/// Anchored matcher over one candidate position
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Consume `byte` if it is next
    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `bytes` if they are next, all or nothing
    fn eat_all(&mut self, bytes: &[u8]) -> bool {
        if self.input.as_bytes()[self.pos..].starts_with(bytes) {
            self.pos += bytes.len();
            true
        } else {
            false
        }
    }

    /// Consume one byte from `set`
    fn one_of(&mut self, set: &[u8]) -> Option<u8> {
        let byte = self.peek().filter(|b| set.contains(b))?;
        self.pos += 1;
        Some(byte)
    }

    /// `[^stop]*`
    fn take_until(&mut self, stop: &[u8]) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| !stop.contains(&b)) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// `[0-9;]*`
    fn take_params(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b';') {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// `\d*`
    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// `\d+`
    fn digits1(&mut self) -> Option<&'a str> {
        let digits = self.digits();
        (!digits.is_empty()).then_some(digits)
    }

    /// `\d?`
    fn digit_opt(&mut self) -> &'a str {
        let start = self.pos;
        if self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn csi(&mut self) -> bool {
        self.eat_all(&[ESC, b'['])
    }
}

/// Parse a digit run, saturating instead of overflowing
pub(crate) fn number(digits: &str) -> u32 {
    digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    })
}

fn number_or(digits: &str, default: u32) -> u32 {
    if digits.is_empty() {
        default
    } else {
        number(digits)
    }
}

fn optional_number(digits: &str) -> Option<u32> {
    (!digits.is_empty()).then(|| number(digits))
}

type Recognizer = fn(&mut Scanner<'_>) -> Option<Command>;

/// Recognizers in priority order
const PATTERNS: &[Recognizer] = &[
    os_control,
    cursor_move,
    short_cursor_move,
    cursor_position,
    save_cursor,
    restore_cursor,
    graphic_rendition,
    delete_chars,
    insert_lines,
    insert_chars,
    delete_lines,
    erase_chars,
    erase_in_line,
    erase_in_display,
    ascii_mode,
    line_drawing_mode,
    keypad_application_mode,
    keypad_numeric_mode,
    set_mode,
    scroll_margins,
    window_manipulation,
    device_control_string,
    report_cursor,
    primary_device_attributes,
    secondary_device_attributes,
    tertiary_device_attributes,
    bell,
    backspace,
    tab,
    carriage_return,
];

/// Bytes a sequence can start with
pub(crate) fn is_introducer(byte: u8) -> bool {
    matches!(byte, ESC | BEL | BS | TAB | CR)
}

/// Match the first recognizer anchored at the start of `input`. Returns
/// the command and the number of bytes it spans.
pub(crate) fn match_at(input: &str) -> Option<(Command, usize)> {
    PATTERNS.iter().find_map(|recognize| {
        let mut scanner = Scanner::new(input);
        recognize(&mut scanner).map(|command| (command, scanner.pos))
    })
}

// ============================================================================
// Recognizers
// ============================================================================

/// `ESC ] (\d+) ; ([^ESC BEL]+) BEL`
fn os_control(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.eat_all(&[ESC, b']']) {
        return None;
    }
    let code = number(s.digits1()?);
    if !s.eat(b';') {
        return None;
    }
    let text = s.take_until(&[ESC, BEL]);
    if text.is_empty() || !s.eat(BEL) {
        return None;
    }
    Some(Command::OsControl {
        code,
        text: text.to_string(),
    })
}

/// ``ESC [ (\d*) (A|B|C|D|H|F|G|`|d)``
fn cursor_move(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.csi() {
        return None;
    }
    let n = number_or(s.digits(), 1);
    let motion = match s.one_of(b"ABCDHFG`d")? {
        b'A' => CursorMotion::Up,
        b'B' => CursorMotion::Down,
        b'C' => CursorMotion::Right,
        b'D' => CursorMotion::Left,
        b'H' => CursorMotion::Home,
        b'F' => CursorMotion::End,
        b'd' => CursorMotion::Row,
        _ => CursorMotion::Column,
    };
    Some(Command::CursorMove { n, motion })
}

/// `ESC (A|B|C|D|M)`
fn short_cursor_move(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.eat(ESC) {
        return None;
    }
    let motion = match s.one_of(b"ABCDM")? {
        b'A' => CursorMotion::Up,
        b'B' => CursorMotion::Down,
        b'C' => CursorMotion::Right,
        b'D' => CursorMotion::Left,
        _ => CursorMotion::ReverseIndex,
    };
    Some(Command::CursorMove { n: 1, motion })
}

/// `ESC [ (\d+) ; (\d+) (H|f)`
fn cursor_position(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.csi() {
        return None;
    }
    let row = number(s.digits1()?);
    if !s.eat(b';') {
        return None;
    }
    let col = number(s.digits1()?);
    s.one_of(b"Hf")?;
    Some(Command::CursorPosition { row, col })
}

fn save_cursor(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat_all(&[ESC, b'7']).then_some(Command::SaveCursor)
}

fn restore_cursor(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat_all(&[ESC, b'8']).then_some(Command::RestoreCursor)
}

/// `ESC [ ((\d+)?(;(\d+)?)*) m`; empty fields read as 0
fn graphic_rendition(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.csi() {
        return None;
    }
    let params = s.take_params();
    if !s.eat(b'm') {
        return None;
    }
    Some(Command::GraphicRendition(
        params.split(';').map(number).collect(),
    ))
}

/// `ESC [ (\d*) <final>` with a default of 1
fn counted(s: &mut Scanner<'_>, final_byte: u8) -> Option<u32> {
    if !s.csi() {
        return None;
    }
    let n = number_or(s.digits(), 1);
    s.eat(final_byte).then_some(n)
}

fn delete_chars(s: &mut Scanner<'_>) -> Option<Command> {
    counted(s, b'P').map(Command::DeleteChars)
}

fn insert_lines(s: &mut Scanner<'_>) -> Option<Command> {
    counted(s, b'L').map(Command::InsertLines)
}

fn insert_chars(s: &mut Scanner<'_>) -> Option<Command> {
    counted(s, b'@').map(Command::InsertChars)
}

fn delete_lines(s: &mut Scanner<'_>) -> Option<Command> {
    counted(s, b'M').map(Command::DeleteLines)
}

fn erase_chars(s: &mut Scanner<'_>) -> Option<Command> {
    counted(s, b'X').map(Command::EraseChars)
}

/// `ESC [ (\d?) <final>` with a default of 0
fn erase_mode(s: &mut Scanner<'_>, final_byte: u8) -> Option<u32> {
    if !s.csi() {
        return None;
    }
    let mode = number_or(s.digit_opt(), 0);
    s.eat(final_byte).then_some(mode)
}

fn erase_in_line(s: &mut Scanner<'_>) -> Option<Command> {
    erase_mode(s, b'K').map(Command::EraseInLine)
}

fn erase_in_display(s: &mut Scanner<'_>) -> Option<Command> {
    erase_mode(s, b'J').map(Command::EraseInDisplay)
}

fn ascii_mode(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat_all(&[ESC, b'(', b'B']).then_some(Command::AsciiMode)
}

fn line_drawing_mode(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat_all(&[ESC, b'(', b'0'])
        .then_some(Command::LineDrawingMode)
}

fn keypad_application_mode(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat_all(&[ESC, b'='])
        .then_some(Command::KeypadApplicationMode)
}

fn keypad_numeric_mode(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat_all(&[ESC, b'>'])
        .then_some(Command::KeypadNumericMode)
}

/// `ESC [ (\??\d+) (h|l)`
fn set_mode(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.csi() {
        return None;
    }
    let private = s.eat(b'?');
    let code = number(s.digits1()?);
    let enable = s.one_of(b"hl")? == b'h';
    Some(Command::SetMode {
        mode: Mode { private, code },
        enable,
    })
}

/// `ESC [ (\d*) (; (\d*))? r`
fn scroll_margins(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.csi() {
        return None;
    }
    let top = number_or(s.digits(), 1);
    let bottom = if s.eat(b';') {
        optional_number(s.digits())
    } else {
        None
    };
    s.eat(b'r').then_some(Command::ScrollMargins { top, bottom })
}

/// `ESC [ (\d*) ; (\d*) ; (\d*) t`
fn window_manipulation(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.csi() {
        return None;
    }
    let code = optional_number(s.digits());
    if !s.eat(b';') {
        return None;
    }
    let a = optional_number(s.digits());
    if !s.eat(b';') {
        return None;
    }
    let b = optional_number(s.digits());
    s.eat(b't')
        .then_some(Command::WindowManipulation { code, a, b })
}

/// `ESC P ([^ESC]*) ESC \`
fn device_control_string(s: &mut Scanner<'_>) -> Option<Command> {
    if !s.eat_all(&[ESC, b'P']) {
        return None;
    }
    let text = s.take_until(&[ESC]);
    s.eat_all(&[ESC, b'\\'])
        .then(|| Command::DeviceControlString(text.to_string()))
}

/// `ESC [ 6 n`
fn report_cursor(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat_all(&[ESC, b'[', b'6', b'n'])
        .then_some(Command::ReportCursor)
}

/// `ESC [ <marker> 0? c`
fn device_attributes(s: &mut Scanner<'_>, marker: Option<u8>) -> bool {
    if !s.csi() {
        return false;
    }
    if let Some(marker) = marker {
        if !s.eat(marker) {
            return false;
        }
    }
    s.eat(b'0');
    s.eat(b'c')
}

fn primary_device_attributes(s: &mut Scanner<'_>) -> Option<Command> {
    device_attributes(s, None).then_some(Command::PrimaryDeviceAttributes)
}

fn secondary_device_attributes(s: &mut Scanner<'_>) -> Option<Command> {
    device_attributes(s, Some(b'>')).then_some(Command::SecondaryDeviceAttributes)
}

fn tertiary_device_attributes(s: &mut Scanner<'_>) -> Option<Command> {
    device_attributes(s, Some(b'=')).then_some(Command::TertiaryDeviceAttributes)
}

fn bell(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat(BEL).then_some(Command::Bell)
}

fn backspace(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat(BS).then_some(Command::Backspace)
}

fn tab(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat(TAB).then_some(Command::Tab)
}

fn carriage_return(s: &mut Scanner<'_>) -> Option<Command> {
    s.eat(CR).then_some(Command::CarriageReturn)
}
