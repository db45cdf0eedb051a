//! Terminal Executor
//!
//! Ties together the parser and the screen buffers and applies parsed
//! commands to the terminal state. This is the main integration point
//! between parsing and the screen model.
//!
//! The terminal owns the main screen and, while it is active, the
//! alternate screen. After every `process` call the renderer is handed the
//! active screen and the rows that changed.

use crate::config::Config;
use crate::core::{apply_sgr, Cell, ModesSnapshot, ScreenBuffer, Snapshot, MAX_SCREEN_CELLS};
use crate::host::{Input, KeyboardModes, NullRenderer, Renderer, ReplyBuffer, Source};
use crate::parser::{Command, ControlParser, CursorMotion, Mode, Token};

/// Reply to a primary device attributes query: VT100 with no options
const PRIMARY_DEVICE_ATTRIBUTES: &str = "\x1b[?1;0c";

/// Spaces printed for a horizontal tab
const TAB_WIDTH: usize = 4;

/// Character set designated by `ESC ( B` / `ESC ( 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Ascii,
    /// DEC special graphics. Recorded only; glyphs are not translated.
    LineDrawing,
}

/// Terminal state machine that processes input and updates the screen
pub struct Terminal<S = ReplyBuffer, R = NullRenderer, I = KeyboardModes> {
    /// The primary screen
    main: ScreenBuffer,
    /// The alternate screen, present while it is active
    alternate: Option<ScreenBuffer>,
    /// The control sequence parser
    parser: ControlParser,
    /// Rendition applied to printed characters
    default_cell: Cell,
    /// Single cursor save slot shared by both screens
    saved_cursor: Option<(usize, usize)>,
    title: String,
    application_cursor_mode: bool,
    keypad_application_mode: bool,
    cursor_visible: bool,
    cursor_blink: bool,
    charset: Charset,
    last_device_control: Option<String>,
    source: S,
    renderer: R,
    input: I,
}

impl Terminal {
    /// Create a terminal with in-memory collaborators
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_host(
            cols,
            rows,
            ReplyBuffer::new(),
            NullRenderer,
            KeyboardModes::default(),
        )
    }

    /// Create a terminal sized and tuned by `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.columns, config.rows).with_escape_wait_length(config.escape_wait_length)
    }
}

impl<S, R, I> Terminal<S, R, I>
where
    S: Source,
    R: Renderer,
    I: Input,
{
    /// Create a terminal wired to the given collaborators
    pub fn with_host(cols: usize, rows: usize, source: S, renderer: R, input: I) -> Self {
        Self {
            main: ScreenBuffer::new(cols, rows),
            alternate: None,
            parser: ControlParser::new(),
            default_cell: Cell::default(),
            saved_cursor: None,
            title: String::new(),
            application_cursor_mode: false,
            keypad_application_mode: false,
            cursor_visible: true,
            cursor_blink: false,
            charset: Charset::Ascii,
            last_device_control: None,
            source,
            renderer,
            input,
        }
    }

    /// Replace the parser with one that holds back at most `length`
    /// trailing bytes of a split sequence
    pub fn with_escape_wait_length(mut self, length: usize) -> Self {
        self.parser = ControlParser::with_escape_wait_length(length);
        self
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Process a chunk of output from the host
    pub fn process(&mut self, data: &str) {
        let tokens = self.parser.feed(data);
        self.dispatch(tokens);
    }

    /// Print whatever the parser is still holding back, e.g. at the end
    /// of the stream
    pub fn flush(&mut self) {
        let tokens = self.parser.flush();
        self.dispatch(tokens);
    }

    fn dispatch(&mut self, tokens: Vec<Token>) {
        for token in tokens {
            match token {
                Token::Text(text) => self.print_text(&text),
                Token::Command(command) => self.execute(command),
            }
        }
        self.refresh();
    }

    /// Hand the changed rows of the active screen to the renderer
    fn refresh(&mut self) {
        let screen = self.alternate.as_ref().unwrap_or(&self.main);
        let dirty = screen.dirty_rows();
        if !dirty.is_empty() {
            self.renderer.refresh(screen, &dirty);
        }
        self.screen_mut().mark_clean();
    }

    fn print_text(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.screen_mut().linefeed();
            } else {
                let cell = self.default_cell.with_char(c);
                self.screen_mut().print(cell);
            }
        }
    }

    fn execute(&mut self, command: Command) {
        tracing::trace!("dispatch {:?}", command);

        match command {
            Command::OsControl { code, text } => self.os_control(code, text),
            Command::CursorMove { n, motion } => self.move_cursor(motion, n),
            Command::CursorPosition { row, col } => {
                self.screen_mut()
                    .set_cursor(i64::from(col) - 1, i64::from(row) - 1);
            }
            Command::SaveCursor => {
                self.saved_cursor = Some(self.screen().cursor());
            }
            Command::RestoreCursor => match self.saved_cursor {
                Some((col, row)) => self.screen_mut().set_cursor(col as i64, row as i64),
                None => tracing::debug!("restore cursor without a saved position"),
            },
            Command::GraphicRendition(params) => {
                self.default_cell = apply_sgr(&params, &self.default_cell);
            }
            Command::DeleteChars(n) => self.screen_mut().delete_chars(n as usize),
            Command::InsertLines(n) => self.screen_mut().insert_lines(n as usize),
            Command::InsertChars(n) => self.screen_mut().insert_chars(n as usize),
            Command::DeleteLines(n) => self.screen_mut().delete_lines(n as usize),
            Command::EraseChars(n) => self.screen_mut().erase_chars(n as usize),
            Command::EraseInLine(mode) => self.screen_mut().erase_in_line(mode),
            Command::EraseInDisplay(mode) => self.screen_mut().erase_in_display(mode),
            Command::AsciiMode => self.charset = Charset::Ascii,
            Command::LineDrawingMode => {
                tracing::debug!("line drawing charset selected; glyphs are not translated");
                self.charset = Charset::LineDrawing;
            }
            Command::KeypadApplicationMode => self.set_keypad_application_mode(true),
            Command::KeypadNumericMode => self.set_keypad_application_mode(false),
            Command::SetMode { mode, enable } => self.set_mode(mode, enable),
            Command::ScrollMargins { top, bottom } => self.set_scroll_margins(top, bottom),
            Command::WindowManipulation { code, a, b } => self.window_manipulation(code, a, b),
            Command::DeviceControlString(text) => {
                tracing::debug!("device control string {:?} ignored", text);
                self.last_device_control = Some(text);
            }
            Command::ReportCursor => {
                let (col, row) = self.screen().cursor();
                self.source.write(&format!("\x1b[{};{}R", row + 1, col + 1));
            }
            Command::PrimaryDeviceAttributes => self.source.write(PRIMARY_DEVICE_ATTRIBUTES),
            Command::SecondaryDeviceAttributes => {
                tracing::debug!("secondary device attributes request ignored");
            }
            Command::TertiaryDeviceAttributes => {
                tracing::debug!("tertiary device attributes request ignored");
            }
            Command::Bell => {
                tracing::debug!("bell");
                self.renderer.bell();
            }
            Command::Backspace => self.screen_mut().move_cursor_by(-1, 0),
            Command::Tab => self.print_text(&" ".repeat(TAB_WIDTH)),
            Command::CarriageReturn => {
                let (_, row) = self.screen().cursor();
                self.screen_mut().set_cursor(0, row as i64);
            }
        }
    }

    fn move_cursor(&mut self, motion: CursorMotion, n: u32) {
        let n = i64::from(n);
        let screen = self.screen_mut();
        let (col, row) = screen.cursor();

        match motion {
            CursorMotion::Up => screen.move_cursor_by(0, -n),
            CursorMotion::Down => screen.move_cursor_by(0, n),
            CursorMotion::Right => screen.move_cursor_by(n, 0),
            CursorMotion::Left => screen.move_cursor_by(-n, 0),
            CursorMotion::Home => screen.set_cursor(0, 0),
            CursorMotion::End => {
                let (cols, rows) = screen.size();
                screen.set_cursor(cols as i64 - 1, rows as i64 - 1);
            }
            CursorMotion::Column => screen.set_cursor(n - 1, row as i64),
            CursorMotion::Row => screen.set_cursor(col as i64, n - 1),
            CursorMotion::ReverseIndex => screen.reverse_index(),
        }
    }

    fn os_control(&mut self, code: u32, text: String) {
        match code {
            0 => {
                self.renderer.title_changed(&text);
                self.title = text;
            }
            _ => tracing::debug!("OSC {} ignored: {:?}", code, text),
        }
    }

    fn set_mode(&mut self, mode: Mode, enable: bool) {
        if !mode.private {
            tracing::debug!("mode {} ignored", mode);
            return;
        }

        match mode.code {
            1 => {
                self.application_cursor_mode = enable;
                self.input.set_application_cursor_mode(enable);
            }
            12 => {
                self.cursor_blink = enable;
                self.renderer.cursor_blink_changed(enable);
            }
            25 => {
                self.cursor_visible = enable;
                self.renderer.cursor_visibility_changed(enable);
            }
            1049 => {
                if enable {
                    self.enter_alternate_screen();
                } else {
                    self.leave_alternate_screen();
                }
            }
            _ => tracing::debug!(
                "mode {} ignored ({})",
                mode,
                if enable { "set" } else { "reset" }
            ),
        }
    }

    fn set_keypad_application_mode(&mut self, enable: bool) {
        self.keypad_application_mode = enable;
        self.input.set_keypad_application_mode(enable);
    }

    /// Apply `ESC [ top ; bottom r` (1-based). An omitted or oversized
    /// bottom means the last row.
    fn set_scroll_margins(&mut self, top: u32, bottom: Option<u32>) {
        let rows = self.screen().rows();
        let top = (top as usize).max(1);
        let bottom = match bottom {
            Some(bottom) if (bottom as usize) <= rows => bottom as usize,
            _ => rows,
        };

        if top < bottom {
            let screen = self.screen_mut();
            screen.set_cursor(0, 0);
            screen.set_scroll_margins(top - 1, bottom - 1);
        } else {
            tracing::warn!("scroll margins {};{} rejected for {} rows", top, bottom, rows);
        }
    }

    fn window_manipulation(&mut self, code: Option<u32>, a: Option<u32>, b: Option<u32>) {
        match (code, a, b) {
            (Some(8), Some(rows), Some(cols)) if rows > 0 && cols > 0 => {
                if (rows as usize).saturating_mul(cols as usize) > MAX_SCREEN_CELLS {
                    tracing::debug!("window size {}x{} ignored", cols, rows);
                    return;
                }
                self.resize(cols as usize, rows as usize);
            }
            _ => tracing::debug!("window manipulation {:?};{:?};{:?} ignored", code, a, b),
        }
    }

    fn enter_alternate_screen(&mut self) {
        if self.alternate.is_some() {
            tracing::debug!("already on the alternate screen");
            return;
        }
        let (cols, rows) = self.main.size();
        self.alternate = Some(ScreenBuffer::new(cols, rows));
        self.renderer.screen_switched(true);
    }

    fn leave_alternate_screen(&mut self) {
        let Some(alternate) = self.alternate.take() else {
            tracing::debug!("not on the alternate screen");
            return;
        };

        // Resizes made while the alternate screen was up apply to main too
        let (cols, rows) = alternate.size();
        if self.main.size() != (cols, rows) {
            self.main.resize(cols, rows);
        }
        self.main.mark_all_dirty();
        self.renderer.screen_switched(false);
    }

    // ------------------------------------------------------------------
    // Host operations
    // ------------------------------------------------------------------

    /// Resize the active screen. The main screen follows when the
    /// alternate screen is left.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let changed = self.screen().size() != (cols, rows);
        self.screen_mut().resize(cols, rows);
        if changed {
            self.renderer.resized(cols, rows);
        }
    }

    /// Capture the visible state
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::from_screen(self.screen());
        snapshot.cursor.visible = self.cursor_visible;
        snapshot.cursor.blinking = self.cursor_blink;
        snapshot.modes = ModesSnapshot {
            application_cursor: self.application_cursor_mode,
            application_keypad: self.keypad_application_mode,
            line_drawing: self.charset == Charset::LineDrawing,
        };
        snapshot.title = self.title.clone();
        snapshot.alternate_screen = self.alternate.is_some();
        snapshot
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The active screen
    pub fn screen(&self) -> &ScreenBuffer {
        self.alternate.as_ref().unwrap_or(&self.main)
    }

    /// The active screen, mutably
    pub fn screen_mut(&mut self) -> &mut ScreenBuffer {
        match &mut self.alternate {
            Some(alternate) => alternate,
            None => &mut self.main,
        }
    }

    pub fn main_screen(&self) -> &ScreenBuffer {
        &self.main
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.alternate.is_some()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rendition applied to the next printed character
    pub fn default_cell(&self) -> &Cell {
        &self.default_cell
    }

    pub fn saved_cursor(&self) -> Option<(usize, usize)> {
        self.saved_cursor
    }

    pub fn application_cursor_mode(&self) -> bool {
        self.application_cursor_mode
    }

    pub fn keypad_application_mode(&self) -> bool {
        self.keypad_application_mode
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn cursor_blink(&self) -> bool {
        self.cursor_blink
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Payload of the most recent device control string
    pub fn last_device_control(&self) -> Option<&str> {
        self.last_device_control.as_deref()
    }

    /// The parser, e.g. to register token observers
    pub fn parser_mut(&mut self) -> &mut ControlParser {
        &mut self.parser
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn input(&self) -> &I {
        &self.input
    }
}

impl<R: Renderer, I: Input> Terminal<ReplyBuffer, R, I> {
    /// Replies written since the last call
    pub fn take_replies(&mut self) -> String {
        self.source.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Color, Intensity};

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        refreshes: Vec<Vec<usize>>,
        events: Vec<String>,
    }

    impl Renderer for RecordingRenderer {
        fn refresh(&mut self, _screen: &ScreenBuffer, dirty_rows: &[usize]) {
            self.refreshes.push(dirty_rows.to_vec());
        }

        fn resized(&mut self, cols: usize, rows: usize) {
            self.events.push(format!("resized {}x{}", cols, rows));
        }

        fn screen_switched(&mut self, alternate: bool) {
            self.events.push(format!("alternate {}", alternate));
        }

        fn cursor_visibility_changed(&mut self, visible: bool) {
            self.events.push(format!("visible {}", visible));
        }

        fn cursor_blink_changed(&mut self, blinking: bool) {
            self.events.push(format!("blink {}", blinking));
        }

        fn title_changed(&mut self, title: &str) {
            self.events.push(format!("title {}", title));
        }

        fn bell(&mut self) {
            self.events.push("bell".to_string());
        }
    }

    fn recording(cols: usize, rows: usize) -> Terminal<ReplyBuffer, RecordingRenderer> {
        Terminal::with_host(
            cols,
            rows,
            ReplyBuffer::new(),
            RecordingRenderer::default(),
            KeyboardModes::default(),
        )
    }

    fn rows_of(term: &Terminal<impl Source, impl Renderer, impl Input>) -> Vec<String> {
        (0..term.screen().rows())
            .map(|row| term.screen().row_text(row))
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let term = Terminal::new(80, 24);
        assert_eq!(term.screen().size(), (80, 24));
        assert_eq!(term.screen().cursor(), (0, 0));
        assert_eq!(term.screen().scroll_top(), 0);
        assert_eq!(term.screen().scroll_bottom(), 23);
        assert_eq!(term.default_cell(), &Cell::default());
        assert_eq!(term.saved_cursor(), None);
        assert_eq!(term.title(), "");
        assert!(!term.application_cursor_mode());
        assert!(!term.keypad_application_mode());
        assert!(term.cursor_visible());
        assert!(!term.cursor_blink());
        assert_eq!(term.charset(), Charset::Ascii);
        assert!(!term.is_alternate_screen());
    }

    #[test]
    fn test_wrap_to_next_row() {
        let mut term = Terminal::new(5, 5);
        term.process("12345");
        term.process("67890");
        assert_eq!(term.screen().cursor(), (0, 2));
        assert_eq!(rows_of(&term)[..2], ["12345", "67890"]);
    }

    #[test]
    fn test_wrap_scrolls_at_bottom() {
        let mut term = Terminal::new(2, 2);
        term.process("123");
        assert_eq!(rows_of(&term), ["12", "3"]);
        term.process("4");
        assert_eq!(rows_of(&term), ["34", ""]);
        assert_eq!(term.screen().cursor(), (0, 1));
    }

    #[test]
    fn test_newline_moves_to_column_zero() {
        let mut term = Terminal::new(10, 3);
        term.process("ab\ncd");
        assert_eq!(rows_of(&term), ["ab", "cd", ""]);
        assert_eq!(term.screen().cursor(), (2, 1));
    }

    #[test]
    fn test_colors() {
        let mut term = Terminal::new(10, 2);
        term.process("\x1b[31ma\x1b[0mb");

        let a = term.screen().get_cell(0, 0).unwrap();
        assert_eq!(a.ch, Some('a'));
        assert_eq!(a.foreground, Color::RED);

        let b = term.screen().get_cell(1, 0).unwrap();
        assert_eq!(b.foreground, Color::Default);
        assert_eq!(term.default_cell(), &Cell::default());
    }

    #[test]
    fn test_sgr_accumulates_on_default_cell() {
        let mut term = Terminal::new(10, 2);
        term.process("\x1b[1m\x1b[38;5;196mx");
        let cell = term.screen().get_cell(0, 0).unwrap();
        assert_eq!(cell.intensity, Intensity::High);
        assert_eq!(cell.foreground, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_split_sequence_across_chunks() {
        let mut term = Terminal::new(10, 2);
        term.process("\x1b[3");
        assert_eq!(term.screen().row_text(0), "");
        term.process("1mX");
        let cell = term.screen().get_cell(0, 0).unwrap();
        assert_eq!(cell.ch, Some('X'));
        assert_eq!(cell.foreground, Color::RED);
    }

    #[test]
    fn test_flush_prints_held_bytes() {
        let mut term = Terminal::new(10, 2);
        term.process("a\x1b[");
        assert_eq!(term.screen().row_text(0), "a");
        term.flush();
        assert_eq!(term.screen().row_text(0), "a\u{1b}[");
    }

    #[test]
    fn test_cursor_position_report() {
        let mut term = Terminal::new(10, 10);
        term.process("\x1b[4;5H\x1b[6n");
        assert_eq!(term.screen().cursor(), (4, 3));
        assert_eq!(term.take_replies(), "\x1b[4;5R");
        assert_eq!(term.take_replies(), "");
    }

    #[test]
    fn test_device_attributes() {
        let mut term = Terminal::new(10, 2);
        term.process("\x1b[c");
        assert_eq!(term.take_replies(), "\x1b[?1;0c");
        term.process("\x1b[0c");
        assert_eq!(term.take_replies(), "\x1b[?1;0c");
        term.process("\x1b[>c\x1b[=0c");
        assert_eq!(term.take_replies(), "");
    }

    #[test]
    fn test_relative_cursor_moves_clamp() {
        let mut term = Terminal::new(10, 5);
        term.process("\x1b[3B\x1b[4C");
        assert_eq!(term.screen().cursor(), (4, 3));
        term.process("\x1b[A\x1b[2D");
        assert_eq!(term.screen().cursor(), (2, 2));
        term.process("\x1b[99A\x1b[99D");
        assert_eq!(term.screen().cursor(), (0, 0));
        term.process("\x1b[99B\x1b[99C");
        assert_eq!(term.screen().cursor(), (9, 4));
    }

    #[test]
    fn test_short_cursor_moves() {
        let mut term = Terminal::new(10, 5);
        term.process("\x1b[3;3H\x1bA\x1bD");
        assert_eq!(term.screen().cursor(), (1, 1));
        term.process("\x1bB\x1bC");
        assert_eq!(term.screen().cursor(), (2, 2));
    }

    #[test]
    fn test_absolute_cursor_moves() {
        let mut term = Terminal::new(10, 5);
        term.process("\x1b[3;3H\x1b[H");
        assert_eq!(term.screen().cursor(), (0, 0));
        // `H` with one parameter is still home
        term.process("\x1b[3;3H\x1b[4H");
        assert_eq!(term.screen().cursor(), (0, 0));
        term.process("\x1b[F");
        assert_eq!(term.screen().cursor(), (9, 4));
        term.process("\x1b[3G");
        assert_eq!(term.screen().cursor(), (2, 4));
        term.process("\x1b[5`");
        assert_eq!(term.screen().cursor(), (4, 4));
        term.process("\x1b[2d");
        assert_eq!(term.screen().cursor(), (4, 1));
        term.process("\x1b[0d\x1b[0G");
        assert_eq!(term.screen().cursor(), (0, 0));
        term.process("\x1b[99;99H");
        assert_eq!(term.screen().cursor(), (9, 4));
        term.process("\x1b[0;0f");
        assert_eq!(term.screen().cursor(), (0, 0));
    }

    #[test]
    fn test_save_restore_cursor() {
        let mut term = Terminal::new(10, 5);
        term.process("\x1b[2;3H\x1b7\x1b[H\x1b8");
        assert_eq!(term.screen().cursor(), (2, 1));
        assert_eq!(term.saved_cursor(), Some((2, 1)));

        // The slot survives a restore
        term.process("\x1b[5;5H\x1b8");
        assert_eq!(term.screen().cursor(), (2, 1));
    }

    #[test]
    fn test_restore_without_save_is_ignored() {
        let mut term = Terminal::new(10, 5);
        term.process("\x1b[3;4H\x1b8");
        assert_eq!(term.screen().cursor(), (3, 2));
    }

    #[test]
    fn test_restore_clamps_after_resize() {
        let mut term = Terminal::new(10, 10);
        term.process("\x1b[9;9H\x1b7");
        term.resize(5, 5);
        term.process("\x1b8");
        assert_eq!(term.screen().cursor(), (4, 4));
    }

    #[test]
    fn test_erase_sequences() {
        let mut term = Terminal::new(5, 4);
        term.process("abcde\x1b[2;1Hfghij\x1b[3;1Hklmno");

        term.process("\x1b[1;3H\x1b[K");
        assert_eq!(rows_of(&term), ["ab", "fghij", "klmno", ""]);

        term.process("\x1b[2;3H\x1b[1K");
        assert_eq!(rows_of(&term), ["ab", "   ij", "klmno", ""]);

        term.process("\x1b[3;2H\x1b[X");
        assert_eq!(rows_of(&term), ["ab", "   ij", "k mno", ""]);

        term.process("\x1b[3;4H\x1b[0J");
        assert_eq!(rows_of(&term), ["ab", "   ij", "k m", ""]);

        term.process("\x1b[2;5H\x1b[1J");
        assert_eq!(rows_of(&term), ["", "", "k m", ""]);

        term.process("\x1b[2J");
        assert_eq!(rows_of(&term), ["", "", "", ""]);
        assert_eq!(term.screen().cursor(), (4, 1));
    }

    #[test]
    fn test_unsupported_erase_modes_ignored() {
        let mut term = Terminal::new(5, 2);
        term.process("abc\x1b[3J\x1b[5K");
        assert_eq!(rows_of(&term), ["abc", ""]);
    }

    #[test]
    fn test_insert_delete_chars() {
        let mut term = Terminal::new(7, 1);
        term.process("abcdef\x1b[1;2H\x1b[2@");
        assert_eq!(term.screen().row_text(0), "a  bcde");

        term.process("\x1b[3P");
        assert_eq!(term.screen().row_text(0), "acde");

        term.process("\x1b[P");
        assert_eq!(term.screen().row_text(0), "ade");
    }

    #[test]
    fn test_insert_delete_lines() {
        let mut term = Terminal::new(3, 4);
        term.process("\x1b[1;1Ha\x1b[2;1Hb\x1b[3;1Hc\x1b[4;1Hd");

        term.process("\x1b[2;1H\x1b[L");
        assert_eq!(rows_of(&term), ["a", "", "b", "c"]);

        term.process("\x1b[2M");
        assert_eq!(rows_of(&term), ["a", "c", "", ""]);
    }

    #[test]
    fn test_insert_line_below_margin_ignored() {
        let mut term = Terminal::new(3, 4);
        term.process("\x1b[4;1Hd\x1b[1;2r\x1b[4;1H\x1b[L\x1b[M");
        assert_eq!(rows_of(&term), ["", "", "", "d"]);
    }

    #[test]
    fn test_scroll_margins_limit_scrolling() {
        let mut term = Terminal::new(3, 5);
        for (row, ch) in ['a', 'b', 'c', 'd', 'e'].iter().enumerate() {
            term.process(&format!("\x1b[{};1H{}", row + 1, ch));
        }

        term.process("\x1b[1;3r");
        assert_eq!(term.screen().cursor(), (0, 0));
        assert_eq!(
            (term.screen().scroll_top(), term.screen().scroll_bottom()),
            (0, 2)
        );

        term.process("\x1b[3;1H\n");
        assert_eq!(rows_of(&term), ["b", "c", "", "d", "e"]);
        assert_eq!(term.screen().cursor(), (0, 2));
    }

    #[test]
    fn test_scroll_margin_defaults_and_rejection() {
        let mut term = Terminal::new(3, 5);
        term.process("\x1b[2;4r");
        assert_eq!(
            (term.screen().scroll_top(), term.screen().scroll_bottom()),
            (1, 3)
        );

        term.process("\x1b[r");
        assert_eq!(
            (term.screen().scroll_top(), term.screen().scroll_bottom()),
            (0, 4)
        );

        term.process("\x1b[0;99r");
        assert_eq!(term.screen().scroll_bottom(), 4);

        // top >= bottom is rejected and the cursor stays
        term.process("\x1b[2;2H\x1b[3;2r\x1b[4;4r");
        assert_eq!(
            (term.screen().scroll_top(), term.screen().scroll_bottom()),
            (0, 4)
        );
        assert_eq!(term.screen().cursor(), (1, 1));
    }

    #[test]
    fn test_reverse_index_scrolls_at_top() {
        let mut term = Terminal::new(3, 3);
        term.process("\x1b[1;1Ha\x1b[2;1Hb\x1b[1;1H\x1bM");
        assert_eq!(rows_of(&term), ["", "a", "b"]);
        assert_eq!(term.screen().cursor(), (0, 0));

        term.process("\x1b[3;1H\x1bM");
        assert_eq!(term.screen().cursor(), (0, 1));
    }

    #[test]
    fn test_c0_controls() {
        let mut term = Terminal::new(10, 2);
        term.process("a\tb");
        assert_eq!(term.screen().row_text(0), "a    b");
        assert_eq!(term.screen().cursor(), (6, 0));

        term.process("\x08c");
        assert_eq!(term.screen().row_text(0), "a    c");

        term.process("\rX");
        assert_eq!(term.screen().row_text(0), "X    c");
        assert_eq!(term.screen().cursor(), (1, 0));
    }

    #[test]
    fn test_bell_and_title_notify_renderer() {
        let mut term = recording(10, 2);
        term.process("\x07\x1b]0;hello\x07\x1b]2;other\x07");
        assert_eq!(term.title(), "hello");
        assert_eq!(term.renderer().events, ["bell", "title hello"]);
    }

    #[test]
    fn test_cursor_modes() {
        let mut term = recording(10, 2);
        term.process("\x1b[?25l\x1b[?12h");
        assert!(!term.cursor_visible());
        assert!(term.cursor_blink());

        term.process("\x1b[?25h\x1b[?12l\x1b[?2004h\x1b[4h");
        assert!(term.cursor_visible());
        assert!(!term.cursor_blink());
        assert_eq!(
            term.renderer().events,
            ["visible false", "blink true", "visible true", "blink false"]
        );
    }

    #[test]
    fn test_key_modes_forwarded_to_input() {
        let mut term = Terminal::new(10, 2);
        term.process("\x1b[?1h\x1b=");
        assert!(term.application_cursor_mode());
        assert!(term.keypad_application_mode());
        assert_eq!(
            *term.input(),
            KeyboardModes {
                application_cursor: true,
                application_keypad: true
            }
        );

        term.process("\x1b[?1l\x1b>");
        assert_eq!(*term.input(), KeyboardModes::default());
    }

    #[test]
    fn test_charset_and_device_control() {
        let mut term = Terminal::new(10, 2);
        term.process("\x1b(0");
        assert_eq!(term.charset(), Charset::LineDrawing);
        assert!(term.snapshot().modes.line_drawing);
        term.process("\x1b(B\x1bP+q544e\x1b\\");
        assert_eq!(term.charset(), Charset::Ascii);
        assert_eq!(term.last_device_control(), Some("+q544e"));
        assert_eq!(term.screen().row_text(0), "");
    }

    #[test]
    fn test_alternate_screen() {
        let mut term = recording(10, 3);
        term.process("main");

        term.process("\x1b[?1049h");
        assert!(term.is_alternate_screen());
        assert_eq!(term.screen().cursor(), (0, 0));
        assert_eq!(term.screen().row_text(0), "");

        term.process("alt");
        assert_eq!(term.main_screen().row_text(0), "main");

        // Entering again is a no-op
        term.process("\x1b[?1049h");
        assert_eq!(term.screen().row_text(0), "alt");

        term.process("\x1b[?1049l");
        assert!(!term.is_alternate_screen());
        assert_eq!(term.screen().row_text(0), "main");
        assert_eq!(term.screen().cursor(), (4, 0));

        // Leaving again is a no-op
        term.process("\x1b[?1049l");
        assert_eq!(
            term.renderer().events,
            ["alternate true", "alternate false"]
        );
    }

    #[test]
    fn test_resize_on_alternate_screen_reaches_main() {
        let mut term = Terminal::new(10, 3);
        term.process("main\x1b[?1049h\x1b[8;5;20t");
        assert_eq!(term.screen().size(), (20, 5));
        assert_eq!(term.main_screen().size(), (10, 3));

        term.process("\x1b[?1049l");
        assert_eq!(term.screen().size(), (20, 5));
        assert_eq!(term.screen().row_text(0), "main");
        assert_eq!(term.screen().cursor(), (4, 0));
    }

    #[test]
    fn test_window_manipulation() {
        let mut term = recording(10, 3);
        term.process("\x1b[8;4;12t");
        assert_eq!(term.screen().size(), (12, 4));

        for ignored in [
            "\x1b[8;0;20t",
            "\x1b[8;;20t",
            "\x1b[9;4;4t",
            "\x1b[8;99999;4t",
            "\x1b[8;10000;10000t",
            "\x1b[8;1025;1025t",
        ] {
            term.process(ignored);
            assert_eq!(term.screen().size(), (12, 4));
        }
        assert_eq!(term.renderer().events, ["resized 12x4"]);
    }

    #[test]
    fn test_window_size_limit_is_total_cells() {
        let mut term = Terminal::new(10, 3);
        term.process("\x1b[8;1024;1024t");
        assert_eq!(term.screen().size(), (1024, 1024));

        term.process("\x1b[8;1;1048577t");
        assert_eq!(term.screen().size(), (1024, 1024));
    }

    #[test]
    fn test_same_size_window_op_resets_margins() {
        let mut term = recording(10, 5);
        term.process("\x1b[2;4r\x1b[3;2H");
        assert_eq!(
            (term.screen().scroll_top(), term.screen().scroll_bottom()),
            (1, 3)
        );

        term.process("\x1b[8;5;10t");
        assert_eq!(term.screen().size(), (10, 5));
        assert_eq!(
            (term.screen().scroll_top(), term.screen().scroll_bottom()),
            (0, 4)
        );
        assert_eq!(term.screen().cursor(), (1, 2));
        assert!(term.renderer().events.is_empty());
    }

    #[test]
    fn test_refresh_reports_dirty_rows() {
        let mut term = recording(3, 3);
        term.process("a");
        // A fresh screen is entirely dirty
        assert_eq!(term.renderer().refreshes, [vec![0, 1, 2]]);

        term.process("\x1b[2;1Hy");
        assert_eq!(term.renderer().refreshes.last(), Some(&vec![1]));

        term.process("\x1b[H");
        assert_eq!(term.renderer().refreshes.len(), 2);
    }

    #[test]
    fn test_snapshot_carries_terminal_state() {
        let mut term = Terminal::new(4, 2);
        term.process("\x1b]0;t\x07hi\x1b[?25l\x1b[?1h");
        let snapshot = term.snapshot();
        assert_eq!(snapshot.title, "t");
        assert!(!snapshot.cursor.visible);
        assert!(snapshot.modes.application_cursor);
        assert!(!snapshot.alternate_screen);
        assert_eq!(snapshot.to_text(), "hi\n");
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            columns: 7,
            rows: 3,
            escape_wait_length: 40,
            chunk_size: None,
        };
        let mut term = Terminal::from_config(&config);
        assert_eq!(term.screen().size(), (7, 3));
        assert_eq!(term.parser_mut().escape_wait_length(), 40);
    }

    #[test]
    fn test_unknown_sequence_is_printed() {
        let mut term = Terminal::new(30, 2);
        term.process("\x1b[5Sabcdefghijklmnopq");
        assert_eq!(term.screen().row_text(0), "\u{1b}[5Sabcdefghijklmnopq");
    }
}
