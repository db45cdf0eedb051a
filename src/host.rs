//! Host collaborators
//!
//! The terminal talks to the outside world through three narrow traits:
//! a [`Source`] that receives replies bound for the host process, a
//! [`Renderer`] that observes state changes and an [`Input`] that encodes
//! keystrokes and needs to know which key modes are active. Each trait
//! has one in-memory adapter used by the headless binary and the tests.

use crate::core::ScreenBuffer;

/// Sink for bytes travelling back to the host process
pub trait Source {
    /// Write a reply such as a cursor position report
    fn write(&mut self, data: &str);
}

/// Observer of terminal state changes. Every method defaults to a no-op.
pub trait Renderer {
    /// Rows of `screen` changed since the previous refresh
    fn refresh(&mut self, _screen: &ScreenBuffer, _dirty_rows: &[usize]) {}

    /// The active screen now has a new size
    fn resized(&mut self, _cols: usize, _rows: usize) {}

    /// The alternate screen was entered (`true`) or left
    fn screen_switched(&mut self, _alternate: bool) {}

    fn cursor_visibility_changed(&mut self, _visible: bool) {}

    fn cursor_blink_changed(&mut self, _blinking: bool) {}

    fn title_changed(&mut self, _title: &str) {}

    fn bell(&mut self) {}
}

/// Keyboard encoder state that depends on terminal modes
pub trait Input {
    /// DECCKM: cursor keys send `ESC O x` instead of `ESC [ x`
    fn set_application_cursor_mode(&mut self, enabled: bool);

    /// DECKPAM / DECKPNM
    fn set_keypad_application_mode(&mut self, _enabled: bool) {}
}

/// Collects replies in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyBuffer {
    data: String,
}

impl ReplyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the collected replies and clear the buffer
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.data)
    }
}

impl Source for ReplyBuffer {
    fn write(&mut self, data: &str) {
        self.data.push_str(data);
    }
}

/// Renderer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}

/// Records the key modes the terminal requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardModes {
    pub application_cursor: bool,
    pub application_keypad: bool,
}

impl Input for KeyboardModes {
    fn set_application_cursor_mode(&mut self, enabled: bool) {
        self.application_cursor = enabled;
    }

    fn set_keypad_application_mode(&mut self, enabled: bool) {
        self.application_keypad = enabled;
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn write(&mut self, data: &str) {
        (**self).write(data);
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn write(&mut self, data: &str) {
        (**self).write(data);
    }
}
