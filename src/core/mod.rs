//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Cell representation with its graphic rendition
//! - Screen buffer (grid, cursor, scroll margins)
//! - SGR decoding
//! - Deterministic snapshot generation
//!
//! The core is deterministic: given the same sequence of operations, it will
//! always produce the same state.

mod cell;
mod screen;
pub mod sgr;
mod snapshot;

pub use cell::{Blink, Cell, Color, Intensity, TextStyle};
pub use screen::{Row, ScreenBuffer, MAX_SCREEN_CELLS};
pub use sgr::{apply_sgr, decode_8bit_color};
pub use snapshot::{CellSnapshot, ColorSnapshot, CursorSnapshot, ModesSnapshot, Snapshot, StyleSnapshot};
