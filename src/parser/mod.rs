//! Control sequence parser
//!
//! Turns a chunked character stream into [`Token`]s: runs of printable text
//! and recognized VT100/xterm control sequences. Sequences split across
//! chunks are reassembled through a small carry-over buffer.

mod actions;
mod patterns;
mod stream;

pub use actions::{Command, CursorMotion, Mode, Token};
pub use stream::{ControlParser, DEFAULT_ESCAPE_WAIT_LENGTH};
