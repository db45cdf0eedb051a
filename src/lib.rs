//! vtcore: a VT100/ANSI terminal emulator core
//!
//! Decodes the character stream a host process writes to its terminal and
//! maintains the resulting screen state. Rendering, keyboard encoding and
//! transport stay outside the crate behind the traits in [`host`].
//!
//! - `parser`: streaming control sequence tokenizer
//! - `core`: cells, screen buffer, SGR decoding and snapshots
//! - `terminal`: the state machine tying parser and screens together
//! - `host`: collaborator traits and in-memory adapters
//! - `config`: settings for the headless runner

pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod parser;
pub mod terminal;

pub use crate::config::Config;
pub use crate::error::{ConfigError, Error, Result};
pub use crate::terminal::{Charset, Terminal};
