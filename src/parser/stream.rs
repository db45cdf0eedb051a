//! Streaming tokenizer
//!
//! Input arrives in arbitrary chunks, so a control sequence may be split
//! across two deliveries. The parser keeps a carry-over buffer: when the
//! tail of the buffer holds an escape byte that does not start a complete
//! sequence yet, everything from that byte on waits for the next chunk.
//!
//! Only a short tail is held back. An escape byte further than
//! `escape_wait_length` bytes from the end of the buffer is treated as
//! plain text, which keeps a stray ESC from stalling output indefinitely.

use std::fmt;

use super::actions::Token;
use super::patterns::{self, ESC};

/// Default number of trailing bytes that may be held back
pub const DEFAULT_ESCAPE_WAIT_LENGTH: usize = 10;

type Handler = Box<dyn FnMut(&Token)>;

/// Splits a character stream into text runs and control commands
pub struct ControlParser {
    /// Data not yet tokenized
    buffer: String,
    escape_wait_length: usize,
    handlers: Vec<Handler>,
}

impl Default for ControlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ControlParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlParser")
            .field("buffer", &self.buffer)
            .field("escape_wait_length", &self.escape_wait_length)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl ControlParser {
    pub fn new() -> Self {
        Self::with_escape_wait_length(DEFAULT_ESCAPE_WAIT_LENGTH)
    }

    /// Create a parser that holds back at most `length` trailing bytes
    pub fn with_escape_wait_length(length: usize) -> Self {
        Self {
            buffer: String::new(),
            escape_wait_length: length,
            handlers: Vec::new(),
        }
    }

    pub fn escape_wait_length(&self) -> usize {
        self.escape_wait_length
    }

    /// Register a callback invoked for every token, in stream order
    pub fn on_token<F>(&mut self, handler: F)
    where
        F: FnMut(&Token) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Data held back waiting for the rest of a sequence
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Append a chunk and notify the registered handlers of every token it
    /// completes.
    pub fn push_data(&mut self, chunk: &str) {
        self.feed(chunk);
    }

    /// Append a chunk and return the tokens it completes. Registered
    /// handlers are notified as well.
    pub fn feed(&mut self, chunk: &str) -> Vec<Token> {
        self.buffer.push_str(chunk);
        let tokens = self.tokenize();
        self.notify(&tokens);
        tokens
    }

    /// Emit any held-back data as text
    pub fn flush(&mut self) -> Vec<Token> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        tracing::trace!("flushing {} held bytes", self.buffer.len());
        let tokens = vec![Token::Text(std::mem::take(&mut self.buffer))];
        self.notify(&tokens);
        tokens
    }

    /// Drop held-back data without emitting it
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    fn notify(&mut self, tokens: &[Token]) {
        for token in tokens {
            for handler in &mut self.handlers {
                handler(token);
            }
        }
    }

    fn tokenize(&mut self) -> Vec<Token> {
        let data = std::mem::take(&mut self.buffer);
        let bytes = data.as_bytes();
        let mut tokens = Vec::new();
        let mut text_start = 0;
        let mut pos = 0;

        while pos < bytes.len() {
            if patterns::is_introducer(bytes[pos]) {
                if let Some((command, len)) = patterns::match_at(&data[pos..]) {
                    push_text(&mut tokens, &data[text_start..pos]);
                    tokens.push(Token::Command(command));
                    pos += len;
                    text_start = pos;
                    continue;
                }
            }
            pos += 1;
        }

        // Nothing in the remainder matches. Hold the tail if it may be the
        // start of a sequence that is still arriving.
        let window = bytes.len().saturating_sub(self.escape_wait_length).max(text_start);
        let held_from = bytes[window..]
            .iter()
            .position(|&b| b == ESC)
            .map(|offset| window + offset);

        match held_from {
            Some(esc) => {
                push_text(&mut tokens, &data[text_start..esc]);
                self.buffer.push_str(&data[esc..]);
                tracing::trace!("holding {} bytes for the next chunk", self.buffer.len());
            }
            None => push_text(&mut tokens, &data[text_start..]),
        }

        tokens
    }
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if !text.is_empty() {
        tokens.push(Token::Text(text.to_string()));
    }
}
