//! Configuration for the headless terminal
//!
//! Settings are resolved in this order (later wins):
//! 1. Built-in defaults
//! 2. JSON config file
//! 3. Environment variables (`VTCORE_*`)
//! 4. Command-line arguments

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::core::MAX_SCREEN_CELLS;
use crate::error::ConfigError;
use crate::parser::DEFAULT_ESCAPE_WAIT_LENGTH;

/// CLI arguments for the headless runner
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vtcore-headless")]
#[command(version)]
#[command(about = "Feed a byte stream through the terminal core and print the resulting screen", long_about = None)]
pub struct CliArgs {
    /// Input file; standard input when omitted
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Path to a JSON config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Screen width in columns
    #[arg(long, value_name = "COLS")]
    pub columns: Option<usize>,

    /// Screen height in rows
    #[arg(long, value_name = "ROWS")]
    pub rows: Option<usize>,

    /// Trailing bytes held back while waiting for a split sequence
    #[arg(long, value_name = "BYTES")]
    pub escape_wait: Option<usize>,

    /// Feed the input in chunks of this many characters
    #[arg(long, value_name = "CHARS")]
    pub chunk_size: Option<usize>,

    /// Print the screen as plain text instead of a JSON snapshot
    #[arg(long)]
    pub text: bool,

    /// Also print replies sent back to the host
    #[arg(long)]
    pub replies: bool,

    /// Log filter, e.g. `debug` or `vtcore=trace`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen width in columns
    pub columns: usize,
    /// Screen height in rows
    pub rows: usize,
    /// Trailing bytes the parser may hold back for a split sequence
    pub escape_wait_length: usize,
    /// Split the input into chunks of this many characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 24,
            escape_wait_length: DEFAULT_ESCAPE_WAIT_LENGTH,
            chunk_size: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the configuration for a run: defaults, then the config file
    /// named on the command line, then the environment, then the CLI flags.
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Config::default(),
        };

        config.apply_env_vars();
        config.apply_cli_args(args);
        config.validate()?;

        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        self.apply_env_with(|key| env::var(key).ok());
    }

    /// Apply `VTCORE_*` overrides read through `lookup`. Values that do not
    /// parse are ignored with a warning.
    fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Option<usize> {
            let value = lookup(key)?;
            match value.trim().parse() {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!("ignoring {}={:?}: {}", key, value, e);
                    None
                }
            }
        };

        if let Some(columns) = read("VTCORE_COLUMNS") {
            self.columns = columns;
        }
        if let Some(rows) = read("VTCORE_ROWS") {
            self.rows = rows;
        }
        if let Some(wait) = read("VTCORE_ESCAPE_WAIT") {
            self.escape_wait_length = wait;
        }
    }

    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(columns) = args.columns {
            self.columns = columns;
        }
        if let Some(rows) = args.rows {
            self.rows = rows;
        }
        if let Some(wait) = args.escape_wait {
            self.escape_wait_length = wait;
        }
        if let Some(chunk_size) = args.chunk_size {
            self.chunk_size = Some(chunk_size);
        }
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::invalid("columns", "must be at least 1"));
        }
        if self.rows == 0 {
            return Err(ConfigError::invalid("rows", "must be at least 1"));
        }
        if self.columns.saturating_mul(self.rows) > MAX_SCREEN_CELLS {
            return Err(ConfigError::invalid(
                "columns",
                format!(
                    "{}x{} exceeds {} cells",
                    self.columns, self.rows, MAX_SCREEN_CELLS
                ),
            ));
        }
        if self.escape_wait_length == 0 {
            return Err(ConfigError::invalid(
                "escape_wait_length",
                "must be at least 1",
            ));
        }
        if self.chunk_size == Some(0) {
            return Err(ConfigError::invalid("chunk_size", "must be at least 1"));
        }
        Ok(())
    }
}
