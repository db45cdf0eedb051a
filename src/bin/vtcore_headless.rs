//! Headless terminal runner
//!
//! Reads a byte stream from a file or stdin, feeds it through the terminal
//! core and prints the resulting screen as a JSON snapshot or plain text.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vtcore::config::{CliArgs, Config};
use vtcore::{Result, Terminal};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let config = Config::load_with_args(args)?;
    let input = read_input(args.input.as_deref())?;

    let mut terminal = Terminal::from_config(&config);
    match config.chunk_size {
        Some(size) => {
            for chunk in chunks(&input, size) {
                terminal.process(chunk);
            }
        }
        None => terminal.process(&input),
    }
    terminal.flush();

    let snapshot = terminal.snapshot();
    let mut stdout = io::stdout().lock();
    if args.text {
        write!(stdout, "{}", snapshot.to_text())?;
    } else {
        writeln!(stdout, "{}", snapshot.to_json()?)?;
    }
    if args.replies {
        writeln!(stdout, "replies: {}", terminal.take_replies().escape_debug())?;
    }

    Ok(())
}

/// Read the whole input, replacing invalid UTF-8
fn read_input(path: Option<&Path>) -> io::Result<String> {
    let data = match path {
        Some(path) => fs::read(path)?,
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            data
        }
    };
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Split `text` into pieces of at most `size` characters
fn chunks(text: &str, size: usize) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = rest
            .char_indices()
            .nth(size)
            .map_or(rest.len(), |(index, _)| index);
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}
