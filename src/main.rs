//! `roster` command loop.
//!
//! Reads one command per line and writes one reply line per command.
//!
//! # Usage
//!
//! ```bash
//! # Commands from stdin; an optional first line holds the command count.
//! printf '3\nI 1 Math Kim 3 010-1234-5678 100\nL 1\nC Math\n' | roster
//!
//! # Commands from a file, checking tree invariants after every insert
//! roster --input commands.txt --validate
//!
//! # Trace every fixup case on stderr
//! RUST_LOG=roster_tree=trace roster --input commands.txt
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use roster_tree::command::{Command, Reply};
use roster_tree::{InvariantViolation, OrderedIndex};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line configuration.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Red-black index of course registrations")]
struct Cli {
    /// Read commands from this file instead of stdin.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, env = "ROSTER_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Number of records to preallocate.
    #[arg(long, default_value_t = 0)]
    capacity: usize,

    /// Check every tree invariant after each insert.
    #[arg(long)]
    validate: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Invariant { line: usize, source: InvariantViolation },
}

fn init_logging(cli: &Cli) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(io::stderr).init();
}

/// Returns the command count if `line` is a lone integer.
fn command_count(line: &str) -> Option<usize> {
    let mut tokens = line.split_whitespace();
    let count = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some(count)
}

fn run(cli: &Cli, input: impl BufRead, mut output: impl Write) -> Result<(), AppError> {
    let mut index = OrderedIndex::with_capacity(cli.capacity);
    let mut limit: Option<usize> = None;
    let mut first = true;
    let mut executed = 0usize;

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        if line.trim().is_empty() {
            continue;
        }

        if first {
            first = false;
            if let Some(count) = command_count(&line) {
                debug!(count, "command count header");
                limit = Some(count);
                continue;
            }
        }
        if limit.is_some_and(|limit| executed >= limit) {
            info!(line = number, "command count reached, ignoring the rest of the input");
            break;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(error) => {
                warn!(line = number, %error, "skipping malformed command");
                continue;
            }
        };

        let reply = index.execute(command);
        if cli.validate && matches!(reply, Reply::Inserted(_)) {
            index
                .validate()
                .map_err(|source| AppError::Invariant { line: number, source })?;
        }
        writeln!(output, "{reply}")?;
        executed += 1;
    }

    output.flush()?;
    info!(executed, records = index.len(), "done");
    Ok(())
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(&cli);

    let stdout = BufWriter::new(io::stdout().lock());
    match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| AppError::Open {
                path: path.clone(),
                source,
            })?;
            run(&cli, BufReader::new(file), stdout)
        }
        None => run(&cli, io::stdin().lock(), stdout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli() -> Cli {
        Cli {
            input: None,
            log_level: "warn".to_string(),
            capacity: 4,
            validate: true,
        }
    }

    fn run_to_string(input: &str) -> String {
        let mut output = Vec::new();
        run(&cli(), input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn command_count_header() {
        assert_eq!(command_count("3"), Some(3));
        assert_eq!(command_count(" 12 "), Some(12));
        assert_eq!(command_count("L 3"), None);
        assert_eq!(command_count("3 4"), None);
    }

    #[test]
    fn runs_commands_with_header() {
        let input = "5\n\
                     I 1 Math Kim 3 010-1111-1111 100\n\
                     I 1 CS Kim 3 010-1111-1111 50\n\
                     I 2 Math Lee 1 010-2222-2222 10\n\
                     L 1\n\
                     M Math 1\n\
                     C Math\n";
        // The header limits processing to five commands.
        assert_eq!(run_to_string(input), "0 0\n1 0\n1 0\nCS R Math B\n2 R\n");
    }

    #[test]
    fn skips_malformed_lines() {
        let input = "L 7\n\nX nonsense\nI 7 Art Choi 2 010 3\nL 7\nM Art -2\n";
        assert_eq!(run_to_string(input), "No records found\n0 0\nArt B\n\n");
    }
}
