//! Line-oriented command protocol.
//!
//! Each line holds one whitespace-separated command:
//!
//! | Line | Operation | Reply |
//! |------|-----------|-------|
//! | `I <sid> <subject> <name> <semester> <phone> <timestamp>` | [`OrderedIndex::insert_or_update`] | `<depth> <0\|1>` |
//! | `L <sid>` | [`OrderedIndex::list_student`] | `<subject> <color> ...` or `No records found` |
//! | `C <subject>` | [`OrderedIndex::count_subject`] | `<count> <depth sum>` |
//! | `M <subject> <k>` | [`OrderedIndex::top_k_by_timestamp`] | `<sid> <color> ...`, possibly empty |
//!
//! # Examples
//!
//! ```
//! use roster_tree::OrderedIndex;
//! use roster_tree::command::Command;
//!
//! let mut index = OrderedIndex::new();
//! for line in ["I 1 Math Kim 3 010-1234-5678 100", "I 1 CS Kim 3 010-1234-5678 50", "L 1", "C Math"] {
//!     let command = Command::parse(line).unwrap();
//!     println!("{}", index.execute(command));
//! }
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::num::ParseIntError;
use core::str::{FromStr, SplitWhitespace};

use thiserror::Error;

use crate::{InsertOutcome, Key, OrderedIndex, RankedEntry, Registration, StudentEntry, SubjectCount};

/// A parsed command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// `I`: insert a registration or refresh its timestamp.
    Insert { key: Key, registration: Registration },
    /// `L`: list a student's subjects.
    List { student_id: i32 },
    /// `C`: count a subject's records and sum their depths.
    Count { subject: String },
    /// `M`: the `k` earliest registrations for a subject.
    TopK { subject: String, k: usize },
}

/// Why a command line could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
    #[error("invalid integer `{value}` for `{name}`")]
    InvalidInteger {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unexpected trailing argument `{0}`")]
    TrailingArgument(String),
}

/// Pulls named arguments off a command line.
struct Arguments<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> Arguments<'a> {
    fn text(&mut self, name: &'static str) -> Result<&'a str, ParseError> {
        self.tokens.next().ok_or(ParseError::MissingArgument(name))
    }

    fn integer<T: FromStr<Err = ParseIntError>>(&mut self, name: &'static str) -> Result<T, ParseError> {
        let value = self.text(name)?;
        value.parse().map_err(|source| ParseError::InvalidInteger {
            name,
            value: value.to_string(),
            source,
        })
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.tokens.next() {
            Some(extra) => Err(ParseError::TrailingArgument(extra.to_string())),
            None => Ok(()),
        }
    }
}

impl Command {
    /// Parses one command line.
    ///
    /// A negative `k` for `M` is accepted and clamps to zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for blank lines, unknown command letters,
    /// missing or non-integer arguments, and extra arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::command::{Command, ParseError};
    ///
    /// assert_eq!(Command::parse("L 42"), Ok(Command::List { student_id: 42 }));
    /// assert_eq!(
    ///     Command::parse("M Math -3"),
    ///     Ok(Command::TopK { subject: "Math".into(), k: 0 })
    /// );
    /// assert_eq!(Command::parse("C"), Err(ParseError::MissingArgument("subject")));
    /// ```
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(ParseError::Empty)?;
        let mut args = Arguments { tokens };

        let command = match name {
            "I" => {
                let student_id = args.integer("sid")?;
                let subject = args.text("subject")?;
                let student_name = args.text("name")?;
                let semester = args.integer("semester")?;
                let phone = args.text("phone")?;
                let timestamp = args.integer("timestamp")?;
                Command::Insert {
                    key: Key::new(student_id, subject),
                    registration: Registration::new(student_name, semester, phone, timestamp),
                }
            }
            "L" => Command::List {
                student_id: args.integer("sid")?,
            },
            "C" => Command::Count {
                subject: args.text("subject")?.to_string(),
            },
            "M" => {
                let subject = args.text("subject")?.to_string();
                let k: i64 = args.integer("k")?;
                Command::TopK {
                    subject,
                    k: usize::try_from(k.max(0)).unwrap_or(usize::MAX),
                }
            }
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };

        args.finish()?;
        Ok(command)
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, ParseError> {
        Command::parse(line)
    }
}

/// The result of running a [`Command`]. Its `Display` form is the reply line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    Inserted(InsertOutcome),
    Listed(Vec<StudentEntry>),
    Counted(SubjectCount),
    Ranked(Vec<RankedEntry>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Inserted(outcome) => write!(f, "{} {}", outcome.depth, u8::from(outcome.updated)),
            Reply::Listed(entries) if entries.is_empty() => f.write_str("No records found"),
            Reply::Listed(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{} {}", entry.subject, entry.color)?;
                }
                Ok(())
            }
            Reply::Counted(count) => write!(f, "{} {}", count.count, count.depth_sum),
            Reply::Ranked(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{} {}", entry.student_id, entry.color)?;
                }
                Ok(())
            }
        }
    }
}

impl OrderedIndex {
    /// Runs a parsed [`Command`] against the index.
    pub fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Insert { key, registration } => Reply::Inserted(self.insert_or_update(key, registration)),
            Command::List { student_id } => Reply::Listed(self.list_student(student_id)),
            Command::Count { subject } => Reply::Counted(self.count_subject(&subject)),
            Command::TopK { subject, k } => Reply::Ranked(self.top_k_by_timestamp(&subject, k)),
        }
    }
}
