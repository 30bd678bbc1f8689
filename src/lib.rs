#![deny(clippy::cargo)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::nursery)]
#![deny(clippy::perf)]
#![deny(clippy::style)]
#![deny(clippy::suspicious)]
#![deny(clippy::pedantic)]

use std::{fmt, io, path::PathBuf};
use thiserror::Error;

pub mod app;
pub mod backends;
pub mod setup;
pub mod ui;

// More convenient Result type
pub type Result<T> = std::result::Result<T, QuoteError>;

/// A stored quote together with the id it is addressed by.
///
/// For the line file backend `id` is the current line index, for the `SQLite`
/// backend it is the row id assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub id: u64,
    pub text: String,
}

// Rendered as `[3] some quote`
impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.text)
    }
}

/// Trait to be implemented by all backends that store quotes
pub trait QuoteBackend {
    /// Picks one quote uniformly at random
    ///
    /// # Errors
    ///
    /// Returns a `LookupError` if the store is empty, or a `BackendError` if it can't be read
    fn get_random(&self) -> Result<Quote>;

    /// Picks one quote uniformly at random among those containing `pattern`, ignoring case
    ///
    /// # Errors
    ///
    /// Returns a `LookupError` if nothing matches, or a `BackendError` if the store can't be read
    fn search(&self, pattern: &str) -> Result<Quote>;

    /// Stores a new quote and returns it with its id
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` if the quote could not be written
    fn add(&self, text: &str) -> Result<Quote>;

    /// Deletes the quote with the given id
    ///
    /// # Errors
    ///
    /// Returns an error if the id is out of range (where the backend checks) or the deletion fails
    fn remove(&self, id: u64) -> Result<()>;

    /// Fetches a single quote by id
    ///
    /// # Errors
    ///
    /// Returns a `LookupError` if no quote has this id, or a `BackendError` if the query fails
    fn get_by_id(&self, id: u64) -> Result<Quote>;
}

/// Case-insensitive substring match shared by every backend
#[must_use]
pub fn matches_pattern(text: &str, pattern: &str) -> bool {
    text.to_lowercase().contains(&pattern.to_lowercase())
}

// Enum for everything a dispatched command can fail with.
// All of these end up as the reply text, none of them are fatal
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

// Enum for all possible command parsing and argument validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid number of arguments")]
    InvalidArgumentCount,

    #[error("command argument must be valid integer: {0}")]
    InvalidInteger(String),

    #[error("command argument must be non-negative: {0}")]
    NegativeInteger(String),

    #[error("invalid subcommand: {0}")]
    UnknownSubcommand(String),
}

// Enum for lookups that found nothing. Wording differs per backend
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("empty file.")]
    EmptyFile,

    #[error("there are no quotes in the database.")]
    EmptyDatabase,

    #[error("no matches found for search phrase: {0}")]
    NoLineMatches(String),

    #[error("there are no quotes in the database that match pattern = {0}.")]
    NoRowMatches(String),

    #[error("command argument exceeds number of lines in file")]
    OutOfRange(u64),

    #[error("there was no quote in the database with id = {0}.")]
    NotFound(u64),
}

// Enum for all possible storage errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed opening quote database: {0}")]
    DatabaseOpenError(rusqlite::Error),

    #[error("failed creating `quotes` table in database")]
    TableCreationError,

    #[error("failed creating directory for quotes: {0}")]
    DirectoryCreationError(io::Error),

    #[error("failed creating quote file: {0}")]
    FileCreationError(io::Error),

    #[error("failed writing quotes to file: {0}")]
    FileWriteError(io::Error),

    #[error("failed reading quotes from file: {0}")]
    FileReadError(io::Error),

    #[error("database is locked or busy")]
    DatabaseBusy,

    #[error("insufficient permissions")]
    PermissionDenied,

    #[error("database file is not a valid SQLite database")]
    NotADatabase,

    #[error(transparent)]
    Other(#[from] anyhow::Error), // Used as fallback
}

// Enum for all possible terminal I/O errors of the host shell
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to read from stdin: {0}")]
    StdinReadError(io::Error),

    #[error("failed writing to stdout: {0}")]
    StdoutWriteError(io::Error),
}

// Fatal errors raised while resolving where quotes live.
// These are returned to the host instead of being rendered as replies
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required quote setting: {0}")]
    Missing(&'static str),

    #[error("unknown datasource set in config: {0}")]
    UnknownDatasource(String),

    #[error("failed reading config file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
}
