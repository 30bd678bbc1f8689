use crate::backends::Store;
use crate::setup::config::QuoteConfig;
use crate::{CommandError, ConfigError, QuoteBackend, Result};
use log::{debug, warn};

/// A parsed quote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Random,
    Add(String),
    Remove(u64),
    Show(u64),
    Search(String),
}

impl Command {
    /// Parses the text following the trigger word.
    ///
    /// Nothing at all means a random quote. Otherwise the text is split at the
    /// first space into a subcommand and its payload. Ids are validated here so
    /// a bad id never reaches the store.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `CommandError::InvalidArgumentCount` if there is a subcommand without payload
    /// - `CommandError::InvalidInteger` / `NegativeInteger` for bad ids, in that order
    /// - `CommandError::UnknownSubcommand` for anything else
    pub fn parse(raw: Option<&str>) -> std::result::Result<Self, CommandError> {
        // Only leading whitespace goes; payloads are kept as typed
        let Some(raw) = raw.map(str::trim_start).filter(|r| !r.is_empty()) else {
            return Ok(Self::Random);
        };

        let (subcommand, payload) = raw
            .split_once(' ')
            .ok_or(CommandError::InvalidArgumentCount)?;

        match subcommand {
            "add" => Ok(Self::Add(payload.to_string())),
            "delete" | "remove" => Ok(Self::Remove(parse_id(payload)?)),
            "show" => Ok(Self::Show(parse_id(payload)?)),
            "search" | "find" => Ok(Self::Search(payload.to_string())),
            other => Err(CommandError::UnknownSubcommand(other.to_string())),
        }
    }
}

// Validate that an id is an integer, then that it isn't negative.
// Integers of any length are accepted; ids beyond u64 saturate and miss in every store
fn parse_id(payload: &str) -> std::result::Result<u64, CommandError> {
    let payload = payload.trim();
    let (negative, digits) = match payload.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, payload.strip_prefix('+').unwrap_or(payload)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::InvalidInteger(payload.to_string()));
    }

    let magnitude = digits.trim_start_matches('0');
    if magnitude.is_empty() {
        return Ok(0);
    }
    if negative {
        return Err(CommandError::NegativeInteger(format!("-{magnitude}")));
    }
    Ok(magnitude.parse().unwrap_or(u64::MAX))
}

/// Routes parsed commands to a quote store and renders the reply
pub struct QuoteService<B: QuoteBackend = Store> {
    pub repo: B,
}

impl<B: QuoteBackend> QuoteService<B> {
    pub const fn new(repo: B) -> Self {
        Self { repo }
    }

    /// Runs one command against the store and returns the reply text.
    /// Failures are rendered as their message, so this always produces a line to send back.
    pub fn handle(&self, raw: Option<&str>) -> String {
        match self.execute(raw) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Quote command failed: {e}");
                e.to_string()
            }
        }
    }

    /// Parses and executes one command
    ///
    /// # Errors
    ///
    /// Returns any `CommandError`, `LookupError` or `BackendError` raised on the way
    pub fn execute(&self, raw: Option<&str>) -> Result<String> {
        let command = Command::parse(raw)?;
        debug!("Dispatching {command:?}");

        match command {
            Command::Random => Ok(self.repo.get_random()?.to_string()),
            Command::Add(text) => {
                let quote = self.repo.add(&text)?;
                Ok(format!("quote added: {}.", quote.text))
            }
            Command::Remove(id) => {
                self.repo.remove(id)?;
                Ok(format!("deleted quote #{id}."))
            }
            Command::Show(id) => Ok(self.repo.get_by_id(id)?.to_string()),
            Command::Search(pattern) => Ok(self.repo.search(&pattern)?.to_string()),
        }
    }
}

/// Handles one quote command coming from `channel`, the way a chat host would.
///
/// The store is opened for this command only. Problems opening it are
/// reported in the reply like any other failure.
///
/// # Errors
///
/// Returns a `ConfigError` if no store can be resolved for the channel
pub fn respond(
    config: &QuoteConfig,
    channel: Option<&str>,
    raw: Option<&str>,
) -> std::result::Result<String, ConfigError> {
    let location = config.locate(channel)?;

    let reply = match Store::open(&location) {
        Ok(store) => QuoteService::new(store).handle(raw),
        Err(e) => {
            warn!("Failed opening quote store {}: {e}", location.path.display());
            e.to_string()
        }
    };
    Ok(reply)
}
