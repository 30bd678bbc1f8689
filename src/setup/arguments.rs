use crate::ConfigError;
use crate::setup::config::{QuoteConfig, QuoteSection};

use clap::{Parser, Subcommand};
use log::debug;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
pub struct Args {
    /// Host config file with a `[quote]` table
    #[arg(short, long, env = "QUOTEBOT_CONFIG")]
    config: Option<PathBuf>,
    /// Channel the command comes from, e.g. `#rust`
    #[arg(long, env = "QUOTEBOT_CHANNEL")]
    channel: Option<String>,
    /// `file` or `sqlite`
    #[arg(short, long)]
    datasource: Option<String>,
    /// Base name of the quote file, without extension
    #[arg(short, long)]
    filename: Option<String>,
    /// Keep every channel's quotes in one store
    #[arg(long)]
    onefile: bool,
    /// Directory holding the quote files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Run a single quote command and print the reply
    Say {
        /// Command text, e.g. `add hello world`. Empty shows a random quote
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Read chat lines from stdin and answer the ones starting with the trigger
    Shell {
        #[arg(short, long, default_value = ".quote")]
        trigger: String,
    },
}

/// Everything the host needs to run
#[derive(Debug)]
pub struct Invocation {
    pub config: QuoteConfig,
    pub channel: Option<String>,
    pub mode: Mode,
}

impl Args {
    /// Settings given as flags. Unset flags leave the config file value alone
    fn overrides(&self) -> QuoteSection {
        QuoteSection {
            datasource: self.datasource.clone(),
            filename: self.filename.clone(),
            onefile: self.onefile.then_some(true),
            data_dir: self.data_dir.clone(),
        }
    }

    /// Merges the config file (if any) with the flags and validates the result
    ///
    /// # Errors
    ///
    /// Forwards `ConfigError` from loading or resolving the settings
    pub fn into_invocation(self) -> Result<Invocation, ConfigError> {
        let file = match &self.config {
            Some(path) => QuoteSection::load(path)?,
            None => QuoteSection::default(),
        };
        let config = file.merge(self.overrides()).resolve()?;
        debug!("Using quote config: {:?}", &config);

        Ok(Invocation {
            config,
            channel: self.channel,
            mode: self.mode,
        })
    }
}

/// Parses command-line arguments and resolves the quote settings
///
/// # Errors
///
/// Returns a `ConfigError` if the config file can't be loaded or a setting is invalid
pub fn handle_args() -> Result<Invocation, ConfigError> {
    Args::parse().into_invocation()
}
