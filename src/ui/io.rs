use crate::ShellError;
use crate::app::respond;
use crate::setup::arguments::{self, Mode};
use crate::setup::config::QuoteConfig;
use crate::setup::logging;
use crate::ui::cli::Cli;

use log::{error, info, trace};

/// Abstraction for the chat side of the host: lines come in, replies go out
pub trait IO {
    /// Read one line without its terminator. `None` once input is exhausted
    ///
    /// # Errors
    ///
    /// Returns `ShellError::StdinReadError` if reading fails
    fn read_line(&mut self) -> Result<Option<String>, ShellError>;

    /// Send one reply line back
    ///
    /// # Errors
    ///
    /// Returns `ShellError::StdoutWriteError` if writing fails
    fn say(&mut self, msg: &str) -> Result<(), ShellError>;
}

/// Load `.env`, initialize logging, parse args and run the chosen mode
///
/// # Errors
///
/// Returns configuration errors and terminal I/O errors. Failed quote
/// commands are replies, not errors
pub fn run() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::setup_log();

    let invocation = arguments::handle_args().inspect_err(|e| error!("{e}"))?;
    let channel = invocation.channel.as_deref();
    let mut io = Cli::new();

    match invocation.mode {
        Mode::Say { args } => {
            let raw = args.join(" ");
            let reply = respond(&invocation.config, channel, Some(&raw))
                .inspect_err(|e| error!("{e}"))?;
            io.say(&reply)?;
        }
        Mode::Shell { trigger } => shell(&mut io, &invocation.config, channel, &trigger)?,
    }
    Ok(())
}

/// Answers every line that starts with `trigger` until `exit`, `quit` or end of input
///
/// # Errors
///
/// Stops at the first configuration or terminal I/O error
pub fn shell(
    io: &mut impl IO,
    config: &QuoteConfig,
    channel: Option<&str>,
    trigger: &str,
) -> anyhow::Result<()> {
    info!("Answering '{trigger}' commands from stdin");

    while let Some(line) = io.read_line()? {
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        let line = line.trim_start();

        let Some(raw) = trigger_args(line, trigger) else {
            trace!("Ignoring line: {line}");
            continue;
        };
        let reply = respond(config, channel, Some(raw)).inspect_err(|e| error!("{e}"))?;
        io.say(&reply)?;
    }

    info!("Input closed, leaving shell");
    Ok(())
}

/// Returns the text after the trigger word, or `None` if the line isn't a quote command
fn trigger_args<'a>(line: &'a str, trigger: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(trigger)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        // `.quotes` is not `.quote`
        rest.strip_prefix(' ')
    }
}
