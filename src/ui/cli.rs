use crate::ShellError;
use crate::ui::io::IO;

use log::trace;
use std::io::{self, BufRead, Write};

/// Terminal implementation of `IO`: stdin in, stdout out
pub struct Cli {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl Cli {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

impl IO for Cli {
    /// Reads a single line and strips the line terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    fn read_line(&mut self) -> Result<Option<String>, ShellError> {
        let mut line = String::new();
        let read = self
            .stdin
            .lock()
            .read_line(&mut line)
            .map_err(ShellError::StdinReadError)?;
        if read == 0 {
            return Ok(None);
        }

        let line = line.trim_end_matches(['\r', '\n']).to_string();
        trace!("Got input: {line}");
        Ok(Some(line))
    }

    /// Prints the reply and flushes, so piped readers see it right away.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    fn say(&mut self, msg: &str) -> Result<(), ShellError> {
        let mut out = self.stdout.lock();
        writeln!(out, "{msg}").map_err(ShellError::StdoutWriteError)?;
        out.flush().map_err(ShellError::StdoutWriteError)?;
        trace!("Flushed stdout");
        Ok(())
    }
}
