use super::{BackendError, LookupError, Quote, QuoteBackend, QuoteError, Result};
use crate::matches_pattern;
use log::{debug, trace};
use rand::seq::IteratorRandom;
use rand::Rng;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// Stores one quote per line in a plain text file.
///
/// Ids are line positions and get recomputed on every read, so removing a
/// quote shifts every later quote down by one.
#[derive(Debug)]
pub struct LineFileBackend {
    path: PathBuf,
}

impl LineFileBackend {
    /// Creates a new `LineFileBackend`, creating the quote file and its parent directory if missing
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `BackendError::DirectoryCreationError` if the parent directory cannot be created
    /// - `BackendError::FileCreationError` if the file cannot be created
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| QuoteError::Backend(BackendError::DirectoryCreationError(e)))?;
        }

        // Opening in append mode creates the file without touching existing quotes
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| QuoteError::Backend(BackendError::FileCreationError(e)))?;
        debug!("Opened quote file: {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Reads the whole file
    ///
    /// # Errors
    ///
    /// Returns `BackendError::FileReadError` if the file cannot be read or is not UTF-8
    fn read_contents(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .map_err(|e| QuoteError::Backend(BackendError::FileReadError(e)))
    }

    /// Reads every line of the file, without line terminators
    fn read_lines(&self) -> Result<Vec<String>> {
        let lines: Vec<String> = self
            .read_contents()?
            .lines()
            .map(str::to_string)
            .collect();
        trace!("Read {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }
}

/// Turns arbitrary input into exactly one line of text
fn normalize_line(text: &str) -> String {
    text.trim_end_matches(['\r', '\n']).replace(['\r', '\n'], " ")
}

fn position(index: usize) -> u64 {
    u64::try_from(index).unwrap_or(u64::MAX)
}

impl QuoteBackend for LineFileBackend {
    /// Picks one line uniformly at random
    ///
    /// # Errors
    ///
    /// Returns `LookupError::EmptyFile` if the file has no lines
    fn get_random(&self) -> Result<Quote> {
        let lines = self.read_lines()?;
        if lines.is_empty() {
            return Err(LookupError::EmptyFile.into());
        }

        let index = rand::thread_rng().gen_range(0..lines.len());
        Ok(Quote {
            id: position(index),
            text: lines[index].clone(),
        })
    }

    /// Picks one matching line uniformly at random, keeping its position as id
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NoLineMatches` if no line contains the pattern
    fn search(&self, pattern: &str) -> Result<Quote> {
        let lines = self.read_lines()?;
        lines
            .into_iter()
            .enumerate()
            .filter(|(_, line)| matches_pattern(line, pattern))
            .choose(&mut rand::thread_rng())
            .map(|(index, text)| Quote {
                id: position(index),
                text,
            })
            .ok_or_else(|| LookupError::NoLineMatches(pattern.to_string()).into())
    }

    /// Appends the quote as a new last line
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `BackendError::FileReadError` if the current contents cannot be read
    /// - `BackendError::FileWriteError` if appending fails
    fn add(&self, text: &str) -> Result<Quote> {
        let contents = self.read_contents()?;
        let line = normalize_line(text);

        // A hand-edited file might lack the final newline
        let mut data = String::new();
        if !contents.is_empty() && !contents.ends_with('\n') {
            data.push('\n');
        }
        data.push_str(&line);
        data.push('\n');

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| QuoteError::Backend(BackendError::FileWriteError(e)))?;
        file.write_all(data.as_bytes())
            .map_err(|e| QuoteError::Backend(BackendError::FileWriteError(e)))?;
        trace!("Appended line to {}: {}", self.path.display(), &line);

        Ok(Quote {
            id: position(contents.lines().count()),
            text: line,
        })
    }

    /// Removes the line at `id` by rewriting the whole file
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `LookupError::OutOfRange` if there is no line at that position
    /// - `BackendError::FileWriteError` if the file cannot be rewritten
    ///
    /// Untouched lines are written back byte for byte, CRLF endings included
    fn remove(&self, id: u64) -> Result<()> {
        let contents = self.read_contents()?;
        // Same line boundaries as `str::lines`, but each entry keeps its own terminator
        let mut lines: Vec<&str> = contents.split_inclusive('\n').collect();
        let index = usize::try_from(id)
            .ok()
            .filter(|index| *index < lines.len())
            .ok_or(LookupError::OutOfRange(id))?;

        let removed = lines.remove(index);
        fs::write(&self.path, lines.concat())
            .map_err(|e| QuoteError::Backend(BackendError::FileWriteError(e)))?;
        debug!(
            "Removed line {index} from {}: {}",
            self.path.display(),
            removed.trim_end_matches(['\r', '\n'])
        );
        Ok(())
    }

    /// Returns the line currently at position `id`
    ///
    /// # Errors
    ///
    /// Returns `LookupError::OutOfRange` if `id` is not below the line count
    fn get_by_id(&self, id: u64) -> Result<Quote> {
        let lines = self.read_lines()?;
        usize::try_from(id)
            .ok()
            .and_then(|index| lines.into_iter().nth(index))
            .map(|text| Quote { id, text })
            .ok_or_else(|| LookupError::OutOfRange(id).into())
    }
}
