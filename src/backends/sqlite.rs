use super::{BackendError, LookupError, Quote, QuoteBackend, QuoteError, Result};
use crate::matches_pattern;
use log::{debug, trace};
use rand::seq::IteratorRandom;
use rusqlite::{
    params, types::Type, Connection, Error as SqliteError, ErrorCode, OptionalExtension, Row,
};
use std::{fs, path::Path};

#[derive(Debug)]
pub struct SqliteBackend {
    connection: Connection,
}

impl SqliteBackend {
    /// Creates a new `SqliteBackend` by opening the `SQLite` database at the given path.
    /// Also ensures that the `quotes` table exists.
    ///
    /// # Errors
    ///
    /// `BackendError::DirectoryCreationError` if the parent directory cannot be created
    /// `BackendError::DatabaseOpenError` if the database file cannot be opened
    /// `BackendError::TableCreationError` if the `quotes` table cannot be created.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| QuoteError::Backend(BackendError::DirectoryCreationError(e)))?;
        }

        let connection = Connection::open(path)
            .map_err(|e| QuoteError::Backend(BackendError::DatabaseOpenError(e)))?;
        debug!("Opened connection to db: {}", path.display());
        Self::init(connection)
    }

    /// Same as `new`, but keeps the database in memory
    ///
    /// # Errors
    ///
    /// `BackendError::DatabaseOpenError` or `BackendError::TableCreationError`
    pub fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()
            .map_err(|e| QuoteError::Backend(BackendError::DatabaseOpenError(e)))?;
        Self::init(connection)
    }

    fn init(connection: Connection) -> Result<Self> {
        // AUTOINCREMENT keeps ids of deleted quotes from being handed out again
        connection
            .execute(
                "
                CREATE TABLE IF NOT EXISTS quotes (
                    id    INTEGER PRIMARY KEY AUTOINCREMENT,
                    quote TEXT NOT NULL
                )
                ",
                [],
            )
            .map_err(|_e| QuoteError::Backend(BackendError::TableCreationError))?;
        debug!("Initialized db with `quotes` table");
        Ok(Self { connection })
    }
}

/// Maps a `rusqlite::Error` into a `QuoteError`, wrapping known SQLite-specific codes into domain-specific variants.
fn map_sqlite_error(e: rusqlite::Error) -> QuoteError {
    match e {
        SqliteError::SqliteFailure(code, _) => match code.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                QuoteError::Backend(BackendError::DatabaseBusy)
            }
            ErrorCode::PermissionDenied | ErrorCode::ReadOnly => {
                QuoteError::Backend(BackendError::PermissionDenied)
            }
            ErrorCode::NotADatabase => QuoteError::Backend(BackendError::NotADatabase),
            _ => QuoteError::Backend(BackendError::Other(anyhow::anyhow!(
                "SQLite error: {:?}",
                code
            ))),
        },
        other => QuoteError::Backend(BackendError::Other(anyhow::Error::new(other))),
    }
}

/// Reads an `(id, quote)` row
fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<Quote> {
    let id: i64 = row.get(0)?;
    let id = u64::try_from(id)
        .map_err(|e| SqliteError::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))?;
    Ok(Quote {
        id,
        text: row.get(1)?,
    })
}

impl QuoteBackend for SqliteBackend {
    /// Selects one row uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `LookupError::EmptyDatabase` if the table has no rows.
    /// - Mapped `SQLite` errors for query failure.
    fn get_random(&self) -> Result<Quote> {
        self.connection
            .query_row(
                "SELECT id, quote FROM quotes ORDER BY random() LIMIT 1",
                [],
                quote_from_row,
            )
            .optional()
            .map_err(map_sqlite_error)?
            .ok_or_else(|| LookupError::EmptyDatabase.into())
    }

    /// Selects one row uniformly at random among rows containing `pattern`, ignoring case.
    ///
    /// Rows are filtered outside of SQL so that `%` and `_` stay literal and
    /// case folding behaves like the line file backend.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `LookupError::NoRowMatches` if no row matches.
    /// - Mapped `SQLite` errors for query failure.
    fn search(&self, pattern: &str) -> Result<Quote> {
        let mut stmt = self
            .connection
            .prepare("SELECT id, quote FROM quotes ORDER BY id ASC")
            .map_err(map_sqlite_error)?;

        let quotes = stmt
            .query_map([], quote_from_row)
            .map_err(map_sqlite_error)?
            .collect::<std::result::Result<Vec<Quote>, _>>()
            .map_err(map_sqlite_error)?;
        trace!("Searching {} rows for '{pattern}'", quotes.len());

        quotes
            .into_iter()
            .filter(|quote| matches_pattern(&quote.text, pattern))
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| LookupError::NoRowMatches(pattern.to_string()).into())
    }

    /// Inserts a new row; the database assigns the id.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `BackendError::DatabaseBusy`, `PermissionDenied`, `NotADatabase`, or other mapped SQLite-specific errors.
    fn add(&self, text: &str) -> Result<Quote> {
        self.connection
            .execute("INSERT INTO quotes (quote) VALUES (?1)", params![text])
            .map_err(map_sqlite_error)?;

        let id = u64::try_from(self.connection.last_insert_rowid())
            .map_err(|e| QuoteError::Backend(BackendError::Other(e.into())))?;
        debug!("Inserted quote with id {id}");
        Ok(Quote {
            id,
            text: text.to_string(),
        })
    }

    /// Deletes a row by id. Deleting an id that doesn't exist still succeeds.
    ///
    /// # Errors
    ///
    /// Returns mapped `SQLite` errors if the deletion fails.
    fn remove(&self, id: u64) -> Result<()> {
        // Ids above i64::MAX can't exist in SQLite
        let Ok(row_id) = i64::try_from(id) else {
            return Ok(());
        };

        let rows = self
            .connection
            .execute("DELETE FROM quotes WHERE id = ?1", [row_id])
            .map_err(map_sqlite_error)?;
        debug!("Deleted {rows} row(s) with id {id}");
        Ok(())
    }

    /// Reads a quote by id.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `LookupError::NotFound` if no row has the given id.
    /// - Other mapped `SQLite` errors for query failure.
    fn get_by_id(&self, id: u64) -> Result<Quote> {
        let row_id = i64::try_from(id).map_err(|_| LookupError::NotFound(id))?;
        self.connection
            .query_row(
                "SELECT id, quote FROM quotes WHERE id = ?1",
                [row_id],
                quote_from_row,
            )
            .optional()
            .map_err(map_sqlite_error)?
            .ok_or_else(|| LookupError::NotFound(id).into())
    }
}
