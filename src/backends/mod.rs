pub mod filesystem;
pub mod sqlite;

pub use filesystem::LineFileBackend;
pub use sqlite::SqliteBackend;

pub use crate::{BackendError, LookupError, Quote, QuoteBackend, QuoteError, Result};

use crate::setup::config::{Datasource, StoreLocation};
use log::debug;

/// The store picked by the `datasource` setting. Chosen once per command
#[derive(Debug)]
pub enum Store {
    File(LineFileBackend),
    Sqlite(SqliteBackend),
}

impl Store {
    /// Opens the store described by `location`, creating the file or table if missing
    ///
    /// # Errors
    ///
    /// Forwards the `BackendError` of the chosen backend
    pub fn open(location: &StoreLocation) -> Result<Self> {
        debug!(
            "Opening {:?} store at {}",
            location.datasource,
            location.path.display()
        );
        match location.datasource {
            Datasource::File => Ok(Self::File(LineFileBackend::new(&location.path)?)),
            Datasource::Sqlite => Ok(Self::Sqlite(SqliteBackend::new(&location.path)?)),
        }
    }
}

impl QuoteBackend for Store {
    fn get_random(&self) -> Result<Quote> {
        match self {
            Self::File(backend) => backend.get_random(),
            Self::Sqlite(backend) => backend.get_random(),
        }
    }

    fn search(&self, pattern: &str) -> Result<Quote> {
        match self {
            Self::File(backend) => backend.search(pattern),
            Self::Sqlite(backend) => backend.search(pattern),
        }
    }

    fn add(&self, text: &str) -> Result<Quote> {
        match self {
            Self::File(backend) => backend.add(text),
            Self::Sqlite(backend) => backend.add(text),
        }
    }

    fn remove(&self, id: u64) -> Result<()> {
        match self {
            Self::File(backend) => backend.remove(id),
            Self::Sqlite(backend) => backend.remove(id),
        }
    }

    fn get_by_id(&self, id: u64) -> Result<Quote> {
        match self {
            Self::File(backend) => backend.get_by_id(id),
            Self::Sqlite(backend) => backend.get_by_id(id),
        }
    }
}
