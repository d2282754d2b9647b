//! Table sources the record store reads from.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::TableError;

/// Trait for opening the raw text of a routing table.
///
/// # Design
///
/// - Each call to [`open`](Self::open) starts a fresh read from the beginning
/// - Enables dependency injection of in-memory or failing sources in tests
pub trait TableSource: Send + Sync {
    /// The reader type returned by `open`.
    type Reader: BufRead;

    /// Opens the source for one complete parse.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Open`] if the source cannot be opened.
    fn open(&self) -> Result<Self::Reader, TableError>;

    /// Human-readable name used in logs and error messages.
    fn origin(&self) -> String;
}

/// A routing table stored in a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for FileSource {
    type Reader = BufReader<File>;

    fn open(&self) -> Result<Self::Reader, TableError> {
        File::open(&self.path)
            .map(BufReader::new)
            .map_err(|source| TableError::Open {
                origin: self.origin(),
                source,
            })
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}
