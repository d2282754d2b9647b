//! Error types for the table layer.

use std::io;

use thiserror::Error;

/// Error type for reading and chunking a table source.
///
/// Any error aborts the parse in progress; records chunked before the
/// failure are discarded together with it.
#[derive(Debug, Error)]
pub enum TableError {
    /// The source could not be opened.
    #[error("Failed to open {origin}: {source}")]
    Open {
        /// Human-readable description of the source (usually a path)
        origin: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The source was opened but a line could not be read.
    #[error("Failed to read {origin} at line {line}: {source}")]
    Read {
        /// Human-readable description of the source
        origin: String,
        /// 1-based number of the line that failed
        line: usize,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl TableError {
    /// Returns the 1-based line number for mid-stream read failures.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Open { .. } => None,
            Self::Read { line, .. } => Some(*line),
        }
    }
}
