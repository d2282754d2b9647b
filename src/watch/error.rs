//! Error types for the watch layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for establishing a file watch.
///
/// Errors reported by the notification primitive after setup are not
/// represented here; they are logged and the watch keeps running.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watched file could not be resolved to an absolute path.
    #[error("Failed to resolve '{}': {source}", path.display())]
    Canonicalize {
        /// Path as given by the caller
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The watched file has no parent directory to watch.
    #[error("'{}' has no parent directory", path.display())]
    NoParent {
        /// The resolved file path
        path: PathBuf,
    },

    /// The notification primitive could not watch the directory.
    #[error("Failed to watch directory '{}': {source}", path.display())]
    Setup {
        /// Directory that was to be watched
        path: PathBuf,
        /// Underlying notify error
        #[source]
        source: notify::Error,
    },
}
