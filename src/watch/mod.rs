//! Watch layer for detecting rewrites of the table file.
//!
//! This module provides types and functions for:
//! - Classifying raw filesystem notifications ([`RawSignal`], [`SignalKind`])
//! - Debouncing bursts of notifications ([`DebouncePolicy`], [`Debouncer`])
//! - Watching a single file ([`FileWatcher`])
//! - Error handling ([`WatchError`])

mod debounce;
mod error;
mod signal;
mod watcher;

pub use debounce::{ChangeCallback, DebouncePolicy, Debouncer};
pub use error::WatchError;
pub use signal::{RawSignal, SignalKind};
pub use watcher::{FileWatcher, SignalResult};
