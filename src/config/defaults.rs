//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default debounce quiet period in milliseconds.
pub const DEBOUNCE_MS: u64 = 500;

/// Default record-start marker.
pub const MARKER: &str = crate::table::DEFAULT_MARKER;

/// Default number of changed keys listed individually per reload.
pub const MAX_LISTED: usize = 10;

/// Default debounce quiet period as Duration.
#[must_use]
pub const fn debounce() -> Duration {
    Duration::from_millis(DEBOUNCE_MS)
}
