//! Wall-clock abstraction.
//!
//! [`Clock`] stamps every snapshot the record store publishes. Production
//! code uses [`SystemClock`]; tests inject fixed or stepping clocks.

use std::time::SystemTime;

/// Source of wall-clock time.
///
/// # Example
///
/// ```
/// use route_watch::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.now() >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Clock backed by [`SystemTime::now()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
