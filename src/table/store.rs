//! The record store holding the current snapshot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime};

use super::chunker::Chunker;
use super::diff::{ChangeSet, diff};
use super::snapshot::Snapshot;
use super::source::TableSource;
use super::TableError;
use crate::time::{Clock, SystemClock};

/// Outcome of a successful [`RecordStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of records in the published snapshot.
    pub records: usize,
    /// Time spent reading, chunking and publishing.
    pub elapsed: Duration,
}

/// Outcome of a successful [`RecordStore::reload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadReport {
    /// Number of records in the published snapshot.
    pub records: usize,
    /// Time spent reading, chunking, diffing and publishing.
    pub elapsed: Duration,
    /// Keys that differ from the previously published snapshot.
    pub changes: ChangeSet,
    /// Load stamp of the snapshot `changes` is relative to.
    pub since: SystemTime,
}

/// Holder of the current [`Snapshot`] of a table source.
///
/// # Publication
///
/// Every load parses the source into a brand-new snapshot outside of any
/// reader-visible lock, then swaps it in under a short write lock. Readers
/// calling [`snapshot`](Self::snapshot) see either the old or the new
/// snapshot in full. A failed load leaves the published snapshot untouched.
///
/// Load and reload cycles are serialized among themselves, so each reload
/// diffs against exactly the snapshot it replaces.
///
/// # Type Parameters
///
/// * `S` - The [`TableSource`] to read from
/// * `C` - The [`Clock`] stamping each snapshot (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct RecordStore<S, C = SystemClock> {
    source: S,
    chunker: Chunker,
    clock: C,
    current: RwLock<Arc<Snapshot>>,
    cycle: Mutex<()>,
}

impl<S: TableSource> RecordStore<S, SystemClock> {
    /// Creates an empty store reading from `source`.
    #[must_use]
    pub fn new(source: S, chunker: Chunker) -> Self {
        Self::with_clock(source, chunker, SystemClock)
    }
}

impl<S: TableSource, C: Clock> RecordStore<S, C> {
    /// Creates an empty store with a custom clock.
    #[must_use]
    pub fn with_clock(source: S, chunker: Chunker, clock: C) -> Self {
        Self {
            source,
            chunker,
            clock,
            current: RwLock::new(Arc::new(Snapshot::empty())),
            cycle: Mutex::new(()),
        }
    }

    /// Returns the table source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns the currently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Parses the source and publishes the result.
    ///
    /// # Errors
    ///
    /// Returns the [`TableError`] from opening or chunking the source; the
    /// previous snapshot stays published.
    pub fn load(&self) -> Result<LoadReport, TableError> {
        let _cycle = self.lock_cycle();
        let started = Instant::now();

        let fresh = self.build()?;
        let records = fresh.len();
        self.publish(fresh);

        let report = LoadReport {
            records,
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            "Published {} records from {} in {:?}",
            report.records,
            self.source.origin(),
            report.elapsed
        );
        Ok(report)
    }

    /// Parses the source, diffs it against the published snapshot and
    /// publishes the result regardless of whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns the [`TableError`] from opening or chunking the source; the
    /// previous snapshot stays published and no changes are reported.
    pub fn reload(&self) -> Result<ReloadReport, TableError> {
        let _cycle = self.lock_cycle();
        let started = Instant::now();

        let previous = self.snapshot();
        let fresh = self.build()?;
        let changes = diff(&previous, &fresh);
        let records = fresh.len();
        let loaded_at = fresh.loaded_at();
        self.publish(fresh);

        let report = ReloadReport {
            records,
            elapsed: started.elapsed(),
            changes,
            since: previous.loaded_at(),
        };
        let age = loaded_at
            .duration_since(report.since)
            .unwrap_or_default();
        tracing::debug!(
            "Reloaded {} records from {} ({} changed over {:?}) in {:?}",
            report.records,
            self.source.origin(),
            report.changes.len(),
            age,
            report.elapsed
        );
        Ok(report)
    }

    fn build(&self) -> Result<Snapshot, TableError> {
        let reader = self.source.open()?;
        let records = self.chunker.parse(reader, &self.source.origin())?;
        Ok(Snapshot::from_records(records, self.clock.now()))
    }

    fn publish(&self, fresh: Snapshot) {
        let fresh = Arc::new(fresh);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = fresh;
    }

    fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
