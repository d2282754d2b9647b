//! Immutable keyed record sets.

use std::collections::HashMap;
use std::time::SystemTime;

use super::record::Record;

/// The complete set of records produced by one parse of the source.
///
/// Keys are unique; when the source contains duplicate keys the record
/// appearing last wins. A snapshot is never mutated after construction;
/// reloads build a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    records: HashMap<String, Record>,
    loaded_at: SystemTime,
}

impl Snapshot {
    /// Builds a snapshot from records in source order.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>, loaded_at: SystemTime) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        Self { records, loaded_at }
    }

    /// An empty snapshot, used before the initial load.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            records: HashMap::new(),
            loaded_at: SystemTime::UNIX_EPOCH,
        }
    }

    /// Returns the record with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    /// Returns true if a record with the given key exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Iterates over all records in arbitrary order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Wall-clock time at which the snapshot was built.
    #[must_use]
    pub const fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
