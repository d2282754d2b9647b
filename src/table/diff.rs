//! Change detection between two snapshots.

use std::collections::BTreeSet;
use std::fmt;

use super::snapshot::Snapshot;

/// The set of identity keys that differ between two snapshots.
///
/// Added, removed and modified records are not distinguished; each changed
/// key appears exactly once. Iteration is in key order so that reports are
/// stable, but callers must not attach meaning to that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    keys: BTreeSet<String>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    fn insert(&mut self, key: &str) {
        self.keys.insert(key.to_string());
    }

    /// Number of changed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if `key` changed.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Iterates over the changed keys.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Returns a report that lists at most `max_listed` keys individually.
    #[must_use]
    pub const fn summary(&self, max_listed: usize) -> ChangeSummary<'_> {
        ChangeSummary {
            changes: self,
            max_listed,
        }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Capped rendering of a [`ChangeSet`].
///
/// Produces one `  - key` line per listed key, followed by
/// `  ... and N more` when keys were left out.
#[derive(Debug, Clone, Copy)]
pub struct ChangeSummary<'a> {
    changes: &'a ChangeSet,
    max_listed: usize,
}

impl ChangeSummary<'_> {
    /// The individually listed keys.
    pub fn listed(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().take(self.max_listed)
    }

    /// Number of keys summarized as a count only.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.changes.len().saturating_sub(self.max_listed)
    }
}

impl fmt::Display for ChangeSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in self.listed() {
            if !first {
                writeln!(f)?;
            }
            write!(f, "  - {key}")?;
            first = false;
        }
        let remaining = self.remaining();
        if remaining > 0 {
            if !first {
                writeln!(f)?;
            }
            write!(f, "  ... and {remaining} more")?;
        }
        Ok(())
    }
}

/// Compares two snapshots and returns the keys whose records differ.
///
/// A key is changed when it is present in only one snapshot, or present in
/// both with different content digests. Both key spaces are scanned in
/// full; there is no partial mode.
#[must_use]
pub fn diff(old: &Snapshot, new: &Snapshot) -> ChangeSet {
    let mut changes = ChangeSet::new();

    if std::ptr::eq(old, new) {
        return changes;
    }

    // Removed or modified
    for old_record in old.records() {
        match new.get(&old_record.key) {
            Some(new_record) if new_record.same_content(old_record) => {}
            _ => changes.insert(&old_record.key),
        }
    }

    // Added
    for key in new.keys() {
        if !old.contains(key) {
            changes.insert(key);
        }
    }

    changes
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
