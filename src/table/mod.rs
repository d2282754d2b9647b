//! Table layer: turning a routing-table dump into keyed, hashed records.
//!
//! This module provides types and functions for:
//! - Representing records and their digests ([`Record`], [`ContentDigest`])
//! - Splitting a line stream into records ([`Chunker`])
//! - Immutable keyed record sets ([`Snapshot`])
//! - Detecting changes between snapshots ([`diff`], [`ChangeSet`])
//! - Reading the raw table ([`TableSource`], [`FileSource`])
//! - Holding and reloading the current snapshot ([`RecordStore`])

mod chunker;
mod diff;
mod error;
mod record;
mod snapshot;
mod source;
mod store;

pub use chunker::{Chunker, DEFAULT_MARKER, is_synthetic_key, render};
pub use diff::{ChangeSet, ChangeSummary, diff};
pub use error::TableError;
pub use record::{ContentDigest, Record};
pub use snapshot::Snapshot;
pub use source::{FileSource, TableSource};
pub use store::{LoadReport, RecordStore, ReloadReport};
