//! Splits a line stream into marker-delimited records.

use std::io::{BufRead, Cursor};

use super::TableError;
use super::record::Record;

/// Default marker that opens a route entry in a routing-table dump.
pub const DEFAULT_MARKER: &str = "Destination:";

/// Prefix of synthetic keys assigned to marker lines without a key token.
///
/// Contains whitespace, which a real key token never does.
const SYNTHETIC_KEY_PREFIX: &str = "<unkeyed line ";

/// Line-oriented record chunker.
///
/// # Boundary Rule
///
/// A line that starts with the marker opens a new record; every following
/// line (blank ones included) belongs to it until the next marker line or
/// end of input. Lines before the first marker are discarded.
///
/// # Identity
///
/// The key is the second whitespace-delimited token of the marker line.
/// A marker line with fewer tokens gets the synthetic key
/// `<unkeyed line N>`, which cannot be matched across reloads once the line
/// number shifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunker {
    marker: String,
}

/// A record still accumulating lines.
struct OpenRecord {
    key: String,
    start_line: usize,
    lines: Vec<String>,
}

impl OpenRecord {
    fn close(self, end_line: usize) -> Record {
        Record::new(self.key, self.start_line, end_line, self.lines.join("\n"))
    }
}

impl Chunker {
    /// Creates a chunker using the given record-start marker.
    ///
    /// The marker is not validated here. An empty marker matches every
    /// line, so each line becomes a record of its own; callers taking the
    /// marker from user input should reject that first, as
    /// [`ValidatedConfig`](crate::config::ValidatedConfig) does.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Returns the record-start marker.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns true if `line` opens a new record.
    #[must_use]
    pub fn is_boundary(&self, line: &str) -> bool {
        line.starts_with(&self.marker)
    }

    /// Extracts the identity key from a marker line.
    #[must_use]
    pub fn extract_key(line: &str, line_number: usize) -> String {
        line.split_whitespace()
            .nth(1)
            .map_or_else(|| synthetic_key(line_number), str::to_string)
    }

    /// Chunks every line of `reader` into records, in source order.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Read`] if a line cannot be read (including
    /// invalid UTF-8). Records chunked before the failure are dropped.
    pub fn parse<R: BufRead>(&self, reader: R, origin: &str) -> Result<Vec<Record>, TableError> {
        let mut records = Vec::new();
        let mut current: Option<OpenRecord> = None;
        let mut line_number = 0;

        for line in reader.lines() {
            line_number += 1;
            let line = line.map_err(|source| TableError::Read {
                origin: origin.to_string(),
                line: line_number,
                source,
            })?;

            if self.is_boundary(&line) {
                if let Some(open) = current.take() {
                    records.push(open.close(line_number - 1));
                }
                current = Some(OpenRecord {
                    key: Self::extract_key(&line, line_number),
                    start_line: line_number,
                    lines: vec![line],
                });
            } else if let Some(open) = current.as_mut() {
                open.lines.push(line);
            }
        }

        if let Some(open) = current {
            records.push(open.close(line_number));
        }

        Ok(records)
    }

    /// Chunks an in-memory string.
    #[must_use]
    pub fn parse_str(&self, text: &str) -> Vec<Record> {
        // Reading from memory only fails on invalid UTF-8, which a `&str` rules out.
        self.parse(Cursor::new(text.as_bytes()), "<memory>")
            .unwrap_or_default()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

/// Renders records back into source text, one `\n`-terminated line each.
///
/// For input whose first line is a marker line, chunking the rendered text
/// yields the same keys, boundaries and digests.
#[must_use]
pub fn render(records: &[Record]) -> String {
    let mut text = String::new();
    for record in records {
        text.push_str(&record.content);
        text.push('\n');
    }
    text
}

fn synthetic_key(line_number: usize) -> String {
    format!("{SYNTHETIC_KEY_PREFIX}{line_number}>")
}

/// Returns true if `key` was synthesized from a line number.
#[must_use]
pub fn is_synthetic_key(key: &str) -> bool {
    key.strip_prefix(SYNTHETIC_KEY_PREFIX)
        .and_then(|rest| rest.strip_suffix('>'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
#[path = "chunker_tests.rs"]
mod tests;
