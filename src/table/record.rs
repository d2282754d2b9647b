//! Record and content digest types.

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of a record's raw content.
///
/// The digest is the only equality test used between two versions of a
/// record; line numbers are deliberately not part of it, so a record that
/// merely moves within the file is not reported as changed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Computes the digest of the given bytes.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the lowercase hex encoding of the digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

/// One logical entry of a routing-table dump.
///
/// A record spans from its marker line up to (not including) the next
/// marker line, or the end of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identity key used to track the record across reloads.
    pub key: String,
    /// 1-based line number of the marker line.
    pub start_line: usize,
    /// 1-based line number of the last line, inclusive.
    pub end_line: usize,
    /// The record's lines joined with `\n`, without a trailing newline.
    pub content: String,
    /// Digest of `content`.
    pub digest: ContentDigest,
}

impl Record {
    /// Creates a record from its joined content, computing the digest.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        start_line: usize,
        end_line: usize,
        content: impl Into<String>,
    ) -> Self {
        debug_assert!(start_line <= end_line, "record ends before it starts");
        let content = content.into();
        let digest = ContentDigest::of(content.as_bytes());
        Self {
            key: key.into(),
            start_line,
            end_line,
            content,
            digest,
        }
    }

    /// Number of source lines the record spans.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Returns true if both records carry the same content.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}
