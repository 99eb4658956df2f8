//! Registry line format.

use std::fmt;

use serde::Serialize;

/// Column separator in registry lines.
pub const SEPARATOR: char = ';';

/// Comment marker, recognized after leading whitespace.
pub const COMMENT_PREFIX: char = '#';

/// One known (filename, hash) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RegistryEntry {
    /// Base name of the data file
    pub filename: String,
    /// Hex-encoded content digest
    pub hash: String,
}

impl RegistryEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(filename: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            hash: hash.into(),
        }
    }

    /// Parse one registry line.
    ///
    /// Returns `None` for comments and for lines without a non-empty filename
    /// followed by a hash column. The hash column may be empty; the filename is
    /// still known then. Columns after the hash are ignored.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        if line.trim_start().starts_with(COMMENT_PREFIX) {
            return None;
        }
        let mut columns = line.split(SEPARATOR);
        let filename = columns.next()?;
        let hash = columns.next()?.trim();
        if filename.is_empty() {
            return None;
        }
        Some(Self::new(filename, hash))
    }
}

impl fmt::Display for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.filename, SEPARATOR, self.hash)
    }
}

/// Normalize a hash for index lookups. Hex digests compare case-insensitively.
pub(crate) fn hash_key(hash: &str) -> String {
    hash.trim().to_ascii_lowercase()
}
