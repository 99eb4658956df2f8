//! The append-only registry of known data files.
//!
//! # Overview
//!
//! A registry is loaded once from a line-oriented artifact where each entry
//! line is `filename;hash` (extra columns ignored, `#` lines are comments).
//! Two indexes, filename → entry and hash → entry, make the name/hash
//! bijection structural: [`Registry::append`] refuses any pair whose
//! filename or hash is already present.
//!
//! The artifact text is kept verbatim. Rendering the registry reproduces it
//! byte for byte and adds only the appended entries, so existing lines are
//! never altered, reordered or removed.
//!
//! # Example
//!
//! ```
//! use filetrack::registry::Registry;
//!
//! let mut registry = Registry::parse("# experiments\na.hits;1f2e\n");
//! assert!(registry.contains("a.hits"));
//! assert!(registry.contains_hash("1F2E"));
//!
//! registry.append("b.hits", "9a8b").unwrap();
//! assert_eq!(registry.len(), 2);
//! ```

pub mod entry;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use entry::RegistryEntry;
use entry::hash_key;

/// Which half of the bijection a pair violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The filename is already registered
    DuplicateFilename,
    /// The hash is already registered under another filename
    DuplicateHash,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFilename => write!(f, "duplicate filename"),
            Self::DuplicateHash => write!(f, "duplicate hash"),
        }
    }
}

/// Errors from loading or mutating a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry artifact could not be read.
    #[error("Failed to read registry {path}: {source}")]
    Io {
        /// Path to the registry artifact
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An append would break the filename/hash bijection.
    #[error("Cannot append {filename};{hash}: {kind} (already registered as {existing})")]
    Inconsistent {
        /// Which half of the bijection is violated
        kind: ConflictKind,
        /// Filename being appended
        filename: String,
        /// Hash being appended
        hash: String,
        /// The conflicting entry already in the registry
        existing: RegistryEntry,
    },
}

/// A loaded line that repeats a filename or hash of an earlier line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inconsistency {
    /// 1-based line number of the repeating line
    pub line: usize,
    /// Which half of the bijection is violated
    pub kind: ConflictKind,
    /// The repeating entry
    pub entry: RegistryEntry,
    /// The earlier entry it collides with
    pub existing: RegistryEntry,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} {} collides with {}",
            self.line, self.kind, self.entry, self.existing
        )
    }
}

/// In-memory registry with filename and hash indexes.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Artifact text exactly as loaded
    source: String,
    /// All parsed entries in order, loaded first then appended
    entries: Vec<RegistryEntry>,
    /// Number of entries that came from `source`
    loaded: usize,
    by_name: HashMap<String, usize>,
    by_hash: HashMap<String, usize>,
    inconsistencies: Vec<Inconsistency>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from an artifact on disk.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::parse(&content);
        log::info!(
            "Loaded {} registry entries from {}",
            registry.len(),
            path.display()
        );
        for issue in &registry.inconsistencies {
            log::warn!("Registry {} is inconsistent at {}", path.display(), issue);
        }
        Ok(registry)
    }

    /// Parse registry text.
    ///
    /// Lines repeating an earlier filename or hash are kept in the text and
    /// in [`entries`](Self::entries) but only the first occurrence is
    /// indexed; each repeat is recorded as an [`Inconsistency`].
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut registry = Self {
            source: content.to_string(),
            ..Self::default()
        };

        for (idx, line) in content.lines().enumerate() {
            let Some(entry) = RegistryEntry::parse_line(line) else {
                continue;
            };
            let index = registry.entries.len();
            let line = idx + 1;
            let name_seen = registry.by_name.get(&entry.filename).copied();

            if let Some(first) = name_seen {
                registry.record_inconsistency(line, ConflictKind::DuplicateFilename, &entry, first);
            } else {
                registry.by_name.insert(entry.filename.clone(), index);
            }

            // An empty hash column still makes the filename known
            let key = hash_key(&entry.hash);
            if !key.is_empty() {
                match registry.by_hash.get(&key).copied() {
                    // A repeated identical line is one problem, not two
                    Some(first) if name_seen == Some(first) => {}
                    Some(first) => registry.record_inconsistency(
                        line,
                        ConflictKind::DuplicateHash,
                        &entry,
                        first,
                    ),
                    None => {
                        registry.by_hash.insert(key, index);
                    }
                }
            }

            registry.entries.push(entry);
        }

        registry.loaded = registry.entries.len();
        registry
    }

    fn record_inconsistency(
        &mut self,
        line: usize,
        kind: ConflictKind,
        entry: &RegistryEntry,
        first: usize,
    ) {
        self.inconsistencies.push(Inconsistency {
            line,
            kind,
            entry: entry.clone(),
            existing: self.entries[first].clone(),
        });
    }

    /// Whether a filename is registered.
    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.by_name.contains_key(filename)
    }

    /// Whether a hash is registered (case-insensitive hex).
    #[must_use]
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.by_hash.contains_key(&hash_key(hash))
    }

    /// Hash registered for a filename.
    #[must_use]
    pub fn hash_for(&self, filename: &str) -> Option<&str> {
        self.by_name
            .get(filename)
            .map(|&i| self.entries[i].hash.as_str())
    }

    /// Filename registered for a hash.
    #[must_use]
    pub fn filename_for_hash(&self, hash: &str) -> Option<&str> {
        self.by_hash
            .get(&hash_key(hash))
            .map(|&i| self.entries[i].filename.as_str())
    }

    /// Append a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Inconsistent`] if the filename or the hash is
    /// already registered. The registry is left unchanged in that case.
    pub fn append(
        &mut self,
        filename: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<&RegistryEntry, RegistryError> {
        let entry = RegistryEntry::new(filename, hash);

        let existing = self
            .by_name
            .get(&entry.filename)
            .map(|&i| (ConflictKind::DuplicateFilename, i))
            .or_else(|| {
                self.by_hash
                    .get(&hash_key(&entry.hash))
                    .map(|&i| (ConflictKind::DuplicateHash, i))
            });
        if let Some((kind, i)) = existing {
            return Err(RegistryError::Inconsistent {
                kind,
                filename: entry.filename,
                hash: entry.hash,
                existing: self.entries[i].clone(),
            });
        }

        let index = self.entries.len();
        self.by_name.insert(entry.filename.clone(), index);
        self.by_hash.insert(hash_key(&entry.hash), index);
        self.entries.push(entry);
        Ok(&self.entries[index])
    }

    /// All entries, loaded then appended, in order.
    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Entries appended since loading.
    #[must_use]
    pub fn appended(&self) -> &[RegistryEntry] {
        &self.entries[self.loaded..]
    }

    /// The artifact text as loaded.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Repeated filenames or hashes found while loading.
    #[must_use]
    pub fn inconsistencies(&self) -> &[Inconsistency] {
        &self.inconsistencies
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the registry as artifact text.
    ///
    /// The loaded text is reproduced unchanged. Appended entries follow, one
    /// per line, each terminated by a newline. A newline is inserted first
    /// if the loaded text does not end with one.
    #[must_use]
    pub fn render(&self) -> String {
        let appended = self.appended();
        let mut out = String::with_capacity(self.source.len() + appended.len() * 96);
        out.push_str(&self.source);
        if appended.is_empty() {
            return out;
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        for entry in appended {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }
}
