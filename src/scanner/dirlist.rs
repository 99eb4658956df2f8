//! Directory-list artifact parsing.
//!
//! A directory list holds one directory per line. Lines starting with `#`
//! and lines that are empty or whitespace-only are ignored. Entries are not
//! deduplicated and not checked for existence: a missing directory is a
//! scan-time warning, not a load-time error.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error reading the directory-list artifact itself.
#[derive(Debug, Error)]
pub enum DirListError {
    /// The artifact could not be read.
    #[error("Failed to read directory list {path}: {source}")]
    Io {
        /// Path to the directory-list artifact
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Ordered set of directories to scan, in artifact order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySet {
    directories: Vec<PathBuf>,
}

impl DirectorySet {
    /// Load a directory set from a directory-list artifact.
    ///
    /// # Errors
    ///
    /// Returns [`DirListError::Io`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, DirListError> {
        let content = fs::read_to_string(path).map_err(|source| DirListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(&content);
        log::debug!(
            "Loaded {} directories from {}",
            set.len(),
            path.display()
        );
        Ok(set)
    }

    /// Parse directory-list text.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let directories = content
            .lines()
            .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
            .map(PathBuf::from)
            .collect();
        Self { directories }
    }

    /// Iterate over the directories in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.directories.iter()
    }

    /// Number of configured directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Whether no directories are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

impl<'a> IntoIterator for &'a DirectorySet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<PathBuf> for DirectorySet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            directories: iter.into_iter().collect(),
        }
    }
}
