//! Scanner module for candidate discovery and content hashing.
//!
//! This module provides functionality for:
//! - Reading the directory-list artifact into a [`DirectorySet`]
//! - Non-recursive listing of each directory, filtered to recognized data files
//! - SHA-256 content hashing with bounded retry
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`dirlist`]: Directory-list parsing
//! - [`walker`]: Directory listing and candidate discovery
//! - [`hasher`]: Chunked SHA-256 hashing with retry
//!
//! # Example
//!
//! ```no_run
//! use filetrack::scanner::{DirectorySet, Scanner};
//! use std::path::Path;
//!
//! let dirs = DirectorySet::load(Path::new("dirs.txt")).unwrap();
//! let scanner = Scanner::new(&dirs);
//! for candidate in scanner.scan() {
//!     match candidate {
//!         Ok(c) => println!("{}", c.path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod dirlist;
pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

use crate::registry::entry::SEPARATOR;

// Re-export main types
pub use dirlist::{DirListError, DirectorySet};
pub use hasher::{hash_to_hex, HashedFile, Hasher, DEFAULT_CHUNK_SIZE, DEFAULT_READ_ATTEMPTS};
pub use walker::Scanner;

/// File name suffixes recognized as data files (compared lowercased).
pub const RECOGNIZED_SUFFIXES: [&str; 4] = [".rhit", ".hits", ".str", ".rraw"];

/// Check whether a file name ends with one of [`RECOGNIZED_SUFFIXES`], ignoring case.
#[must_use]
pub fn is_recognized_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    RECOGNIZED_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

/// Check whether a file name can be stored as one registry line and read back.
#[must_use]
pub fn is_registrable_name(name: &str) -> bool {
    !name.contains(|c: char| c == SEPARATOR || c == '\n' || c == '\r')
}

/// A data file discovered during scanning.
///
/// Candidates are transient: they exist for the duration of one session
/// and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Base name of the file, the registry key
    pub filename: String,
    /// Configured directory the file was found in
    pub directory: PathBuf,
}

impl Candidate {
    /// Create a candidate from an absolute path.
    ///
    /// Returns `None` if the path has no file name or the name is not valid UTF-8,
    /// since such a name cannot be written to the registry.
    #[must_use]
    pub fn from_path(path: PathBuf, directory: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?.to_string();
        Some(Self {
            path,
            filename,
            directory: directory.to_path_buf(),
        })
    }
}

/// Errors that can occur while listing a configured directory.
///
/// None of these abort a session: the directory contributes zero candidates.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when listing a directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The configured directory was not found.
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),

    /// The configured path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A file name could not be represented as UTF-8.
    #[error("File name is not valid UTF-8: {0}")]
    InvalidFileName(PathBuf),

    /// A file name contains the registry separator or a line break.
    #[error("File name cannot be written to the registry: {0}")]
    UnregistrableFileName(PathBuf),

    /// An I/O error occurred while listing.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::InvalidFileName(p)
            | Self::UnregistrableFileName(p)
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// Every read attempt failed; the file's hash cannot be determined.
    #[error("Failed to read {path} {attempts} times in a row, giving up: {source}")]
    RetriesExhausted {
        /// File that could not be read
        path: PathBuf,
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        source: std::io::Error,
    },
}
