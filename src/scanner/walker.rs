//! Candidate discovery over a [`DirectorySet`].
//!
//! # Overview
//!
//! Each configured directory is listed non-recursively using [`jwalk`] with a
//! maximum depth of one. Regular files whose names end with one of the
//! [`RECOGNIZED_SUFFIXES`](super::RECOGNIZED_SUFFIXES) become [`Candidate`]s.
//!
//! # Error Handling
//!
//! A directory that cannot be listed yields a [`ScanError`] and contributes
//! no candidates. Errors are yielded alongside candidates rather than
//! stopping iteration, so one bad directory never aborts a session.
//!
//! # Ordering
//!
//! Directories are visited in directory-list order. Entries within a
//! directory are sorted by file name.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use crate::registry::entry::SEPARATOR;

use super::{is_recognized_name, is_registrable_name, Candidate, DirectorySet, ScanError};

/// Non-recursive scanner over configured directories.
#[derive(Debug, Clone)]
pub struct Scanner {
    directories: DirectorySet,
}

impl Scanner {
    /// Create a scanner for the given directory set.
    #[must_use]
    pub fn new(directories: &DirectorySet) -> Self {
        Self {
            directories: directories.clone(),
        }
    }

    /// Scan all directories, yielding candidates and non-fatal errors in order.
    pub fn scan(&self) -> impl Iterator<Item = Result<Candidate, ScanError>> + '_ {
        self.directories
            .iter()
            .flat_map(|dir| self.list_directory(dir))
    }

    /// Scan all directories and split the results into candidates and errors.
    #[must_use]
    pub fn collect(&self) -> (Vec<Candidate>, Vec<ScanError>) {
        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        for result in self.scan() {
            match result {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => errors.push(e),
            }
        }
        log::info!(
            "Found {} candidate files in {} directories ({} scan errors)",
            candidates.len(),
            self.directories.len(),
            errors.len()
        );
        (candidates, errors)
    }

    /// List one directory.
    fn list_directory(&self, dir: &Path) -> Vec<Result<Candidate, ScanError>> {
        let root = match check_directory(dir) {
            Ok(root) => root,
            Err(e) => {
                log::warn!("Error reading directory {}: {}. Skipping.", dir.display(), e);
                return vec![Err(e)];
            }
        };

        log::debug!("Listing {}", root.display());

        WalkDir::new(&root)
            .max_depth(1)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .into_iter()
            .filter_map(|entry_result| match entry_result {
                Ok(entry) => {
                    // Depth 0 is the directory itself
                    if entry.depth == 0 {
                        return None;
                    }
                    let is_file = if entry.file_type().is_symlink() {
                        fs::metadata(entry.path()).is_ok_and(|m| m.is_file())
                    } else {
                        entry.file_type().is_file()
                    };
                    if !is_file {
                        return None;
                    }
                    classify(entry.path(), &root)
                }
                Err(e) => Some(Err(handle_jwalk_error(&root, e))),
            })
            .collect()
    }
}

/// Keep a regular file if its name is recognized.
fn classify(path: PathBuf, root: &Path) -> Option<Result<Candidate, ScanError>> {
    let name = path.file_name()?.to_string_lossy();
    if !is_recognized_name(&name) {
        log::trace!("Skipping unrecognized file: {}", path.display());
        return None;
    }
    match Candidate::from_path(path.clone(), root) {
        Some(candidate) if is_registrable_name(&candidate.filename) => Some(Ok(candidate)),
        Some(_) => {
            log::warn!(
                "Skipping file whose name contains '{}' or a line break: {}",
                SEPARATOR,
                path.display()
            );
            Some(Err(ScanError::UnregistrableFileName(path)))
        }
        None => {
            log::warn!("Skipping file with non UTF-8 name: {}", path.display());
            Some(Err(ScanError::InvalidFileName(path)))
        }
    }
}

/// Verify a configured directory can be listed and make it absolute.
fn check_directory(dir: &Path) -> Result<PathBuf, ScanError> {
    let metadata = fs::metadata(dir).map_err(|e| io_error(dir, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }
    std::path::absolute(dir).map_err(|e| io_error(dir, e))
}

fn io_error(path: &Path, error: std::io::Error) -> ScanError {
    match error.kind() {
        ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        _ => ScanError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// Handle jwalk errors.
fn handle_jwalk_error(root: &Path, error: jwalk::Error) -> ScanError {
    let path = error
        .path()
        .map_or_else(|| root.to_path_buf(), std::borrow::ToOwned::to_owned);
    log::warn!("Error reading directory {}: {}. Skipping.", path.display(), error);
    match error.io_error().map(std::io::Error::kind) {
        Some(ErrorKind::NotFound) => ScanError::NotFound(path),
        Some(ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
        _ => ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        },
    }
}
