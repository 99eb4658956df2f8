//! Materializing the updated registry.
//!
//! The writer never overwrites: if anything exists at the destination the
//! write is refused, and the orchestration layer is expected to perform its
//! own replace step. Content is staged in a temporary file in the
//! destination directory, synced, and then persisted with a no-clobber
//! rename, so a half-written registry never appears at the destination.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::registry::Registry;

/// Errors that can occur while writing the output registry.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Something already exists at the destination.
    #[error("Output file already exists, won't overwrite: {0}")]
    AlreadyExists(PathBuf),

    /// I/O error while staging or persisting the file.
    #[error("Failed to write output registry {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Write the rendered registry to a fresh path.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`OutputError::AlreadyExists`] if the destination exists, or
/// [`OutputError::Io`] if staging or persisting fails.
pub fn write_registry(registry: &Registry, destination: &Path) -> Result<u64, OutputError> {
    write_new_file(destination, registry.render().as_bytes())
}

/// Write bytes to a path that must not exist yet.
///
/// # Errors
///
/// See [`write_registry`].
pub fn write_new_file(destination: &Path, content: &[u8]) -> Result<u64, OutputError> {
    if destination.symlink_metadata().is_ok() {
        return Err(OutputError::AlreadyExists(destination.to_path_buf()));
    }

    let io_err = |source: io::Error| OutputError::Io {
        path: destination.to_path_buf(),
        source,
    };

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent).map_err(io_err)?;
    staged.write_all(content).map_err(io_err)?;
    staged.as_file().sync_all().map_err(io_err)?;

    staged.persist_noclobber(destination).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            OutputError::AlreadyExists(destination.to_path_buf())
        } else {
            io_err(e.error)
        }
    })?;

    log::debug!(
        "Wrote {} bytes to {}",
        content.len(),
        destination.display()
    );
    Ok(content.len() as u64)
}
