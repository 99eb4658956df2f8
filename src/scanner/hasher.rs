//! SHA-256 file hasher with streaming reads and bounded retry.
//!
//! # Overview
//!
//! [`Hasher`] computes the hex-encoded SHA-256 digest of a file, reading it
//! in fixed-size chunks so memory use does not grow with file size.
//!
//! Reads on shared acquisition storage occasionally fail transiently. When
//! opening or reading fails, the whole file is hashed again from the start,
//! up to [`DEFAULT_READ_ATTEMPTS`] attempts in total. Each failed attempt
//! before the last is logged as a warning; the last failure is returned as
//! [`HashError::RetriesExhausted`].
//!
//! # Example
//!
//! ```no_run
//! use filetrack::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hashed = hasher.hash_file(Path::new("sample.rhit")).unwrap();
//! println!("{} ({} bytes)", hashed.hash, hashed.bytes);
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};

use super::HashError;

/// Default read chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 294_400;

/// Default number of read attempts per file, including the first.
pub const DEFAULT_READ_ATTEMPTS: u32 = 4;

/// Raw SHA-256 digest.
pub type Hash = [u8; 32];

/// Encode a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Result of hashing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// Lowercase hex SHA-256 digest
    pub hash: String,
    /// Number of bytes read on the successful attempt
    pub bytes: u64,
    /// Attempt number that succeeded (1-based)
    pub attempts: u32,
}

/// Chunked SHA-256 hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
    read_attempts: u32,
    retry_delay: Duration,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with default chunk size and attempt count.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_attempts: DEFAULT_READ_ATTEMPTS,
            retry_delay: Duration::ZERO,
        }
    }

    /// Set the read chunk size. Zero is treated as one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the total number of read attempts. Zero is treated as one.
    #[must_use]
    pub fn with_read_attempts(mut self, attempts: u32) -> Self {
        self.read_attempts = attempts.max(1);
        self
    }

    /// Set a pause between failed attempts.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Total number of read attempts per file.
    #[must_use]
    pub fn read_attempts(&self) -> u32 {
        self.read_attempts
    }

    /// Hash a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::RetriesExhausted`] if every attempt failed.
    pub fn hash_file(&self, path: &Path) -> Result<HashedFile, HashError> {
        self.hash_with(path, |p| File::open(p))
    }

    /// Hash a file using a custom opener.
    ///
    /// The opener is called once per attempt, so a retry always restarts the
    /// read from the first byte.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::RetriesExhausted`] if every attempt failed.
    pub fn hash_with<R, F>(&self, path: &Path, mut open: F) -> Result<HashedFile, HashError>
    where
        R: Read,
        F: FnMut(&Path) -> io::Result<R>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.hash_once(path, &mut open) {
                Ok((hash, bytes)) => {
                    log::trace!(
                        "Hashed {} ({} bytes, attempt {})",
                        path.display(),
                        bytes,
                        attempt
                    );
                    return Ok(HashedFile {
                        hash: hash_to_hex(&hash),
                        bytes,
                        attempts: attempt,
                    });
                }
                Err(e) if attempt < self.read_attempts => {
                    log::warn!(
                        "Problem reading file {} (attempt {}/{}): {}. Will try again.",
                        path.display(),
                        attempt,
                        self.read_attempts,
                        e
                    );
                    if !self.retry_delay.is_zero() {
                        std::thread::sleep(self.retry_delay);
                    }
                }
                Err(source) => {
                    log::error!(
                        "Failed to read file {} {} times in a row. Giving up.",
                        path.display(),
                        attempt
                    );
                    return Err(HashError::RetriesExhausted {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    /// One full pass over the file.
    fn hash_once<R, F>(&self, path: &Path, open: &mut F) -> io::Result<(Hash, u64)>
    where
        R: Read,
        F: FnMut(&Path) -> io::Result<R>,
    {
        let mut reader = open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut total: u64 = 0;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
            total += n as u64;
        }

        Ok((hasher.finalize().into(), total))
    }
}
