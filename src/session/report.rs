//! Summary of one update session.

use std::fmt::Write as _;
use std::path::PathBuf;

use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A file added to the registry during the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedFile {
    /// Registry key
    pub filename: String,
    /// Hex digest
    pub hash: String,
    /// Where the file was found
    pub path: PathBuf,
}

/// A candidate whose content is already registered under another name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    /// Where the candidate was found
    pub path: PathBuf,
    /// Candidate filename
    pub filename: String,
    /// Candidate hash
    pub hash: String,
    /// Filename the hash is already registered under
    pub registered_as: String,
}

/// Outcome of an update session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Files appended, in order
    pub added: Vec<AddedFile>,
    /// Candidates skipped because their filename is registered
    pub skipped_known: usize,
    /// Candidates skipped because their hash is registered
    pub conflicts: Vec<ConflictRecord>,
    /// Directories that could not be listed
    pub scan_errors: Vec<String>,
    /// Candidates found by the scanner
    pub candidates_total: usize,
    /// Candidates never considered because the budget ran out
    pub candidates_unprocessed: usize,
    /// Whether the run stopped early on the budget
    pub budget_reached: bool,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Where the updated registry was written, if it was
    pub output_file: Option<PathBuf>,
    /// Session start time
    pub started_at: DateTime<Utc>,
    /// Session end time
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for SessionReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionReport {
    /// Start a new report stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            added: Vec::new(),
            skipped_known: 0,
            conflicts: Vec::new(),
            scan_errors: Vec::new(),
            candidates_total: 0,
            candidates_unprocessed: 0,
            budget_reached: false,
            bytes_hashed: 0,
            output_file: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Number of entries added.
    #[must_use]
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// Whether any non-fatal condition was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.conflicts.is_empty() || !self.scan_errors.is_empty()
    }

    /// Stamp the end time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// One-line closing summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let mut line = format!("Added {} new file(s)", self.added_count());
        if let Some(output) = &self.output_file {
            let _ = write!(line, " to {}", output.display());
        }
        line.push('.');
        if self.has_warnings() {
            let _ = write!(
                line,
                " {} conflict(s) and {} unreadable director(ies) need attention.",
                self.conflicts.len(),
                self.scan_errors.len()
            );
        }
        line
    }

    /// Human-readable multi-line report.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Candidates:      {}", self.candidates_total);
        let _ = writeln!(out, "Already known:   {}", self.skipped_known);
        let _ = writeln!(out, "Conflicts:       {}", self.conflicts.len());
        let _ = writeln!(out, "Scan errors:     {}", self.scan_errors.len());
        let _ = writeln!(out, "Hashed:          {}", ByteSize::b(self.bytes_hashed));
        if self.budget_reached {
            let _ = writeln!(
                out,
                "Budget reached:  {} candidate(s) left for a later run",
                self.candidates_unprocessed
            );
        }
        for added in &self.added {
            let _ = writeln!(out, "  + {};{}", added.filename, added.hash);
        }
        for conflict in &self.conflicts {
            let _ = writeln!(
                out,
                "  ! {} has the content of {}",
                conflict.path.display(),
                conflict.registered_as
            );
        }
        for error in &self.scan_errors {
            let _ = writeln!(out, "  ? {error}");
        }
        out.push_str(&self.summary_line());
        out
    }
}
