//! Registry update sessions.
//!
//! # Overview
//!
//! An [`UpdateSession`] is one end-to-end run over a machine's configured
//! directories and registry:
//!
//! 1. **Open**: load the registry and the directory list (configuration errors
//!    surface here, before any scanning)
//! 2. **Scan**: list candidates, collecting non-fatal directory errors
//! 3. **Process**: classify each candidate as known, conflicting or new, under
//!    the addition budget
//! 4. **Write**: persist the updated registry to a fresh path
//!
//! Candidates are processed one at a time. The budget and the shutdown flag
//! are checked before each candidate and never while a file is being hashed.
//!
//! # Example
//!
//! ```no_run
//! use filetrack::scanner::Hasher;
//! use filetrack::session::{UpdateParams, UpdateSession};
//!
//! let params = UpdateParams::new("experiments.txt", "out.txt", "dirs.txt", Some(100)).unwrap();
//! let session = UpdateSession::open(params, Hasher::new()).unwrap();
//! let report = session.execute().unwrap();
//! println!("{}", report.summary_line());
//! ```

pub mod params;
pub mod report;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::output::{self, OutputError};
use crate::progress::ProgressCallback;
use crate::registry::{Registry, RegistryError};
use crate::scanner::{Candidate, DirListError, DirectorySet, HashError, Hasher, Scanner};

pub use params::{Budget, ParamsError, UpdateParams};
pub use report::{AddedFile, ConflictRecord, SessionReport};

/// Errors that abort a session. No output is written when one occurs.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid session parameters.
    #[error(transparent)]
    Params(#[from] ParamsError),

    /// The input registry could not be loaded, or an append broke the bijection.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The directory list could not be read.
    #[error(transparent)]
    DirList(#[from] DirListError),

    /// A candidate could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The updated registry could not be written.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Shutdown was requested between candidates.
    #[error("Session interrupted before completion, no output written")]
    Interrupted,
}

impl SessionError {
    /// Whether this error was detected before scanning began.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Params(_)
                | Self::DirList(_)
                | Self::Registry(RegistryError::Io { .. })
                | Self::Output(OutputError::AlreadyExists(_))
        )
    }
}

/// How one candidate was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Filename already registered; not hashed
    Known,
    /// Content already registered under another filename
    Conflict(ConflictRecord),
    /// New entry appended
    Added(AddedFile),
}

/// Updated registry plus the session report.
#[derive(Debug)]
pub struct SessionOutcome {
    /// Loaded entries followed by the appended ones
    pub registry: Registry,
    /// What happened during the run
    pub report: SessionReport,
}

/// One update run over a registry and a directory set.
pub struct UpdateSession {
    params: UpdateParams,
    registry: Registry,
    directories: DirectorySet,
    hasher: Hasher,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for UpdateSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateSession")
            .field("params", &self.params)
            .field("registry_entries", &self.registry.len())
            .field("directories", &self.directories)
            .field("hasher", &self.hasher)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl UpdateSession {
    /// Load the registry and directory list for a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Registry`] or [`SessionError::DirList`] if
    /// either artifact cannot be read.
    pub fn open(params: UpdateParams, hasher: Hasher) -> Result<Self, SessionError> {
        log::info!("Reading directory file {}", params.dir_file().display());
        let directories = DirectorySet::load(params.dir_file())?;
        log::info!("Reading input registry {}", params.input_file().display());
        let registry = Registry::load(params.input_file())?;

        Ok(Self {
            params,
            registry,
            directories,
            hasher,
            shutdown_flag: None,
            progress: None,
        })
    }

    /// Set the shutdown flag checked between candidates.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set a progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The working registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The configured directories.
    #[must_use]
    pub fn directories(&self) -> &DirectorySet {
        &self.directories
    }

    /// Session parameters.
    #[must_use]
    pub fn params(&self) -> &UpdateParams {
        &self.params
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Scan, process and write the updated registry.
    ///
    /// # Errors
    ///
    /// Any [`SessionError`]; nothing is written unless the whole run succeeds.
    pub fn execute(self) -> Result<SessionReport, SessionError> {
        let output_file = self.params.output_file().to_path_buf();
        let SessionOutcome {
            registry,
            mut report,
        } = self.run()?;

        log::info!("Writing results to {}", output_file.display());
        output::write_registry(&registry, &output_file)?;
        report.output_file = Some(output_file);
        Ok(report)
    }

    /// Scan and process without writing.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Hash`] if a candidate cannot be hashed,
    /// or [`SessionError::Interrupted`] on shutdown.
    pub fn run(mut self) -> Result<SessionOutcome, SessionError> {
        let mut report = SessionReport::new();

        log::info!("Getting list of data files");
        let (candidates, scan_errors) = Scanner::new(&self.directories).collect();
        report.scan_errors = scan_errors.iter().map(ToString::to_string).collect();

        self.process(&candidates, &mut report)?;
        report.finish();

        log::info!(
            "Added {} new files ({} known, {} conflicts)",
            report.added_count(),
            report.skipped_known,
            report.conflicts.len()
        );

        Ok(SessionOutcome {
            registry: self.registry,
            report,
        })
    }

    /// Classify candidates in order under the budget.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Hash`] if a candidate cannot be hashed,
    /// or [`SessionError::Interrupted`] on shutdown.
    pub fn process(
        &mut self,
        candidates: &[Candidate],
        report: &mut SessionReport,
    ) -> Result<(), SessionError> {
        let budget = self.params.budget();
        report.candidates_total += candidates.len();

        if let Some(progress) = &self.progress {
            progress.on_phase_start("update", candidates.len());
        }

        for (i, candidate) in candidates.iter().enumerate() {
            if self.is_shutdown_requested() {
                log::info!("Shutdown requested, stopping before {}", candidate.path.display());
                return Err(SessionError::Interrupted);
            }
            if !budget.allows(report.added.len()) {
                log::info!(
                    "Reached maximum number of files to add ({}), stopping early",
                    budget
                );
                report.budget_reached = true;
                report.candidates_unprocessed = candidates.len() - i;
                break;
            }

            if let Some(progress) = &self.progress {
                progress.on_progress(i + 1, &candidate.path.to_string_lossy());
            }

            match self.classify(candidate, report)? {
                Decision::Known => report.skipped_known += 1,
                Decision::Conflict(conflict) => report.conflicts.push(conflict),
                Decision::Added(added) => report.added.push(added),
            }
        }

        if let Some(progress) = &self.progress {
            progress.on_phase_end("update");
        }
        Ok(())
    }

    /// Decide one candidate, appending it if it is new.
    fn classify(
        &mut self,
        candidate: &Candidate,
        report: &mut SessionReport,
    ) -> Result<Decision, SessionError> {
        if self.registry.contains(&candidate.filename) {
            log::debug!("Known: {}", candidate.filename);
            return Ok(Decision::Known);
        }

        let hashed = self.hasher.hash_file(&candidate.path)?;
        report.bytes_hashed += hashed.bytes;
        if let Some(progress) = &self.progress {
            progress.on_item_completed(hashed.bytes);
        }

        if let Some(registered_as) = self.registry.filename_for_hash(&hashed.hash) {
            log::warn!(
                "File {} at {} is new by name, but its hash {} is registered as {}. Skipping.",
                candidate.filename,
                candidate.path.display(),
                hashed.hash,
                registered_as
            );
            return Ok(Decision::Conflict(ConflictRecord {
                path: candidate.path.clone(),
                filename: candidate.filename.clone(),
                hash: hashed.hash,
                registered_as: registered_as.to_string(),
            }));
        }

        self.registry
            .append(candidate.filename.clone(), hashed.hash.clone())?;
        log::debug!("Added: {};{}", candidate.filename, hashed.hash);

        Ok(Decision::Added(AddedFile {
            filename: candidate.filename.clone(),
            hash: hashed.hash,
            path: candidate.path.clone(),
        }))
    }
}
