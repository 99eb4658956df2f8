//! Validated parameters for an update session.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Configuration errors detected before any scanning begins.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// A required path parameter was empty.
    #[error("Required parameter {0} is empty")]
    Empty(&'static str),

    /// The input registry does not exist or is not a file.
    #[error("Input file doesn't exist: {0}")]
    InputMissing(PathBuf),

    /// The directory list does not exist or is not a file.
    #[error("Directory file doesn't exist: {0}")]
    DirListMissing(PathBuf),

    /// The output path is already taken.
    #[error("Output file already exists, won't overwrite: {0}")]
    OutputExists(PathBuf),

    /// The addition cap was zero.
    #[error("Maximum number of files to add must be a positive integer, got {0}")]
    InvalidBudget(usize),
}

/// Maximum number of entries one session may add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Budget {
    /// No cap
    #[default]
    Unbounded,
    /// At most this many additions
    Limited(NonZeroUsize),
}

impl Budget {
    /// Build a budget from an optional cap.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::InvalidBudget`] for a cap of zero.
    pub fn from_cap(cap: Option<usize>) -> Result<Self, ParamsError> {
        match cap {
            None => Ok(Self::Unbounded),
            Some(n) => NonZeroUsize::new(n)
                .map(Self::Limited)
                .ok_or(ParamsError::InvalidBudget(n)),
        }
    }

    /// Whether another addition is allowed after `added` additions.
    #[must_use]
    pub fn allows(self, added: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(cap) => added < cap.get(),
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Limited(cap) => write!(f, "{cap}"),
        }
    }
}

/// Parameters of one update session, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateParams {
    input_file: PathBuf,
    output_file: PathBuf,
    dir_file: PathBuf,
    budget: Budget,
}

impl UpdateParams {
    /// Validate session parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamsError`] if a path is empty, the input registry or the
    /// directory list is missing, the output path exists, or the cap is zero.
    pub fn new(
        input_file: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
        dir_file: impl Into<PathBuf>,
        max_files: Option<usize>,
    ) -> Result<Self, ParamsError> {
        let input_file = non_empty(input_file.into(), "input file")?;
        let output_file = non_empty(output_file.into(), "output file")?;
        let dir_file = non_empty(dir_file.into(), "directory file")?;
        let budget = Budget::from_cap(max_files)?;

        if !input_file.is_file() {
            return Err(ParamsError::InputMissing(input_file));
        }
        if !dir_file.is_file() {
            return Err(ParamsError::DirListMissing(dir_file));
        }
        if output_file.symlink_metadata().is_ok() {
            return Err(ParamsError::OutputExists(output_file));
        }

        Ok(Self {
            input_file,
            output_file,
            dir_file,
            budget,
        })
    }

    /// Path to the existing registry.
    #[must_use]
    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    /// Path the updated registry is written to.
    #[must_use]
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Path to the directory list.
    #[must_use]
    pub fn dir_file(&self) -> &Path {
        &self.dir_file
    }

    /// Addition budget.
    #[must_use]
    pub fn budget(&self) -> Budget {
        self.budget
    }
}

fn non_empty(path: PathBuf, name: &'static str) -> Result<PathBuf, ParamsError> {
    if path.as_os_str().is_empty() {
        Err(ParamsError::Empty(name))
    } else {
        Ok(path)
    }
}
