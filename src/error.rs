//! Structured error handling and exit codes.

use serde::Serialize;

use crate::config::ConfigError;
use crate::session::SessionError;

/// Exit codes for the filetrack application.
///
/// - 0: Success (including runs with conflicts or unreadable directories)
/// - 1: General error (e.g. a file could not be hashed)
/// - 2: Configuration error (bad paths, bad budget, bad config file,
///   inconsistent registry on `check`)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed.
    Success = 0,
    /// General error: the session aborted.
    GeneralError = 1,
    /// Configuration error: detected before scanning.
    ConfigError = 2,
    /// Interrupted: stopped by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FT000",
            Self::GeneralError => "FT001",
            Self::ConfigError => "FT002",
            Self::Interrupted => "FT130",
        }
    }

    /// Pick the exit code for a fatal error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(session_err) = err.downcast_ref::<SessionError>() {
            if matches!(session_err, SessionError::Interrupted) {
                return Self::Interrupted;
            }
            if session_err.is_config_error() {
                return Self::ConfigError;
            }
            return Self::GeneralError;
        }
        if err.downcast_ref::<ConfigError>().is_some() {
            return Self::ConfigError;
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FT001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Error chain, outermost first
    pub causes: Vec<String>,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
