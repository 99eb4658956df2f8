//! Command-line interface definitions for filetrack.
//!
//! This module defines all CLI arguments and subcommands using the clap derive API.
//! Global options (verbosity, color, config file) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Add up to 50 new data files to a registry
//! filetrack update --input-file experiments.txt --output-file /tmp/out.txt \
//!     --dir-file dirs.txt --max-files 50
//!
//! # Machine-readable report
//! filetrack update ... --report json
//!
//! # Audit an existing registry
//! filetrack check experiments.txt
//!
//! # Show which files would be considered
//! filetrack list --dir-file dirs.txt
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Append-only registry of observed data files.
///
/// filetrack scans configured directories for data files, hashes the ones
/// not yet registered, and writes an updated registry to a fresh path.
#[derive(Debug, Parser)]
#[command(name = "filetrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (TOML); defaults to the platform config directory
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add new data files to a registry, writing the result to a fresh file
    Update(UpdateArgs),
    /// Check a registry for repeated filenames or hashes
    Check(CheckArgs),
    /// List the candidate files found through a directory list
    List(ListArgs),
}

/// Arguments for the update subcommand.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Existing registry to extend
    #[arg(long, value_name = "PATH", alias = "inputFile")]
    pub input_file: PathBuf,

    /// Where to write the updated registry (must not exist)
    #[arg(long, value_name = "PATH", alias = "outputFile")]
    pub output_file: PathBuf,

    /// File listing the directories to scan, one per line
    #[arg(long, value_name = "PATH", alias = "dirFile")]
    pub dir_file: PathBuf,

    /// Maximum number of new files to add in this run
    #[arg(long, value_name = "N", alias = "maxFiles", value_parser = parse_max_files)]
    pub max_files: Option<usize>,

    /// Format of the run report printed on stdout
    #[arg(long, value_enum, default_value = "text")]
    pub report: ReportFormat,

    /// Do not show a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the check subcommand.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Registry file to check
    #[arg(value_name = "REGISTRY")]
    pub path: PathBuf,
}

/// Arguments for the list subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// File listing the directories to scan, one per line
    #[arg(long, value_name = "PATH", alias = "dirFile")]
    pub dir_file: PathBuf,
}

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a positive addition cap.
///
/// # Examples
///
/// ```
/// use filetrack::cli::parse_max_files;
///
/// assert_eq!(parse_max_files("25").unwrap(), 25);
/// assert!(parse_max_files("0").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the value is not a positive integer.
pub fn parse_max_files(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if n == 0 {
        return Err("Must be a positive integer".to_string());
    }
    Ok(n)
}
