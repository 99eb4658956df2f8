//! filetrack - Append-only registry of observed data files
//!
//! Maintains an "experiment list" per monitored machine: a registry of data
//! files keyed by filename and SHA-256 content hash, so that a downstream
//! archival and signing pipeline only has to process genuinely new files.
//!
//! The core is the update engine in [`session`]: it scans the configured
//! directories ([`scanner`]), hashes files whose names are not yet
//! registered, refuses to register the same content under a second name
//! ([`registry`]), and writes the updated registry to a fresh path
//! ([`output`]).

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod registry;
pub mod scanner;
pub mod session;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{CheckArgs, Cli, Commands, ListArgs, ReportFormat, UpdateArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::progress::Progress;
use crate::registry::Registry;
use crate::scanner::{DirectorySet, Scanner};
use crate::session::{SessionError, UpdateParams, UpdateSession};

/// Run the application for parsed command-line arguments.
///
/// Logging must already be initialized.
///
/// # Errors
///
/// Returns any fatal error; [`ExitCode::for_error`] maps it to an exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    log::debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Update(args) => run_update(&args, &config, cli.quiet),
        Commands::Check(args) => run_check(&args),
        Commands::List(args) => run_list(&args),
    }
}

fn run_update(args: &UpdateArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let max_files = args.max_files.or(config.max_files);
    let params = UpdateParams::new(
        &args.input_file,
        &args.output_file,
        &args.dir_file,
        max_files,
    )
    .map_err(SessionError::from)?;

    let handler = signal::install_handler();
    let mut session =
        UpdateSession::open(params, config.hasher())?.with_shutdown_flag(handler.get_flag());
    if !quiet && !args.no_progress {
        session = session.with_progress(Arc::new(Progress::new(false)));
    }

    let report = session.execute()?;

    let mut stdout = std::io::stdout().lock();
    match args.report {
        ReportFormat::Text => writeln!(stdout, "{}", report.render_text())?,
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
            writeln!(stdout, "{json}")?;
        }
    }

    Ok(ExitCode::Success)
}

fn run_check(args: &CheckArgs) -> Result<ExitCode> {
    let registry = Registry::load(&args.path).map_err(SessionError::from)?;

    let mut stdout = std::io::stdout().lock();
    if registry.inconsistencies().is_empty() {
        writeln!(
            stdout,
            "{}: {} entries, consistent",
            args.path.display(),
            registry.len()
        )?;
        return Ok(ExitCode::Success);
    }

    for issue in registry.inconsistencies() {
        writeln!(stdout, "{}: {}", args.path.display(), issue)?;
    }
    writeln!(
        stdout,
        "{}: {} entries, {} inconsistencies",
        args.path.display(),
        registry.len(),
        registry.inconsistencies().len()
    )?;
    Ok(ExitCode::ConfigError)
}

fn run_list(args: &ListArgs) -> Result<ExitCode> {
    let directories = DirectorySet::load(&args.dir_file).map_err(SessionError::from)?;

    let mut stdout = std::io::stdout().lock();
    // Scan errors are logged as warnings by the scanner
    for candidate in Scanner::new(&directories).scan().flatten() {
        writeln!(stdout, "{}", candidate.path.display())?;
    }
    Ok(ExitCode::Success)
}
