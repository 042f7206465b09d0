//! dupescan - content-verified duplicate file finder
//!
//! Walks a directory tree, buckets files by size, hashes every size
//! collision with BLAKE3 on a bounded worker pool and reports the confirmed
//! duplicate groups together with the storage that removing the extra copies
//! would reclaim.
//!
//! The engine lives in [`scanner`] and [`duplicates`]; [`cli`], [`config`]
//! and [`output`] form the command-line surface around it.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Settings;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// Returns the exit code for a completed scan. A scan with warnings or an
/// interrupted scan still completes and still writes its report.
///
/// # Errors
///
/// Returns an error for invalid settings, an unusable root path, or a
/// report that cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_cli(&cli);
    settings.validate()?;

    if cli.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(ExitCode::Success);
    }

    let root = cli
        .path
        .as_deref()
        .context("A directory to scan is required")?;

    let handler = signal::install_handler()?;
    let mut config = settings
        .finder_config()
        .with_shutdown_flag(handler.get_flag());

    if settings.progress && io::stderr().is_terminal() {
        config = config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    log::debug!("Effective settings: {:?}", settings);

    let finder = DuplicateFinder::new(config);
    let (report, summary) = finder.find_duplicates(root)?;
    let exit_code = ExitCode::from_outcome(&report, &summary);

    match cli.report {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_report(
                settings.format,
                &report,
                &summary,
                exit_code,
                &mut writer,
                false,
            )
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
            writer.flush()?;
            log::info!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let color = !cli.no_color && stdout.is_terminal();
            let mut writer = stdout.lock();
            output::write_report(
                settings.format,
                &report,
                &summary,
                exit_code,
                &mut writer,
                color,
            )
            .context("Failed to write report")?;
            writer.flush()?;
        }
    }

    if summary.warning_count() > 0 {
        log::warn!(
            "{} paths were skipped; rerun with -v for details",
            summary.warning_count()
        );
    }

    Ok(exit_code)
}
