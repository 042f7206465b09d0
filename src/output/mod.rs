//! Report renderers.
//!
//! - [`text`]: human-readable listing, one block per group plus a summary
//! - [`json`]: the full report and scan summary for scripting
//! - [`csv`]: one row per duplicate path for spreadsheets
//!
//! Every renderer writes to any [`std::io::Write`]; choosing stdout or a
//! report file is up to the caller.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::cli::OutputFormat;
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::error::ExitCode;
//! use dupescan::output::write_report;
//! use std::path::Path;
//!
//! let (report, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let code = ExitCode::from_outcome(&report, &summary);
//! write_report(OutputFormat::Json, &report, &summary, code, &mut std::io::stdout(), false).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::io;

use thiserror::Error;

use crate::cli::OutputFormat;
use crate::duplicates::{Report, ScanSummary};
use crate::error::ExitCode;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// Errors that can occur while rendering a report.
#[derive(Debug, Error)]
pub enum OutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Render `report` in `format` to `writer`.
///
/// `color` only affects the text format.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or writing fails.
pub fn write_report<W: io::Write>(
    format: OutputFormat,
    report: &Report,
    summary: &ScanSummary,
    exit_code: ExitCode,
    writer: &mut W,
    color: bool,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report, summary)
            .with_color(color)
            .write_to(writer)?,
        OutputFormat::Json => JsonOutput::new(report, summary, exit_code).write_to(writer)?,
        OutputFormat::Csv => CsvOutput::new(report).write_to(writer)?,
    }
    Ok(())
}
