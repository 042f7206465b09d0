//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "report": {
//!     "groups": [
//!       { "size": 1024, "digest": "abc123...", "paths": ["/a", "/b"] }
//!     ],
//!     "total_groups": 1,
//!     "duplicate_files": 2,
//!     "redundant_files": 1,
//!     "reclaimable_bytes": 1024
//!   },
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "hashed_files": 12,
//!     "scan_duration_ms": 1234,
//!     "interrupted": false,
//!     "warnings": [{ "path": "/locked", "message": "Permission denied: /locked" }],
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{Report, ScanSummary};
use crate::error::ExitCode;

/// A warning recorded during the scan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Path that was skipped
    pub path: String,
    /// Why it was skipped
    pub message: String,
    /// "walk" or "hash"
    pub stage: &'static str,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files walked
    pub total_files: usize,
    /// Bytes walked
    pub total_size: u64,
    /// Zero-byte files excluded by configuration
    pub excluded_empty: usize,
    /// Files dropped because their size was unique
    pub eliminated_by_size: usize,
    /// Files sent to hashing
    pub candidate_files: usize,
    /// Files that received a digest
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Files dropped because hashing failed
    pub failed_files: usize,
    /// Buckets dropped because the scan was interrupted
    pub abandoned_buckets: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Every skipped path
    pub warnings: Vec<JsonWarning>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        let warnings = summary
            .scan_errors
            .iter()
            .map(|err| JsonWarning {
                path: err.path().to_string_lossy().into_owned(),
                message: err.to_string(),
                stage: if err.is_hash_failure() { "hash" } else { "walk" },
            })
            .collect();

        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            excluded_empty: summary.excluded_empty,
            eliminated_by_size: summary.eliminated_by_size,
            candidate_files: summary.candidate_files,
            hashed_files: summary.hashed_files,
            bytes_hashed: summary.bytes_hashed,
            failed_files: summary.failed_files,
            abandoned_buckets: summary.abandoned_buckets,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            warnings,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// The duplicate report
    pub report: &'a Report,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output.
    ///
    /// # Example
    ///
    /// ```
    /// use dupescan::duplicates::{Report, ScanSummary};
    /// use dupescan::error::ExitCode;
    /// use dupescan::output::json::JsonOutput;
    ///
    /// let report = Report::default();
    /// let summary = ScanSummary::default();
    /// let output = JsonOutput::new(&report, &summary, ExitCode::NoDuplicates);
    /// assert!(output.to_json_pretty().unwrap().contains("\"total_groups\": 0"));
    /// ```
    #[must_use]
    pub fn new(report: &'a Report, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            report,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), super::OutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}
