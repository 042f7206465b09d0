//! Process exit codes and structured error output.

use serde::Serialize;

use crate::duplicates::{FinderError, Report, ScanSummary};

/// Exit codes for the dupescan binary.
///
/// - 0: duplicates found
/// - 1: general error
/// - 2: no duplicates found
/// - 3: completed, but some files were skipped with warnings
/// - 4: the root path is missing, not a directory or unreadable
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Scan completed but some entries or files produced warnings.
    PartialSuccess = 3,
    /// The root path cannot be scanned.
    RootInvalid = 4,
    /// Scan was interrupted by the user.
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
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::RootInvalid => "DS004",
            Self::Interrupted => "DS130",
        }
    }

    /// Exit code for a completed (possibly interrupted) scan.
    ///
    /// Interruption beats warnings, and warnings beat the found/not found
    /// distinction.
    #[must_use]
    pub fn from_outcome(report: &Report, summary: &ScanSummary) -> Self {
        if summary.interrupted {
            Self::Interrupted
        } else if summary.warning_count() > 0 {
            Self::PartialSuccess
        } else if report.is_empty() {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }

    /// Exit code for a fatal error returned by `run_app`.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::RootInvalid { .. }) => Self::RootInvalid,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
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
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
