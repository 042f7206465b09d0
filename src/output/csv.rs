//! CSV output formatter for duplicate scan results.
//!
//! One row is generated for each path of each duplicate group.
//!
//! # Columns
//!
//! - `group_id`: 1-based position of the group in the report
//! - `digest`: BLAKE3 content digest (hexadecimal)
//! - `size`: File size in bytes
//! - `path`: Absolute path to the file

use std::io;

use serde::Serialize;

use crate::duplicates::Report;

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    digest: &'a str,
    size: u64,
    path: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    report: &'a Report,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Write the CSV output to the given writer.
    ///
    /// A header row is written even when the report is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), super::OutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if self.report.is_empty() {
            csv_writer.write_record(["group_id", "digest", "size", "path"])?;
        }

        for (idx, group) in self.report.groups.iter().enumerate() {
            let digest = group.digest_hex();
            for path in group.paths() {
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    digest: &digest,
                    size: group.size(),
                    path: path.to_string_lossy().into_owned(),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string(&self) -> Result<String, super::OutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
