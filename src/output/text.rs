//! Plain-text report.
//!
//! ```text
//! Size: 100 bytes  Digest: 6c1f3a9d0b2e47c58f19a07e4d2b6c3180e5f7a9b1c2d3e4f5061728394a5b6c
//! - /data/a.txt
//! - /data/b.txt
//!
//! Total duplicate files found: 2
//! Total reclaimable space: 100 bytes (100 B)
//! ```

use std::io::{self, Write};

use yansi::Paint;

use crate::duplicates::{Report, ScanSummary};

/// Text renderer for a report.
pub struct TextOutput<'a> {
    report: &'a Report,
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer without color.
    #[must_use]
    pub fn new(report: &'a Report, summary: &'a ScanSummary) -> Self {
        Self {
            report,
            summary,
            color: false,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for group in &self.report.groups {
            let header = format!(
                "Size: {} bytes  Digest: {}",
                group.size(),
                group.digest_hex()
            );
            if self.color {
                writeln!(writer, "{}", header.bold().cyan())?;
            } else {
                writeln!(writer, "{}", header)?;
            }
            for path in group.paths() {
                writeln!(writer, "- {}", path.display())?;
            }
            writeln!(writer)?;
        }

        if self.report.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
        }

        writeln!(
            writer,
            "Total duplicate files found: {}",
            self.report.duplicate_files
        )?;
        let reclaim = format!(
            "Total reclaimable space: {} bytes ({})",
            self.report.reclaimable_bytes,
            self.report.reclaimable_display()
        );
        if self.color {
            writeln!(writer, "{}", reclaim.green().bold())?;
        } else {
            writeln!(writer, "{}", reclaim)?;
        }

        self.write_notes(writer)
    }

    fn write_notes<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let warnings = self.summary.warning_count();
        if warnings > 0 {
            let line = format!(
                "Skipped {} paths with warnings ({} unreadable, {} failed to hash)",
                warnings,
                self.summary.unreadable_entries(),
                self.summary.hash_failures()
            );
            if self.color {
                writeln!(writer, "{}", line.yellow())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
        }

        if self.summary.interrupted {
            let line = "Scan interrupted: results are partial";
            if self.color {
                writeln!(writer, "{}", line.red().bold())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
        }

        Ok(())
    }

    /// Render to a string.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the error type mirrors `write_to`.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
