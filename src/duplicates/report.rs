//! Report construction from confirmed duplicate groups.
//!
//! The [`Report`] is the single artifact the engine hands back to callers.
//! Building it performs no I/O; rendering lives in [`crate::output`].

use serde::Serialize;

use super::groups::DuplicateGroup;

/// Ordered duplicate groups plus aggregate totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Duplicate groups, largest file size first
    pub groups: Vec<DuplicateGroup>,
    /// Number of groups
    pub total_groups: usize,
    /// Number of files that belong to some group
    pub duplicate_files: usize,
    /// Number of files that could be removed while keeping one per group
    pub redundant_files: usize,
    /// Bytes recoverable by keeping exactly one copy per group
    pub reclaimable_bytes: u64,
}

impl Report {
    /// Build a report from duplicate groups.
    ///
    /// Groups are ordered by size descending, then by first path, so the
    /// report does not depend on the order in which groups were found.
    ///
    /// # Example
    ///
    /// ```
    /// use dupescan::duplicates::{DuplicateGroup, Report};
    /// use std::path::PathBuf;
    ///
    /// let group = DuplicateGroup::new(
    ///     100,
    ///     [0u8; 32],
    ///     vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")],
    /// )
    /// .unwrap();
    ///
    /// let report = Report::build(vec![group]);
    /// assert_eq!(report.reclaimable_bytes, 200);
    /// assert_eq!(report.duplicate_files, 3);
    /// ```
    #[must_use]
    pub fn build(mut groups: Vec<DuplicateGroup>) -> Self {
        groups.sort_by(|a, b| {
            b.size()
                .cmp(&a.size())
                .then_with(|| a.paths().first().cmp(&b.paths().first()))
        });

        let duplicate_files = groups.iter().map(DuplicateGroup::len).sum();
        let redundant_files = groups.iter().map(DuplicateGroup::redundant_count).sum();
        let reclaimable_bytes = groups.iter().map(DuplicateGroup::reclaimable_bytes).sum();

        Self {
            total_groups: groups.len(),
            duplicate_files,
            redundant_files,
            reclaimable_bytes,
            groups,
        }
    }

    /// Whether any duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize(self.reclaimable_bytes).to_string()
    }
}
