//! Digest grouping: turns hashed buckets into confirmed duplicate groups.
//!
//! Every member of a [`HashedBucket`] already shares one size, so grouping by
//! digest inside a bucket is the same as grouping by (size, digest). Digests
//! keep the order in which they were first seen, and paths keep walk order,
//! so the output is deterministic for a deterministic walk.

use std::collections::HashMap;
use std::path::PathBuf;

use super::groups::{DuplicateGroup, HashedFile};
use crate::scanner::Digest;

/// Hashing results for one size bucket.
#[derive(Debug, Clone)]
pub struct HashedBucket {
    /// Size shared by every file in the bucket
    pub size: u64,
    /// Successfully hashed files, in walk order
    pub files: Vec<HashedFile>,
    /// False when cancellation left some members unhashed
    pub complete: bool,
}

/// Statistics from the grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Buckets that produced no group because too few members survived
    pub partial_buckets: usize,
    /// Buckets skipped because hashing was cut short
    pub abandoned_buckets: usize,
    /// Groups emitted
    pub groups: usize,
}

/// Group the hashed files of one bucket by digest.
///
/// Digests held by a single file are discarded.
#[must_use]
pub fn group_by_digest(size: u64, files: Vec<HashedFile>) -> Vec<DuplicateGroup> {
    let mut index: HashMap<Digest, usize> = HashMap::new();
    let mut ordered: Vec<(Digest, Vec<PathBuf>)> = Vec::new();

    for hashed in files {
        debug_assert_eq!(hashed.file.size, size, "file size differs from bucket size");
        match index.get(&hashed.digest) {
            Some(&slot) => ordered[slot].1.push(hashed.file.path),
            None => {
                index.insert(hashed.digest, ordered.len());
                ordered.push((hashed.digest, vec![hashed.file.path]));
            }
        }
    }

    ordered
        .into_iter()
        .filter_map(|(digest, paths)| DuplicateGroup::new(size, digest, paths))
        .collect()
}

/// Group every completed bucket.
///
/// Incomplete buckets are dropped whole so that a cancelled run never
/// reports a group that is missing members.
#[must_use]
pub fn group_buckets(buckets: Vec<HashedBucket>) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();
    let mut groups = Vec::new();

    for bucket in buckets {
        if !bucket.complete {
            stats.abandoned_buckets += 1;
            log::debug!("Abandoning incomplete bucket of {} bytes", bucket.size);
            continue;
        }

        let size = bucket.size;
        let found = group_by_digest(size, bucket.files);
        if found.is_empty() {
            stats.partial_buckets += 1;
            log::trace!("No duplicates confirmed in bucket of {} bytes", size);
        }
        for group in &found {
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                group.digest_hex(),
                group.len(),
                size
            );
        }
        groups.extend(found);
    }

    stats.groups = groups.len();
    (groups, stats)
}
