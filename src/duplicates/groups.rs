//! Size bucketing and duplicate group types.
//!
//! # Overview
//!
//! Size bucketing is the first narrowing step of duplicate detection. Files
//! are grouped by their exact size, since files with different sizes cannot
//! be duplicates. Buckets with a single member are dropped before any file
//! content is read.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::FileRef;
//! use dupescan::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileRef::new(PathBuf::from("/file1.txt"), 1024, SystemTime::now()),
//!     FileRef::new(PathBuf::from("/file2.txt"), 1024, SystemTime::now()),
//!     FileRef::new(PathBuf::from("/file3.txt"), 2048, SystemTime::now()),
//! ];
//!
//! let (buckets, stats) = group_by_size(files, true);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.candidate_files, 2);
//! assert_eq!(buckets.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::scanner::{hash_to_hex, Digest, FileRef};

/// Files sharing one exact byte size, in walk order.
#[derive(Debug, Clone)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<FileRef>,
}

impl SizeBucket {
    /// Create a bucket with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileRef>) -> Self {
        Self { size, files }
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Statistics from the size bucketing stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketStats {
    /// Total number of files offered to the bucketer
    pub total_files: usize,
    /// Total size of all offered files in bytes
    pub total_size: u64,
    /// Zero-byte files left out because empty files were excluded
    pub excluded_empty: usize,
    /// Number of distinct sizes seen
    pub unique_sizes: usize,
    /// Files dropped because no other file had their size
    pub eliminated_unique: usize,
    /// Files kept for hashing
    pub candidate_files: usize,
    /// Buckets kept for hashing
    pub candidate_buckets: usize,
}

impl BucketStats {
    /// Percentage of files eliminated by size bucketing.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Incremental size bucketer.
///
/// Feed it files one at a time as the walker yields them, then call
/// [`finish`](Self::finish) to drop singleton buckets.
#[derive(Debug)]
pub struct SizeBucketer {
    buckets: HashMap<u64, Vec<FileRef>>,
    include_empty: bool,
    stats: BucketStats,
}

impl Default for SizeBucketer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SizeBucketer {
    /// Create a bucketer.
    ///
    /// # Arguments
    ///
    /// * `include_empty` - Whether zero-byte files take part in detection
    #[must_use]
    pub fn new(include_empty: bool) -> Self {
        Self {
            buckets: HashMap::new(),
            include_empty,
            stats: BucketStats::default(),
        }
    }

    /// Add one file to its size bucket.
    pub fn insert(&mut self, file: FileRef) {
        self.stats.total_files += 1;
        self.stats.total_size += file.size;

        if file.size == 0 && !self.include_empty {
            self.stats.excluded_empty += 1;
            log::trace!("Excluding empty file: {}", file.path.display());
            return;
        }

        self.buckets.entry(file.size).or_default().push(file);
    }

    /// Number of files inserted so far.
    #[must_use]
    pub fn files_seen(&self) -> usize {
        self.stats.total_files
    }

    /// Drop singleton buckets and return the rest, largest size first.
    #[must_use]
    pub fn finish(self) -> (Vec<SizeBucket>, BucketStats) {
        let mut stats = self.stats;
        stats.unique_sizes = self.buckets.len();

        let mut retained: Vec<SizeBucket> = self
            .buckets
            .into_iter()
            .filter_map(|(size, files)| {
                if files.len() < 2 {
                    stats.eliminated_unique += files.len();
                    if let Some(file) = files.first() {
                        log::trace!("Eliminated unique size {}: {}", size, file.path.display());
                    }
                    None
                } else {
                    stats.candidate_files += files.len();
                    stats.candidate_buckets += 1;
                    log::debug!("Size bucket {} bytes: {} candidates", size, files.len());
                    Some(SizeBucket::with_files(size, files))
                }
            })
            .collect();

        retained.sort_unstable_by(|a, b| b.size.cmp(&a.size));

        log::info!(
            "Size bucketing complete: {} files → {} candidates in {} buckets ({:.1}% eliminated)",
            stats.total_files,
            stats.candidate_files,
            stats.candidate_buckets,
            stats.elimination_rate()
        );

        (retained, stats)
    }
}

/// Group files by size in one call.
///
/// Returns the buckets with two or more members, ordered by size
/// descending, plus bucketing statistics.
///
/// # Example
///
/// ```
/// use dupescan::scanner::FileRef;
/// use dupescan::duplicates::group_by_size;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let files = vec![
///     FileRef::new(PathBuf::from("/a.txt"), 0, SystemTime::now()),
///     FileRef::new(PathBuf::from("/b.txt"), 0, SystemTime::now()),
/// ];
///
/// let (buckets, _) = group_by_size(files.clone(), true);
/// assert_eq!(buckets.len(), 1);
///
/// let (buckets, stats) = group_by_size(files, false);
/// assert!(buckets.is_empty());
/// assert_eq!(stats.excluded_empty, 2);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRef>,
    include_empty: bool,
) -> (Vec<SizeBucket>, BucketStats) {
    let mut bucketer = SizeBucketer::new(include_empty);
    for file in files {
        bucketer.insert(file);
    }
    bucketer.finish()
}

/// A file together with its content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// The walked file
    pub file: FileRef,
    /// BLAKE3 digest of its content
    pub digest: Digest,
}

/// Confirmed set of files with identical size and content.
///
/// Always holds at least two paths. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    size: u64,
    #[serde(serialize_with = "serialize_digest")]
    digest: Digest,
    paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Build a group, or `None` if fewer than two paths are given.
    #[must_use]
    pub fn new(size: u64, digest: Digest, paths: Vec<PathBuf>) -> Option<Self> {
        if paths.len() < 2 {
            return None;
        }
        Some(Self {
            size,
            digest,
            paths,
        })
    }

    /// Size of each member in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Shared content digest.
    #[must_use]
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Member paths in first-seen order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the group has no members. Never true for a built group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Copies beyond the one that would be kept.
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.paths.len() - 1
    }

    /// Bytes recoverable by keeping one copy: size × (members − 1).
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * self.redundant_count() as u64
    }
}

fn serialize_digest<S: Serializer>(digest: &Digest, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(digest))
}
