//! Duplicate finder implementation with staged detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - lazily enumerate regular files under the root
//! 2. **Size bucketing** - drop files whose size is unique (see [`crate::duplicates::groups`])
//! 3. **Content hashing** - BLAKE3 every remaining file on a bounded worker pool
//! 4. **Digest grouping** - confirm duplicates by (size, digest) (see [`crate::duplicates::grouper`])
//! 5. **Report** - order groups and total reclaimable bytes (see [`crate::duplicates::report`])
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
//! let (report, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("{} groups, {} reclaimable", report.total_groups, report.reclaimable_display());
//! println!("{} warnings", summary.warning_count());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::grouper::{group_buckets, HashedBucket};
use super::groups::{group_by_size, BucketStats, HashedFile, SizeBucket, SizeBucketer};
use super::report::Report;
use crate::progress::ProgressCallback;
use crate::scanner::{
    Digest, FileRef, HashError, Hasher, InodeId, ScanError, Walker, WalkerConfig,
    DEFAULT_CHUNK_SIZE,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Default hashing pool size: the available parallelism of the machine.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

// ============================================================================
// Content hashing stage
// ============================================================================

/// Configuration for the hashing stage.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of hashing workers (and so the cap on concurrently open files).
    pub workers: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("workers", &self.workers)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the worker count (minimum 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the hashing stage.
#[derive(Debug, Clone, Default)]
pub struct HashStats {
    /// Files that entered the stage
    pub input_files: usize,
    /// Files that received a digest
    pub hashed_files: usize,
    /// Hard-linked files that reused a digest instead of being read again
    pub shared_digests: usize,
    /// Files dropped because they could not be hashed
    pub failed_files: usize,
    /// Files never hashed because shutdown was requested
    pub skipped_files: usize,
    /// Bytes actually read
    pub bytes_hashed: u64,
    /// One error per failed file
    pub errors: Vec<HashError>,
    /// Whether the stage was cut short by shutdown
    pub interrupted: bool,
}

/// Files that are hashed together: one read, shared by hard-link aliases.
struct HashTask {
    bucket: usize,
    /// (position in bucket, file); tried in order until one can be opened
    members: Vec<(usize, FileRef)>,
}

enum TaskOutcome {
    /// Digest of the inode, plus aliases that could not be opened.
    Hashed {
        digest: Digest,
        failed: Vec<(usize, HashError)>,
    },
    /// No alias could be read; one error per member.
    Failed(Vec<HashError>),
    Skipped,
}

/// Split a bucket into hash tasks, folding paths that share an inode.
fn tasks_for_bucket(bucket: usize, files: Vec<FileRef>) -> Vec<HashTask> {
    let mut by_inode: HashMap<InodeId, usize> = HashMap::new();
    let mut tasks: Vec<HashTask> = Vec::with_capacity(files.len());

    for (pos, file) in files.into_iter().enumerate() {
        if let Some(inode) = file.inode {
            if let Some(&slot) = by_inode.get(&inode) {
                tasks[slot].members.push((pos, file));
                continue;
            }
            by_inode.insert(inode, tasks.len());
        }
        tasks.push(HashTask {
            bucket,
            members: vec![(pos, file)],
        });
    }

    tasks
}

fn run_task(
    task: &HashTask,
    hasher: &Hasher,
    config: &HashConfig,
    completed: &AtomicUsize,
) -> TaskOutcome {
    if config.is_shutdown_requested() {
        return TaskOutcome::Skipped;
    }

    let mut failed: Vec<(usize, HashError)> = Vec::new();
    let mut outcome = None;

    // Aliases share content, so any one that opens gives the digest for all.
    for (idx, (pos, file)) in task.members.iter().enumerate() {
        if file.size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({} MB): {}",
                file.size / (1024 * 1024),
                file.path.display()
            );
        }

        match hasher.hash_file(file) {
            Ok(digest) => {
                log::trace!("Hashed: {}", file.path.display());
                if let Some(ref callback) = config.progress_callback {
                    callback.on_item_completed(file.size);
                }
                outcome = Some(TaskOutcome::Hashed {
                    digest,
                    failed: std::mem::take(&mut failed),
                });
                break;
            }
            Err(HashError::Interrupted(_)) => return TaskOutcome::Skipped,
            Err(e @ (HashError::NotFound(_) | HashError::PermissionDenied(_))) => {
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
                failed.push((*pos, e));
            }
            Err(e) => {
                // The inode itself is bad; every remaining alias shares it.
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
                let mut errors: Vec<HashError> = failed.drain(..).map(|(_, err)| err).collect();
                let aliases: Vec<HashError> = task
                    .members
                    .iter()
                    .skip(idx + 1)
                    .map(|(_, alias)| e.relabel(&alias.path))
                    .collect();
                errors.push(e);
                errors.extend(aliases);
                outcome = Some(TaskOutcome::Failed(errors));
                break;
            }
        }
    }

    let outcome = outcome
        .unwrap_or_else(|| TaskOutcome::Failed(failed.into_iter().map(|(_, e)| e).collect()));

    let done = completed.fetch_add(task.members.len(), Ordering::Relaxed) + task.members.len();
    if let Some(ref callback) = config.progress_callback {
        let path = &task.members[0].1.path;
        callback.on_progress(done, path.to_string_lossy().as_ref());
    }

    outcome
}

/// Hash every file of every bucket on a bounded worker pool.
///
/// Returns one [`HashedBucket`] per input bucket, in input order. Within a
/// bucket, hashed files keep their original order. A file that fails to
/// hash is left out of its bucket and reported in [`HashStats::errors`].
/// If shutdown is requested, tasks that have not started are skipped and
/// their buckets are marked incomplete.
///
/// # Errors
///
/// Returns an error only if the worker pool cannot be created.
pub fn hash_buckets(
    buckets: Vec<SizeBucket>,
    hasher: &Hasher,
    config: &HashConfig,
) -> Result<(Vec<HashedBucket>, HashStats), rayon::ThreadPoolBuildError> {
    let mut stats = HashStats {
        input_files: buckets.iter().map(SizeBucket::len).sum(),
        ..Default::default()
    };

    let sizes: Vec<u64> = buckets.iter().map(|b| b.size).collect();
    let tasks: Vec<HashTask> = buckets
        .into_iter()
        .enumerate()
        .flat_map(|(idx, bucket)| tasks_for_bucket(idx, bucket.files))
        .collect();

    if tasks.is_empty() {
        log::debug!("Hashing: No files to process");
        return Ok((Vec::new(), stats));
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", stats.input_files);
    }

    log::info!(
        "Hashing {} files ({} reads) with {} workers",
        stats.input_files,
        tasks.len(),
        config.workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .thread_name(|i| format!("dupescan-hash-{}", i))
        .build()?;

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<(HashTask, TaskOutcome)> = pool.install(|| {
        tasks
            .into_par_iter()
            .map(|task| {
                let outcome = run_task(&task, hasher, config, &completed);
                (task, outcome)
            })
            .collect()
    });

    let mut assembled: Vec<(Vec<(usize, HashedFile)>, bool)> =
        sizes.iter().map(|_| (Vec::new(), true)).collect();

    for (task, outcome) in outcomes {
        let slot = &mut assembled[task.bucket];
        let members = task.members.len();
        match outcome {
            TaskOutcome::Hashed { digest, failed } => {
                let hashed = members - failed.len();
                stats.hashed_files += hashed;
                stats.shared_digests += hashed - 1;
                stats.bytes_hashed += sizes[task.bucket];
                stats.failed_files += failed.len();
                for (pos, file) in task.members {
                    if !failed.iter().any(|(bad, _)| *bad == pos) {
                        slot.0.push((pos, HashedFile { file, digest }));
                    }
                }
                stats.errors.extend(failed.into_iter().map(|(_, err)| err));
            }
            TaskOutcome::Failed(errors) => {
                stats.failed_files += members;
                stats.errors.extend(errors);
            }
            TaskOutcome::Skipped => {
                stats.skipped_files += members;
                slot.1 = false;
            }
        }
    }

    stats.interrupted = stats.skipped_files > 0 || config.is_shutdown_requested();
    if stats.interrupted {
        log::info!(
            "Hashing interrupted by shutdown signal ({} files skipped)",
            stats.skipped_files
        );
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    let hashed = sizes
        .into_iter()
        .zip(assembled)
        .map(|(size, (mut files, complete))| {
            files.sort_by_key(|(pos, _)| *pos);
            HashedBucket {
                size,
                files: files.into_iter().map(|(_, file)| file).collect(),
                complete,
            }
        })
        .collect();

    log::info!(
        "Hashing complete: {} hashed, {} failed, {} bytes read",
        stats.hashed_files,
        stats.failed_files,
        stats.bytes_hashed
    );

    Ok((hashed, stats))
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers. Defaults to the available parallelism.
    pub workers: usize,
    /// Whether zero-byte files take part in detection (default: true).
    pub include_empty: bool,
    /// Read buffer size for hashing.
    pub chunk_size: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("include_empty", &self.include_empty)
            .field("chunk_size", &self.chunk_size)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            include_empty: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the hashing worker count (minimum 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Include or exclude zero-byte files.
    #[must_use]
    pub fn with_include_empty(mut self, include: bool) -> Self {
        self.include_empty = include;
        self
    }

    /// Set the hashing read buffer size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
///
/// Carries the warning list alongside the counters: every excluded entry
/// or file shows up in `scan_errors`.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files walked
    pub total_files: usize,
    /// Total size of all walked files in bytes
    pub total_size: u64,
    /// Zero-byte files excluded by configuration
    pub excluded_empty: usize,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files that went on to hashing
    pub candidate_files: usize,
    /// Files that received a digest
    pub hashed_files: usize,
    /// Hard-linked files that reused a digest
    pub shared_digests: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Files dropped because hashing failed
    pub failed_files: usize,
    /// Buckets that confirmed no duplicates
    pub partial_buckets: usize,
    /// Buckets dropped because hashing was cut short
    pub abandoned_buckets: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Bytes recoverable by keeping one copy per group
    pub reclaimable_bytes: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Warnings encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Total number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.scan_errors.len()
    }

    /// Warnings raised while walking.
    #[must_use]
    pub fn unreadable_entries(&self) -> usize {
        self.scan_errors
            .iter()
            .filter(|e| !e.is_hash_failure())
            .count()
    }

    /// Warnings raised while hashing.
    #[must_use]
    pub fn hash_failures(&self) -> usize {
        self.scan_errors
            .iter()
            .filter(|e| e.is_hash_failure())
            .count()
    }

    fn apply_bucket_stats(&mut self, stats: &BucketStats) {
        self.total_files = stats.total_files;
        self.total_size = stats.total_size;
        self.excluded_empty = stats.excluded_empty;
        self.eliminated_by_size = stats.eliminated_unique;
        self.candidate_files = stats.candidate_files;
    }
}

/// Errors that stop a scan before it starts.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root does not exist, is not a directory, or cannot be read.
    #[error("Invalid root {path}: {reason}")]
    RootInvalid {
        /// The path that was given
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// The hashing worker pool could not be created.
    #[error("Failed to start hashing workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Check that `path` is a readable directory and return its canonical form.
///
/// # Errors
///
/// Returns [`FinderError::RootInvalid`] describing the first problem found.
pub fn validate_root(path: &Path) -> Result<PathBuf, FinderError> {
    let invalid = |reason: String| FinderError::RootInvalid {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    std::fs::read_dir(path).map_err(|e| invalid(format!("not readable: {}", e)))?;
    std::fs::canonicalize(path).map_err(|e| invalid(e.to_string()))
}

/// Duplicate finder that runs the staged detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupescan::duplicates::DuplicateFinder;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(Path::new(".")) {
///     Ok((report, summary)) => {
///         println!("Found {} duplicate groups", report.total_groups);
///         println!("Can reclaim {} bytes", report.reclaimable_bytes);
///         println!("{} files skipped with warnings", summary.warning_count());
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new().with_chunk_size(config.chunk_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `path`.
    ///
    /// Walks the tree once, buckets files by size as they arrive, hashes the
    /// candidates and returns the report with summary statistics. Unreadable
    /// entries and failed hashes become warnings in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::RootInvalid`] before scanning if the root is
    /// unusable, or [`FinderError::ThreadPool`] if workers cannot start.
    pub fn find_duplicates(&self, path: &Path) -> Result<(Report, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let root = validate_root(path)?;

        log::info!("Starting duplicate scan of {}", root.display());

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(&root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut summary = ScanSummary::default();
        let mut bucketer = SizeBucketer::new(self.config.include_empty);

        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(
                            bucketer.files_seen() + 1,
                            file.path.to_string_lossy().as_ref(),
                        );
                    }
                    bucketer.insert(file);
                }
                Err(e) => summary.scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        let (buckets, bucket_stats) = bucketer.finish();
        summary.apply_bucket_stats(&bucket_stats);

        log::info!(
            "Walk complete: {} files ({}), {} unreadable",
            summary.total_files,
            bytesize::ByteSize(summary.total_size),
            summary.scan_errors.len()
        );

        // Files never reached by the walk could belong to any group.
        if self.config.is_shutdown_requested() {
            log::info!("Scan interrupted during walk, no groups reported");
            summary.interrupted = true;
            summary.scan_duration = start_time.elapsed();
            return Ok((Report::default(), summary));
        }

        self.confirm(buckets, summary, start_time)
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// Use this when files come from another source than the walker. The
    /// sizes in the given `FileRef`s are trusted for bucketing; files whose
    /// length changed are dropped when hashed.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if workers cannot start.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileRef>,
    ) -> Result<(Report, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let (buckets, bucket_stats) = group_by_size(files, self.config.include_empty);
        summary.apply_bucket_stats(&bucket_stats);

        self.confirm(buckets, summary, start_time)
    }

    /// Hash, group and report the candidate buckets.
    fn confirm(
        &self,
        buckets: Vec<SizeBucket>,
        mut summary: ScanSummary,
        start_time: Instant,
    ) -> Result<(Report, ScanSummary), FinderError> {
        let hash_config = HashConfig {
            workers: self.config.workers.max(1),
            shutdown_flag: self.config.shutdown_flag.clone(),
            progress_callback: self.config.progress_callback.clone(),
        };

        let (hashed, hash_stats) = hash_buckets(buckets, &self.hasher, &hash_config)?;

        summary.hashed_files = hash_stats.hashed_files;
        summary.shared_digests = hash_stats.shared_digests;
        summary.bytes_hashed = hash_stats.bytes_hashed;
        summary.failed_files = hash_stats.failed_files;
        summary.interrupted = hash_stats.interrupted || self.config.is_shutdown_requested();
        summary
            .scan_errors
            .extend(hash_stats.errors.into_iter().map(ScanError::from));

        let (groups, grouping_stats) = group_buckets(hashed);
        summary.partial_buckets = grouping_stats.partial_buckets;
        summary.abandoned_buckets = grouping_stats.abandoned_buckets;
        log::debug!(
            "Grouping: {} groups, {} partial buckets, {} abandoned buckets",
            grouping_stats.groups,
            grouping_stats.partial_buckets,
            grouping_stats.abandoned_buckets
        );

        let report = Report::build(groups);
        summary.duplicate_groups = report.total_groups;
        summary.reclaimable_bytes = report.reclaimable_bytes;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} redundant files, {} reclaimable, {} warnings",
            report.total_groups,
            report.redundant_files,
            report.reclaimable_display(),
            summary.warning_count()
        );

        Ok((report, summary))
    }
}
