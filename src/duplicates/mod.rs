//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file bucketing
//! - Parallel content hashing of size collisions
//! - Digest grouping into confirmed duplicate groups
//! - Report construction

pub mod finder;
pub mod grouper;
pub mod groups;
pub mod report;

pub use finder::{
    default_workers, hash_buckets, validate_root, DuplicateFinder, FinderConfig, FinderError,
    HashConfig, HashStats, ScanSummary,
};
pub use grouper::{group_buckets, group_by_digest, GroupingStats, HashedBucket};
pub use groups::{
    group_by_size, BucketStats, DuplicateGroup, HashedFile, SizeBucket, SizeBucketer,
};
pub use report::Report;
