//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Lazy, single-threaded directory walking using walkdir
//! - Streaming content hashing with BLAKE3
//! - Inode identity capture for hard-linked paths
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming, fixed-size chunks)
//! - [`inode`]: Platform-specific (device, inode) identity
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod inode;
pub mod walker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

// Re-export main types
pub use hasher::{hash_to_hex, Digest, Hasher, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use inode::InodeId;
pub use walker::Walker;

/// A regular file discovered by the walker.
///
/// The size is captured once at walk time and never recomputed; every later
/// stage works from this cached value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Device and inode, when the platform exposes them
    pub inode: Option<InodeId>,
}

impl FileRef {
    /// Create a new FileRef without inode identity.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
            inode: None,
        }
    }

    /// Attach an inode identity.
    #[must_use]
    pub fn with_inode(mut self, inode: InodeId) -> Self {
        self.inode = Some(inode);
        self
    }
}

/// Configuration for directory walking.
///
/// Symbolic links are never followed; there is no option to change that.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `skip_hidden` - Whether to skip hidden files
    /// * `min_size` - Minimum file size filter
    /// * `max_size` - Maximum file size filter
    #[must_use]
    pub fn new(skip_hidden: bool, min_size: Option<u64>, max_size: Option<u64>) -> Self {
        Self {
            skip_hidden,
            min_size,
            max_size,
        }
    }
}

/// Recoverable problems recorded while scanning.
///
/// None of these abort a scan: the affected path is excluded and the
/// variant is kept in the scan summary as a warning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry vanished between listing and inspection.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be hashed after it was walked.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Path the warning refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) => path,
            Self::Io { path, .. } => path,
            Self::Hash(err) => err.path(),
        }
    }

    /// Whether this warning came from the hashing stage.
    #[must_use]
    pub fn is_hash_failure(&self) -> bool {
        matches!(self, Self::Hash(_))
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The file was removed after the walk.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The file length no longer matches the size seen by the walker.
    #[error("File changed since scan: {path} (expected {expected} bytes, read {actual})")]
    SizeChanged {
        /// Path of the modified file
        path: PathBuf,
        /// Size recorded by the walker
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) | Self::Interrupted(path) => path,
            Self::SizeChanged { path, .. } | Self::Io { path, .. } => path,
        }
    }

    /// The same failure reported against another path.
    ///
    /// Used for hard-linked aliases that share the failed read.
    #[must_use]
    pub fn relabel(&self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            Self::NotFound(_) => Self::NotFound(path),
            Self::PermissionDenied(_) => Self::PermissionDenied(path),
            Self::Interrupted(_) => Self::Interrupted(path),
            Self::SizeChanged {
                expected, actual, ..
            } => Self::SizeChanged {
                path,
                expected: *expected,
                actual: *actual,
            },
            Self::Io { source, .. } => Self::Io {
                path,
                source: Arc::clone(source),
            },
        }
    }
}
