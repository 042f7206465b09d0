//! Inode identity for hard-linked paths.
//!
//! # Overview
//!
//! Hard links are multiple directory entries pointing to the same inode.
//! They are reported as duplicates like any other paths, but their content
//! only needs to be read once: the hashing stage uses [`InodeId`] to share a
//! single digest between aliases of the same file.
//!
//! # Platform Support
//!
//! - **Unix**: (device_id, inode) pairs from file metadata
//! - **Other**: not available; every path is hashed independently
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::InodeId;
//!
//! let meta = std::fs::symlink_metadata("some/file.txt").unwrap();
//! if let Some(id) = InodeId::from_metadata(&meta) {
//!     println!("device {} inode {}", id.dev, id.ino);
//! }
//! ```

use std::fs::Metadata;

use serde::Serialize;

/// Device and inode number of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InodeId {
    /// Device identifier
    pub dev: u64,
    /// Inode number on that device
    pub ino: u64,
}

impl InodeId {
    /// Create an identity from raw numbers.
    #[must_use]
    pub const fn new(dev: u64, ino: u64) -> Self {
        Self { dev, ino }
    }

    /// Read the identity from file metadata.
    ///
    /// Returns `None` on platforms without stable inode numbers.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Read the identity from file metadata.
    ///
    /// Windows only exposes the file index through an open handle, which the
    /// walker does not hold, so identity is unavailable there.
    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }

    /// Check if inode identity is supported on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}
