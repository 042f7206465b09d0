//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes a 256-bit BLAKE3 digest of a file's full content by
//! reading it in fixed-size chunks, so memory use per file is bounded by the
//! chunk size no matter how large the file is.
//!
//! Two files with the same size and the same digest are treated as identical.
//! A BLAKE3 collision would make two different files look like duplicates;
//! the probability (about 2^-128 for any pair) is accepted and not checked.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let (digest, bytes) = hasher.full_hash(Path::new("file.bin")).unwrap();
//! println!("{} ({} bytes)", hash_to_hex(&digest), bytes);
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{FileRef, HashError};

/// A 32-byte BLAKE3 digest.
pub type Digest = [u8; 32];

/// Default read buffer size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Smallest accepted chunk size.
const MIN_CHUNK_SIZE: usize = 4 * 1024;

/// Largest accepted chunk size. Each worker holds one buffer of this size.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Streaming BLAKE3 hasher.
///
/// `Hasher` holds no per-file state, so a single instance can be shared by
/// every worker in the hashing pool.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the read chunk size, clamped to 4 KiB ..= 64 MiB.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        self
    }

    /// Set the shutdown flag checked between chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Configured chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash the full content of the file at `path`.
    ///
    /// Returns the digest and the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or
    /// [`HashError::Interrupted`] if shutdown is requested mid-read.
    pub fn full_hash(&self, path: &Path) -> Result<(Digest, u64), HashError> {
        let file = File::open(path).map_err(|e| map_io_error(path, e))?;
        self.hash_reader(file, path)
    }

    /// Hash a walked file, checking that its length still matches the walk.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`full_hash`](Self::full_hash), returns
    /// [`HashError::SizeChanged`] if the file was truncated or extended
    /// after it was walked.
    pub fn hash_file(&self, file: &FileRef) -> Result<Digest, HashError> {
        let (digest, bytes) = self.full_hash(&file.path)?;
        if bytes != file.size {
            return Err(HashError::SizeChanged {
                path: file.path.clone(),
                expected: file.size,
                actual: bytes,
            });
        }
        Ok(digest)
    }

    /// Hash everything readable from `reader`.
    ///
    /// `path` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] on read failure or shutdown.
    pub fn hash_reader<R: Read>(
        &self,
        mut reader: R,
        path: &Path,
    ) -> Result<(Digest, u64), HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut total: u64 = 0;

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                    total += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(path, e)),
            }
        }

        Ok((*hasher.finalize().as_bytes(), total))
    }
}

/// Map an I/O error to the matching [`HashError`] variant.
fn map_io_error(path: &Path, error: std::io::Error) -> HashError {
    match error.kind() {
        ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: Arc::new(error),
        },
    }
}

/// Format a digest as 64 lowercase hex characters.
#[must_use]
pub fn hash_to_hex(digest: &Digest) -> String {
    blake3::Hash::from(*digest).to_hex().to_string()
}
