//! Storage backend trait

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::{entry::Entry, error::PailResult, UnifiedPath};

/// Write disposition for `StorageBackend::write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    Append,
}

/// Requested timestamp for `StorageBackend::set_times`. Object stores
/// can refresh a time to "now" (best effort) but cannot set an
/// arbitrary one, so the two requests are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    Now,
    At(DateTime<Utc>),
}

/// Byte range for partial reads: start offset plus optional exclusive end.
pub type ByteRange = (u64, Option<u64>);

/// Uniform contract over a storage domain.
///
/// One implementation per URI scheme. Every operation takes a
/// `UnifiedPath` belonging to that scheme; handing a backend a path from
/// another domain is a caller bug.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Registry key (`file`, `s3`, ...).
    fn scheme(&self) -> &str;

    /// True when directories exist only as key prefixes. Callers may use
    /// this at the documented divergence points, nowhere else.
    fn synthetic_directories(&self) -> bool;

    /// Metadata for a path. `NotFound` when nothing is there; a
    /// synthetic-directory backend reports a directory when any key has
    /// the path as a prefix.
    async fn stat(&self, path: &UnifiedPath) -> PailResult<Entry>;

    /// Immediate children of a directory, unordered.
    async fn list(&self, path: &UnifiedPath) -> PailResult<Vec<Entry>>;

    /// Read file content, optionally a byte range.
    async fn read(&self, path: &UnifiedPath, range: Option<ByteRange>) -> PailResult<Bytes>;

    /// Write file content. Append on an object store is read+concat+put
    /// and therefore not atomic.
    async fn write(&self, path: &UnifiedPath, data: Bytes, mode: WriteMode) -> PailResult<Entry>;

    /// Create a directory. `exist_ok` tolerates an existing directory;
    /// `parents` creates intermediates.
    async fn create_dir(&self, path: &UnifiedPath, parents: bool, exist_ok: bool)
        -> PailResult<()>;

    /// Remove a file (or object).
    async fn remove_file(&self, path: &UnifiedPath) -> PailResult<()>;

    /// Remove an empty directory. `DirectoryNotEmpty` otherwise.
    async fn remove_dir(&self, path: &UnifiedPath) -> PailResult<()>;

    /// Rename within this backend. Atomic on the local filesystem;
    /// copy-then-delete (non-atomic) on object stores.
    async fn rename(&self, src: &UnifiedPath, dest: &UnifiedPath) -> PailResult<Entry>;

    /// Copy a single file within this backend.
    async fn copy(&self, src: &UnifiedPath, dest: &UnifiedPath, preserve: bool)
        -> PailResult<Entry>;

    /// Update access/modification times. `None` leaves a time unchanged.
    /// Backends without settable times apply a documented best effort
    /// for `TimeSpec::Now` and report `Unsupported` for explicit stamps.
    async fn set_times(
        &self,
        path: &UnifiedPath,
        atime: Option<TimeSpec>,
        mtime: Option<TimeSpec>,
    ) -> PailResult<()>;
}
