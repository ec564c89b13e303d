//! Pluggable storage backend surface.
//!
//! A backend performs byte-level storage against one technology (local disk,
//! object store). Implementations live outside this crate; [`memory`]
//! provides a deterministic in-memory double for tests and embedding.
//!
//! Paths handed to a backend are always canonical virtual paths; backends map
//! them onto their own key or filesystem convention.

use std::io::Read;

use crate::entry::Entry;
use crate::error::Result;
use crate::path::VirtualPath;

pub mod memory;

pub use memory::MemoryBackend;

pub trait StorageBackend: Send + Sync {
    /// Flat listing of a directory. `recursive` includes every descendant.
    /// Listing order is backend-defined and must be stable per backend.
    fn list_contents(&self, path: &VirtualPath, recursive: bool) -> Result<Vec<Entry>>;

    fn has(&self, path: &VirtualPath) -> Result<bool>;

    /// Size in bytes for files; `None` for directories and missing paths
    /// (object stores cannot tell the two apart cheaply).
    fn size_of(&self, path: &VirtualPath) -> Result<Option<u64>>;

    fn create_dir(&self, path: &VirtualPath) -> Result<()>;

    fn put(&self, path: &VirtualPath, bytes: &[u8]) -> Result<()>;

    fn put_stream(&self, path: &VirtualPath, reader: &mut dyn Read) -> Result<u64>;

    fn copy(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()>;

    fn rename(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()>;

    fn delete(&self, path: &VirtualPath) -> Result<()>;

    /// Delete a batch of files in one backend round trip. Missing paths are
    /// skipped. The default falls back to one call per path.
    fn delete_many(&self, paths: &[VirtualPath]) -> Result<()> {
        for path in paths {
            self.delete(path)?;
        }
        Ok(())
    }

    /// Delete a directory subtree. Deleting a missing directory is a no-op.
    fn delete_dir(&self, path: &VirtualPath) -> Result<()>;

    fn read(&self, path: &VirtualPath) -> Result<Vec<u8>>;

    fn read_stream(&self, path: &VirtualPath) -> Result<(Box<dyn Read + Send>, u64)>;

    /// Native atomic recursive copy/move, when the backing store has one.
    /// The orchestrator falls back to enumerate-and-replicate when absent.
    fn native_recursive(&self) -> Option<&dyn NativeRecursiveOps> {
        None
    }
}

pub trait NativeRecursiveOps {
    fn copy_dir(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()>;

    fn move_dir(&self, src: &VirtualPath, dst: &VirtualPath) -> Result<()>;
}
