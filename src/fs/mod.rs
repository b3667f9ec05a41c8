//! Filesystem access layer
//!
//! The comparison engine never touches `std::fs` directly. It lists
//! directories, reads attributes and opens files through [`FileSystem`], so the
//! same engine runs against the local disk or an in-memory tree.

mod local;
mod memory;

pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

/// One directory entry as returned by [`FileSystem::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Last path component, exactly as stored on disk
    pub name: OsString,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            is_symlink: false,
        }
    }

    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            is_symlink: false,
        }
    }
}

/// Attributes used by the metadata fast path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub created: SystemTime,
    pub modified: SystemTime,
}

/// Capability interface over a directory tree
///
/// Implementations must not follow symbolic links: `list` reports them with
/// `is_symlink` set and the engine skips them.
pub trait FileSystem: Send + Sync {
    /// Entries directly inside `dir`
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;

    /// Size and timestamps of the file at `path`
    fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;

    /// Open the file at `path` for reading its content
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}
