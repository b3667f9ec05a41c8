//! Local disk implementation of [`FileSystem`]

use super::{DirEntry, FileMetadata, FileSystem};
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

/// Reads the real filesystem through `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            // DirEntry::file_type does not traverse symlinks
            let file_type = entry.file_type()?;
            entries.push(DirEntry {
                name: entry.file_name(),
                is_dir: file_type.is_dir(),
                is_symlink: file_type.is_symlink(),
            });
        }
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let metadata = std::fs::symlink_metadata(path)?;
        let modified = metadata.modified()?;

        // Filesystems without birth time fall back to mtime on both sides
        let created = match metadata.created() {
            Ok(created) => created,
            Err(e) if e.kind() == ErrorKind::Unsupported => modified,
            Err(e) => return Err(e),
        };

        Ok(FileMetadata {
            size: metadata.len(),
            created,
            modified,
        })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }
}
