//! In-memory implementation of [`FileSystem`]
//!
//! Used by tests and benchmarks to build exact trees (including timestamps,
//! which cannot be controlled on a real disk) and to inject failures.

use super::{DirEntry, FileMetadata, FileSystem};
use std::collections::{BTreeMap, HashSet};
use std::io::{self, Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File {
        contents: Vec<u8>,
        created: SystemTime,
        modified: SystemTime,
    },
    Symlink,
}

/// Directory tree held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    nodes: BTreeMap<PathBuf, Node>,
    unlistable: HashSet<PathBuf>,
    no_metadata: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
}

impl MemoryFileSystem {
    /// Timestamp given to files added without explicit times
    pub fn default_time() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and any missing parents
    pub fn dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir);
        }
        self
    }

    /// Add a file created and modified at [`MemoryFileSystem::default_time`]
    pub fn file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> &mut Self {
        let time = Self::default_time();
        self.file_with_times(path, contents, time, time)
    }

    pub fn file_with_times(
        &mut self,
        path: impl AsRef<Path>,
        contents: impl Into<Vec<u8>>,
        created: SystemTime,
        modified: SystemTime,
    ) -> &mut Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.dir(parent);
        }
        self.nodes.insert(
            path.to_path_buf(),
            Node::File {
                contents: contents.into(),
                created,
                modified,
            },
        );
        self
    }

    pub fn symlink(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.dir(parent);
        }
        self.nodes.insert(path.to_path_buf(), Node::Symlink);
        self
    }

    /// Make `list` fail for this directory
    pub fn fail_listing(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.unlistable.insert(path.as_ref().to_path_buf());
        self
    }

    /// Make `metadata` fail for this file
    pub fn fail_metadata(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.no_metadata.insert(path.as_ref().to_path_buf());
        self
    }

    /// Make `open` fail for this file
    pub fn fail_read(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.unreadable.insert(path.as_ref().to_path_buf());
        self
    }

    fn denied(path: &Path) -> io::Error {
        io::Error::new(
            ErrorKind::PermissionDenied,
            format!("access denied: {}", path.display()),
        )
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            ErrorKind::NotFound,
            format!("no such file or directory: {}", path.display()),
        )
    }
}

impl FileSystem for MemoryFileSystem {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        if self.unlistable.contains(dir) {
            return Err(Self::denied(dir));
        }
        match self.nodes.get(dir) {
            Some(Node::Dir) => {}
            Some(_) => {
                return Err(io::Error::new(
                    ErrorKind::Other,
                    format!("not a directory: {}", dir.display()),
                ))
            }
            None => return Err(Self::not_found(dir)),
        }

        Ok(self
            .nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .filter_map(|(path, node)| {
                Some(DirEntry {
                    name: path.file_name()?.to_os_string(),
                    is_dir: matches!(node, Node::Dir),
                    is_symlink: matches!(node, Node::Symlink),
                })
            })
            .collect())
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        if self.no_metadata.contains(path) {
            return Err(Self::denied(path));
        }
        match self.nodes.get(path) {
            Some(Node::File {
                contents,
                created,
                modified,
            }) => Ok(FileMetadata {
                size: contents.len() as u64,
                created: *created,
                modified: *modified,
            }),
            Some(Node::Dir) | Some(Node::Symlink) => Ok(FileMetadata {
                size: 0,
                created: Self::default_time(),
                modified: Self::default_time(),
            }),
            None => Err(Self::not_found(path)),
        }
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        if self.unreadable.contains(path) {
            return Err(Self::denied(path));
        }
        match self.nodes.get(path) {
            Some(Node::File { contents, .. }) => Ok(Box::new(Cursor::new(contents.clone()))),
            Some(_) => Err(io::Error::new(
                ErrorKind::Other,
                format!("not a regular file: {}", path.display()),
            )),
            None => Err(Self::not_found(path)),
        }
    }
}
