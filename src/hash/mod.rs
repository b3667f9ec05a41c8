//! Content hashing
//!
//! Digests are only ever compared for byte-exact equality, so any stable
//! content hash works; BLAKE3 is used for speed.

mod scheduler;

pub use scheduler::HashScheduler;

use crate::fs::FileSystem;
use crate::types::Digest;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the BLAKE3 digest of everything `reader` yields
///
/// The input is streamed in 64KB chunks.
pub fn hash_reader(mut reader: impl Read) -> io::Result<Digest> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().into())
}

/// Compute the digest of the file at `path` on `fs`
///
/// # Example
/// ```no_run
/// use treediff::fs::LocalFileSystem;
/// use treediff::hash::compute_hash;
/// use std::path::Path;
///
/// let digest = compute_hash(&LocalFileSystem, Path::new("file.txt"))?;
/// println!("{digest}");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn compute_hash(fs: &dyn FileSystem, path: &Path) -> io::Result<Digest> {
    hash_reader(fs.open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{LocalFileSystem, MemoryFileSystem};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_hash_empty_input() {
        let digest = hash_reader(io::empty()).unwrap();
        assert_eq!(digest, Digest::from(blake3::hash(b"")));
    }

    #[test]
    fn test_hash_matches_one_shot_blake3() {
        // Larger than one chunk to exercise the streaming loop
        let data = vec![0x5au8; CHUNK_SIZE * 2 + 17];
        let digest = hash_reader(&data[..]).unwrap();
        assert_eq!(digest, Digest::from(blake3::hash(&data)));
    }

    #[test]
    fn test_hash_deterministic_across_filesystems() {
        let content = b"Test content for hashing";

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();

        let mut memory = MemoryFileSystem::new();
        memory.file("/mem/file", &content[..]);

        let on_disk = compute_hash(&LocalFileSystem, file.path()).unwrap();
        let in_memory = compute_hash(&memory, Path::new("/mem/file")).unwrap();
        assert_eq!(on_disk, in_memory);
    }

    #[test]
    fn test_hash_different_content() {
        let a = hash_reader(&b"AAAAAAAAAA"[..]).unwrap();
        let b = hash_reader(&b"BBBBBBBBBB"[..]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_nonexistent_file() {
        let result = compute_hash(&LocalFileSystem, Path::new("/nonexistent/file.txt"));
        assert!(result.is_err());
    }
}
