//! Diff engine - Metadata comparison and recursive directory walking

mod compare;
mod walker;

pub use compare::{classify, Classification};
pub use walker::{compare, CompareOptions, DirectoryWalker, DEFAULT_MAX_CONCURRENT_HASHES};
