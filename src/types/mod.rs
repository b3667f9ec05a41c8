//! Core type definitions for treediff

mod entry;
mod error;
mod paired;
mod path;
mod report;

pub use entry::{DiffEntry, Digest, PairedMetadata};
pub use error::DiffError;
pub use paired::Paired;
pub use path::RelPath;
pub use report::Report;
