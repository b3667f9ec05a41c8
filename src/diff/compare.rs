//! Metadata fast-path comparison

use crate::fs::FileMetadata;
use crate::types::{DiffEntry, Paired, PairedMetadata, RelPath};

/// Outcome of comparing one common file by metadata alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Metadata matches and hashing is disabled
    Identical(RelPath),

    /// Size or a timestamp disagrees
    Different(DiffEntry),

    /// Metadata matches; content hashes must confirm
    NeedsHash(PairedMetadata),

    /// Attributes could not be read on at least one side
    Errored(RelPath),
}

/// Decide the classification of a common file without reading its content
///
/// 1. **Retrieval failure** on either side → `Errored`
/// 2. **Any of size, creation time, modification time differs** → `Different`.
///    Content is never hashed here: a metadata mismatch is taken as enough
///    evidence of difference.
/// 3. **All three match**:
///    - hashing disabled → `Identical`
///    - hashing enabled → `NeedsHash`
pub fn classify(
    path: RelPath,
    source: Option<FileMetadata>,
    destination: Option<FileMetadata>,
    compare_hashes: bool,
) -> Classification {
    let (source, destination) = match (source, destination) {
        (Some(source), Some(destination)) => (source, destination),
        _ => return Classification::Errored(path),
    };

    let metadata = PairedMetadata {
        path,
        created: Paired::new(source.created, destination.created),
        modified: Paired::new(source.modified, destination.modified),
        size: Paired::new(source.size, destination.size),
    };

    if !metadata.is_matching() {
        return Classification::Different(DiffEntry::pending(metadata));
    }

    if compare_hashes {
        Classification::NeedsHash(metadata)
    } else {
        Classification::Identical(metadata.path)
    }
}
