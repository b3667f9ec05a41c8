//! Report - Accumulated comparison result

use super::{DiffEntry, RelPath};
use serde::Serialize;

/// Comparison result with five disjoint buckets
///
/// Reports built for disjoint subtrees can be merged in any order. Call
/// [`Report::sort`] once all merges are done; the engine only hands out
/// sorted reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Confirmed equal by metadata (and hash, when enabled)
    pub identical: Vec<RelPath>,

    /// Present in source only
    pub source_only: Vec<RelPath>,

    /// Present in destination only
    pub destination_only: Vec<RelPath>,

    /// Metadata or hash disagrees
    pub different: Vec<DiffEntry>,

    /// Could not be compared
    pub errored: Vec<RelPath>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket-wise union with `other`
    pub fn merge(&mut self, other: Report) {
        self.identical.extend(other.identical);
        self.source_only.extend(other.source_only);
        self.destination_only.extend(other.destination_only);
        self.different.extend(other.different);
        self.errored.extend(other.errored);
    }

    pub fn merged(mut self, other: Report) -> Self {
        self.merge(other);
        self
    }

    /// Sort every bucket by its natural ordering
    pub fn sort(&mut self) {
        self.identical.sort();
        self.source_only.sort();
        self.destination_only.sort();
        self.different.sort();
        self.errored.sort();
    }

    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }

    /// Number of paths across all buckets
    pub fn len(&self) -> usize {
        self.identical.len()
            + self.source_only.len()
            + self.destination_only.len()
            + self.different.len()
            + self.errored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nothing differs, is missing, or errored
    pub fn is_clean(&self) -> bool {
        self.len() == self.identical.len()
    }
}
