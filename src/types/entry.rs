//! DiffEntry - A common file compared on both sides

use super::{Paired, RelPath};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::time::SystemTime;

/// 256-bit content digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(pub [u8; 32]);

impl From<blake3::Hash> for Digest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Size and timestamps of one file on both sides
///
/// Fields are declared path first so the derived ordering is path-led.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairedMetadata {
    /// Relative path from the source root
    pub path: RelPath,

    /// Creation (birth) time
    #[serde(serialize_with = "serialize_times")]
    pub created: Paired<SystemTime>,

    /// Last content modification time
    #[serde(serialize_with = "serialize_times")]
    pub modified: Paired<SystemTime>,

    /// File size in bytes
    pub size: Paired<u64>,
}

impl PairedMetadata {
    /// Size, creation and modification time all agree
    pub fn is_matching(&self) -> bool {
        self.size.is_matching() && self.created.is_matching() && self.modified.is_matching()
    }
}

fn serialize_times<S: Serializer>(
    times: &Paired<SystemTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    times.map(DateTime::<Utc>::from).serialize(serializer)
}

/// A compared file, before or after confirmation hashing
///
/// Ordering is by path. Remaining fields only break ties, which never occur
/// within one report because paths are unique there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiffEntry {
    /// No content hash attached (metadata decided, or hashing failed)
    Pending(PairedMetadata),

    /// Content hashes computed for both sides
    Confirmed {
        metadata: PairedMetadata,
        hash: Paired<Digest>,
    },
}

impl DiffEntry {
    pub fn pending(metadata: PairedMetadata) -> Self {
        DiffEntry::Pending(metadata)
    }

    pub fn metadata(&self) -> &PairedMetadata {
        match self {
            DiffEntry::Pending(metadata) => metadata,
            DiffEntry::Confirmed { metadata, .. } => metadata,
        }
    }

    pub fn path(&self) -> &RelPath {
        &self.metadata().path
    }

    pub fn hash(&self) -> Option<&Paired<Digest>> {
        match self {
            DiffEntry::Pending(_) => None,
            DiffEntry::Confirmed { hash, .. } => Some(hash),
        }
    }

    /// Attach the digests of both sides
    ///
    /// A confirmed entry keeps its existing hash; the hash is write-once.
    pub fn confirm(self, hash: Paired<Digest>) -> Self {
        match self {
            DiffEntry::Pending(metadata) => DiffEntry::Confirmed { metadata, hash },
            confirmed @ DiffEntry::Confirmed { .. } => confirmed,
        }
    }

    /// Metadata agrees and, when hashed, the digests agree too
    pub fn is_matching(&self) -> bool {
        self.metadata().is_matching() && self.hash().map_or(true, Paired::is_matching)
    }
}

impl PartialOrd for DiffEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiffEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.metadata()
            .cmp(other.metadata())
            .then_with(|| self.hash().cmp(&other.hash()))
    }
}

#[derive(Serialize)]
struct DiffEntryRecord<'a> {
    #[serde(flatten)]
    metadata: &'a PairedMetadata,
    hash: Option<&'a Paired<Digest>>,
}

impl Serialize for DiffEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DiffEntryRecord {
            metadata: self.metadata(),
            hash: self.hash(),
        }
        .serialize(serializer)
    }
}
