//! Recursive directory comparison
//!
//! One call compares one (source, destination) directory pair:
//!
//! 1. List both sides (symlinks dropped), partition into directories and files
//! 2. Names on one side only go straight to `source_only` / `destination_only`
//! 3. Common directories are compared recursively and their reports merged
//! 4. Common files go through the metadata fast path; with hashing enabled,
//!    metadata-equal files are confirmed by content hash in their own task
//!
//! Each call owns its `Report`. Children hand theirs back to the single
//! parent that awaits them, so reports need no locking.

use super::compare::{classify, Classification};
use crate::fs::{FileMetadata, FileSystem};
use crate::hash::HashScheduler;
use crate::types::{DiffEntry, DiffError, Paired, PairedMetadata, RelPath, Report};
use crate::ui::{NoProgress, ProgressSink};
use globset::GlobSet;
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Default cap on simultaneously running hash jobs
pub const DEFAULT_MAX_CONCURRENT_HASHES: usize = 8;

type WalkFuture = Pin<Box<dyn Future<Output = Result<Report, DiffError>> + Send>>;

/// What to compare and how
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Confirm metadata-equal files by content hash
    pub compare_hashes: bool,

    /// Recurse into sibling directories concurrently
    pub parallel_dirs: bool,

    /// Entries matching these globs (by name or relative path) are skipped
    pub exclude: GlobSet,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            compare_hashes: false,
            parallel_dirs: false,
            exclude: GlobSet::empty(),
        }
    }
}

impl CompareOptions {
    pub fn with_hashes(compare_hashes: bool) -> Self {
        Self {
            compare_hashes,
            ..Self::default()
        }
    }

    fn is_excluded(&self, name: &OsStr, path: &RelPath) -> bool {
        !self.exclude.is_empty()
            && (self.exclude.is_match(Path::new(name)) || self.exclude.is_match(path.to_string()))
    }
}

/// Entries of one directory, split by kind and keyed by on-disk name
#[derive(Debug, Default)]
struct Partition {
    dirs: BTreeSet<OsString>,
    files: BTreeSet<OsString>,
}

/// Outcome of hashing a metadata-equal file
#[derive(Debug)]
enum Confirmation {
    Identical(RelPath),
    Different(DiffEntry),
}

/// Compares directory trees through a [`FileSystem`]
///
/// Cloning is cheap; clones share the filesystem, hash scheduler and
/// progress sink.
#[derive(Clone)]
pub struct DirectoryWalker {
    fs: Arc<dyn FileSystem>,
    scheduler: Arc<HashScheduler>,
    progress: Arc<dyn ProgressSink>,
    options: Arc<CompareOptions>,
}

impl DirectoryWalker {
    pub fn new(fs: Arc<dyn FileSystem>, options: CompareOptions) -> Self {
        Self {
            fs,
            scheduler: Arc::new(HashScheduler::new(DEFAULT_MAX_CONCURRENT_HASHES)),
            progress: Arc::new(NoProgress),
            options: Arc::new(options),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<HashScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Compare `source` against `destination`
    ///
    /// Paths in the report are relative to `base`, which must be `source`
    /// or one of its ancestors. The returned report is sorted.
    ///
    /// # Errors
    /// * `DiffError::RootUnavailable` if either root cannot be listed
    /// * `DiffError::Config` if `source` is not under `base`
    ///
    /// Failures below the roots never abort the run; they are recorded in
    /// the report instead.
    pub async fn compare(
        &self,
        source: &Path,
        destination: &Path,
        base: &Path,
    ) -> Result<Report, DiffError> {
        let relative = RelPath::relative_to(base, source).ok_or_else(|| {
            DiffError::Config(format!(
                "Source {:?} is not inside base directory {:?}",
                source, base
            ))
        })?;

        let report = self
            .walk(source.to_path_buf(), destination.to_path_buf(), relative)
            .await
            .map_err(DiffError::at_root)?;
        Ok(report.sorted())
    }

    fn walk(&self, source: PathBuf, destination: PathBuf, relative: RelPath) -> WalkFuture {
        let walker = self.clone();
        Box::pin(async move { walker.walk_dir(source, destination, relative).await })
    }

    async fn walk_dir(
        self,
        source: PathBuf,
        destination: PathBuf,
        relative: RelPath,
    ) -> Result<Report, DiffError> {
        let (source_entries, destination_entries) = tokio::join!(
            self.list(source.clone(), &relative),
            self.list(destination.clone(), &relative)
        );
        let source_entries =
            source_entries.map_err(|e| DiffError::directory_unavailable(&source, e))?;
        let destination_entries =
            destination_entries.map_err(|e| DiffError::directory_unavailable(&destination, e))?;

        let mut report = Report::new();

        // ═══════════════════════════════════════════════════════════
        // One-sided entries: recorded as-is, never descended into
        // ═══════════════════════════════════════════════════════════

        for name in source_entries
            .dirs
            .difference(&destination_entries.dirs)
            .chain(source_entries.files.difference(&destination_entries.files))
        {
            report.source_only.push(relative.join(name));
        }
        for name in destination_entries
            .dirs
            .difference(&source_entries.dirs)
            .chain(destination_entries.files.difference(&source_entries.files))
        {
            report.destination_only.push(relative.join(name));
        }
        let exclusive = (report.source_only.len() + report.destination_only.len()) as u64;
        self.progress.add_units(exclusive);
        self.progress.complete_units(exclusive);

        for name in source_entries.dirs.intersection(&destination_entries.files) {
            debug!(path = %relative.join(name), "directory in source, file in destination");
        }
        for name in source_entries.files.intersection(&destination_entries.dirs) {
            debug!(path = %relative.join(name), "file in source, directory in destination");
        }

        // ═══════════════════════════════════════════════════════════
        // Common directories
        // ═══════════════════════════════════════════════════════════

        let common_dirs: Vec<&OsString> = source_entries
            .dirs
            .intersection(&destination_entries.dirs)
            .collect();
        self.progress.add_units(common_dirs.len() as u64);

        if self.options.parallel_dirs {
            let mut children = JoinSet::new();
            for name in common_dirs {
                let child = relative.join(name);
                let future = self.walk(source.join(name), destination.join(name), child.clone());
                children.spawn(async move { (child, future.await) });
            }
            while let Some(joined) = children.join_next().await {
                let (child, result) = joined.map_err(map_join_error)?;
                self.absorb_child(&mut report, child, result);
            }
        } else {
            for name in common_dirs {
                let child = relative.join(name);
                let result = self
                    .walk(source.join(name), destination.join(name), child.clone())
                    .await;
                self.absorb_child(&mut report, child, result);
            }
        }

        // ═══════════════════════════════════════════════════════════
        // Common files
        // ═══════════════════════════════════════════════════════════

        let common_files: Vec<&OsString> = source_entries
            .files
            .intersection(&destination_entries.files)
            .collect();
        self.progress.add_units(common_files.len() as u64);

        let mut confirmations = JoinSet::new();
        for name in common_files {
            let path = relative.join(name);
            let source_file = source.join(name);
            let destination_file = destination.join(name);

            let (source_meta, destination_meta) = self
                .fetch_metadata(&path, source_file.clone(), destination_file.clone())
                .await?;

            match classify(path, source_meta, destination_meta, self.options.compare_hashes) {
                Classification::NeedsHash(metadata) => {
                    let walker = self.clone();
                    confirmations.spawn(async move {
                        walker
                            .confirm(metadata, source_file, destination_file)
                            .await
                    });
                    continue;
                }
                Classification::Identical(path) => report.identical.push(path),
                Classification::Different(entry) => report.different.push(entry),
                Classification::Errored(path) => report.errored.push(path),
            }
            self.progress.complete_units(1);
        }

        while let Some(joined) = confirmations.join_next().await {
            match joined.map_err(map_join_error)? {
                Confirmation::Identical(path) => report.identical.push(path),
                Confirmation::Different(entry) => report.different.push(entry),
            }
            self.progress.complete_units(1);
        }

        debug!(
            path = %relative,
            identical = report.identical.len(),
            different = report.different.len(),
            "directory compared"
        );
        Ok(report)
    }

    /// Merge a child directory report; an unlistable child becomes `errored`
    fn absorb_child(&self, report: &mut Report, child: RelPath, result: Result<Report, DiffError>) {
        match result {
            Ok(child_report) => report.merge(child_report),
            Err(e) => {
                warn!(path = %child, error = %e, "directory could not be compared");
                report.errored.push(child);
            }
        }
        self.progress.complete_units(1);
    }

    async fn list(&self, dir: PathBuf, relative: &RelPath) -> io::Result<Partition> {
        let fs = Arc::clone(&self.fs);
        let entries = tokio::task::spawn_blocking(move || fs.list(&dir))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        let mut partition = Partition::default();
        for entry in entries {
            if entry.is_symlink {
                continue;
            }
            if self.options.is_excluded(&entry.name, &relative.join(&entry.name)) {
                continue;
            }
            if entry.is_dir {
                partition.dirs.insert(entry.name);
            } else {
                partition.files.insert(entry.name);
            }
        }
        Ok(partition)
    }

    async fn fetch_metadata(
        &self,
        path: &RelPath,
        source: PathBuf,
        destination: PathBuf,
    ) -> Result<(Option<FileMetadata>, Option<FileMetadata>), DiffError> {
        let fs = Arc::clone(&self.fs);
        let (source_meta, destination_meta) = tokio::task::spawn_blocking(move || {
            let source_meta = fs.metadata(&source).map_err(|e| metadata_error(source, e));
            let destination_meta = fs
                .metadata(&destination)
                .map_err(|e| metadata_error(destination, e));
            (source_meta, destination_meta)
        })
        .await
        .map_err(map_join_error)?;

        Ok((
            log_metadata_error(path, source_meta),
            log_metadata_error(path, destination_meta),
        ))
    }

    /// Hash both sides of a metadata-equal file
    ///
    /// Hash failures leave the entry without a hash and still classify it
    /// as different.
    async fn confirm(
        self,
        metadata: PairedMetadata,
        source: PathBuf,
        destination: PathBuf,
    ) -> Confirmation {
        let label = metadata.path.to_string();
        let (source_hash, destination_hash) = tokio::join!(
            self.scheduler
                .hash_file(Arc::clone(&self.fs), source, format!("source {}", label)),
            self.scheduler
                .hash_file(Arc::clone(&self.fs), destination, format!("destination {}", label))
        );

        match (source_hash, destination_hash) {
            (Ok(source_hash), Ok(destination_hash)) => {
                let hash = Paired::new(source_hash, destination_hash);
                if hash.is_matching() {
                    Confirmation::Identical(metadata.path)
                } else {
                    Confirmation::Different(DiffEntry::pending(metadata).confirm(hash))
                }
            }
            _ => {
                warn!(path = %label, "content could not be hashed, recording as different");
                Confirmation::Different(DiffEntry::pending(metadata))
            }
        }
    }
}

/// Compare two directory trees with default scheduling and no progress
pub async fn compare(
    fs: Arc<dyn FileSystem>,
    source: &Path,
    destination: &Path,
    compare_hashes: bool,
    base: &Path,
) -> Result<Report, DiffError> {
    DirectoryWalker::new(fs, CompareOptions::with_hashes(compare_hashes))
        .compare(source, destination, base)
        .await
}

fn metadata_error(path: PathBuf, source: io::Error) -> DiffError {
    DiffError::MetadataUnavailable { path, source }
}

fn log_metadata_error(
    path: &RelPath,
    result: Result<FileMetadata, DiffError>,
) -> Option<FileMetadata> {
    match result {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            warn!(%path, error = %e, "recording as errored");
            None
        }
    }
}

fn map_join_error(error: tokio::task::JoinError) -> DiffError {
    DiffError::TaskFailed(format!("comparison task failed: {}", error))
}
