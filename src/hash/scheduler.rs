//! Bounded-concurrency hash job runner.
//!
//! Every hash job must hold a permit from a fair `Semaphore` while it reads
//! file content, so at most `max_in_flight` jobs read at any instant. Waiters
//! are admitted in submission order. The permit moves into the blocking task
//! and is released only when the read really ends, even if the awaiting
//! future was dropped.

use super::compute_hash;
use crate::fs::FileSystem;
use crate::types::{DiffError, Digest};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// Snapshot of scheduler counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashStats {
    pub max_in_flight: usize,
    pub peak_in_flight: usize,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn enter(self: &Arc<Self>) -> InFlight {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(Arc::clone(self))
    }
}

/// Marks one job as reading until dropped.
struct InFlight(Arc<Counters>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs hash computations with a global cap on concurrent reads.
///
/// Constructed explicitly and shared by reference, so each run (or test) can
/// use its own limit.
#[derive(Debug)]
pub struct HashScheduler {
    permits: Arc<Semaphore>,
    max_in_flight: usize,
    counters: Arc<Counters>,
}

impl HashScheduler {
    /// Create a scheduler admitting at most `max_in_flight` jobs (minimum 1).
    pub fn new(max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Jobs currently reading.
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> HashStats {
        HashStats {
            max_in_flight: self.max_in_flight,
            peak_in_flight: self.counters.peak_in_flight.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }

    /// Run one labeled job once capacity is available.
    ///
    /// A failing job is logged and returned as `DiffError::HashFailure`; it
    /// never poisons the scheduler for other jobs.
    pub async fn run<F>(&self, label: impl Into<String>, job: F) -> Result<Digest, DiffError>
    where
        F: FnOnce() -> io::Result<Digest> + Send + 'static,
    {
        let label = label.into();
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| DiffError::TaskFailed("hash scheduler is closed".to_string()))?;

        let counters = Arc::clone(&self.counters);
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _reading = counters.enter();
            job()
        });

        match handle.await.map_err(map_join_error)? {
            Ok(digest) => {
                self.counters.completed.fetch_add(1, Ordering::SeqCst);
                Ok(digest)
            }
            Err(source) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                warn!(%label, error = %source, "hashing failed");
                Err(DiffError::HashFailure { label, source })
            }
        }
    }

    /// Hash the file at `path` on `fs`.
    pub async fn hash_file(
        &self,
        fs: Arc<dyn FileSystem>,
        path: PathBuf,
        label: impl Into<String>,
    ) -> Result<Digest, DiffError> {
        self.run(label, move || compute_hash(fs.as_ref(), &path))
            .await
    }
}

fn map_join_error(error: tokio::task::JoinError) -> DiffError {
    DiffError::TaskFailed(format!("hash task failed: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use std::path::Path;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    fn slow_digest(byte: u8) -> impl FnOnce() -> io::Result<Digest> + Send + 'static {
        move || {
            thread::sleep(Duration::from_millis(20));
            Ok(Digest([byte; 32]))
        }
    }

    #[test]
    fn test_minimum_one_slot() {
        let scheduler = HashScheduler::new(0);
        assert_eq!(scheduler.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_run_returns_digest_and_counts() {
        let scheduler = HashScheduler::new(2);
        let digest = scheduler.run("job", slow_digest(7)).await.unwrap();

        assert_eq!(digest, Digest([7; 32]));
        let stats = scheduler.stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(scheduler.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_counted() {
        let scheduler = HashScheduler::new(1);
        let result = scheduler
            .run("source broken.bin", || {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            })
            .await;

        match result {
            Err(DiffError::HashFailure { label, .. }) => assert_eq!(label, "source broken.bin"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(scheduler.stats().failed, 1);

        // Scheduler keeps working after a failure
        assert!(scheduler.run("next", slow_digest(1)).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cap_is_never_exceeded() {
        let scheduler = Arc::new(HashScheduler::new(2));
        let mut handles = Vec::new();
        for i in 0..10u8 {
            let scheduler = Arc::clone(&scheduler);
            handles.push(tokio::spawn(async move {
                scheduler.run(format!("job {i}"), slow_digest(i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = scheduler.stats();
        assert_eq!(stats.completed, 10);
        assert!(stats.peak_in_flight <= 2, "peak was {}", stats.peak_in_flight);
        assert!(stats.peak_in_flight >= 1);
    }

    #[tokio::test]
    async fn test_waiters_admitted_in_submission_order() {
        let scheduler = Arc::new(HashScheduler::new(1));
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5u8 {
            let scheduler = Arc::clone(&scheduler);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                scheduler
                    .run(format!("job {i}"), move || {
                        order.lock().unwrap().push(i);
                        thread::sleep(Duration::from_millis(5));
                        Ok(Digest([i; 32]))
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_hash_file_reads_through_filesystem() {
        let mut fs = MemoryFileSystem::new();
        fs.file("/r/a", "same").file("/r/b", "same").fail_read("/r/c");
        fs.file("/r/c", "x");
        let fs: Arc<dyn FileSystem> = Arc::new(fs);
        let scheduler = HashScheduler::new(4);

        let a = scheduler
            .hash_file(Arc::clone(&fs), Path::new("/r/a").to_path_buf(), "a")
            .await
            .unwrap();
        let b = scheduler
            .hash_file(Arc::clone(&fs), Path::new("/r/b").to_path_buf(), "b")
            .await
            .unwrap();
        assert_eq!(a, b);

        let c = scheduler
            .hash_file(fs, Path::new("/r/c").to_path_buf(), "c")
            .await;
        assert!(matches!(c, Err(DiffError::HashFailure { .. })));
    }
}
