//! Main compare command

use crate::diff::DirectoryWalker;
use crate::fs::{FileSystem, LocalFileSystem};
use crate::hash::HashScheduler;
use crate::types::{DiffError, Report};
use crate::ui::{render_report, ProgressReporter};
use crate::Config;
use std::sync::Arc;
use tokio::runtime::Builder;
use tracing::info;

/// Run the comparison on the local filesystem and print the report
pub fn run(config: Config) -> Result<Report, DiffError> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DiffError::Io)?;

    let reporter = Arc::new(if config.progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    });
    reporter.start(
        &config.source.display().to_string(),
        &config.destination.display().to_string(),
    );

    let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem);
    let result = runtime.block_on(execute(&config, fs, Arc::clone(&reporter)));

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            reporter.abandon();
            return Err(e);
        }
    };
    reporter.finish(&report);

    println!("{}", render_report(&report, config.format)?);
    Ok(report)
}

/// Compare `config.source` to `config.destination` on `fs`
///
/// Honors the configured timeout; on expiry the whole comparison is
/// dropped, which aborts outstanding hash jobs.
pub async fn execute(
    config: &Config,
    fs: Arc<dyn FileSystem>,
    progress: Arc<ProgressReporter>,
) -> Result<Report, DiffError> {
    let scheduler = Arc::new(HashScheduler::new(config.max_concurrent_hashes));
    let walker = DirectoryWalker::new(fs, config.compare_options()?)
        .with_scheduler(Arc::clone(&scheduler))
        .with_progress(progress);

    info!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        compare_hashes = config.compare_hashes,
        "starting comparison"
    );

    let comparison = walker.compare(&config.source, &config.destination, &config.source);
    let report = match config.timeout {
        Some(limit) => tokio::time::timeout(limit, comparison)
            .await
            .map_err(|_| DiffError::TimedOut(limit.as_secs()))??,
        None => comparison.await?,
    };

    let stats = scheduler.stats();
    info!(
        entries = report.len(),
        clean = report.is_clean(),
        hashed = stats.completed,
        hash_failures = stats.failed,
        peak_in_flight = stats.peak_in_flight,
        "comparison finished"
    );
    Ok(report)
}
