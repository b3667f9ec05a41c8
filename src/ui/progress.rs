//! Progress reporting

use crate::types::Report;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Receives work-unit accounting from the comparison engine
///
/// Called from many tasks at once; implementations only need the final
/// totals to be right.
pub trait ProgressSink: Send + Sync {
    /// `units` more pieces of work were discovered
    fn add_units(&self, units: u64);

    /// `units` pieces of work finished
    fn complete_units(&self, units: u64);
}

/// Discards all progress updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn add_units(&self, _units: u64) {}
    fn complete_units(&self, _units: u64) {}
}

/// Counts progress updates with atomics
#[derive(Debug, Default)]
pub struct CountingProgress {
    total: AtomicU64,
    completed: AtomicU64,
}

impl CountingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressSink for CountingProgress {
    fn add_units(&self, units: u64) {
        self.total.fetch_add(units, Ordering::SeqCst);
    }

    fn complete_units(&self, units: u64) {
        self.completed.fetch_add(units, Ordering::SeqCst);
    }
}

/// Terminal progress bar for a comparison run
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a visible progress bar on stderr
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} {bar:30.cyan/blue} {pos}/{len} entries | {msg}")
        {
            bar.set_style(
                style
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("=>-"),
            );
        }
        Self { bar }
    }

    /// Create a reporter that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Mark start of a comparison.
    pub fn start(&self, source: &str, destination: &str) {
        self.bar
            .set_message(format!("Comparing {} to {}...", source, destination));
    }

    /// Finalize with a bucket summary.
    pub fn finish(&self, report: &Report) {
        self.bar.finish_with_message(format!(
            "Compared: {} identical, {} only in source, {} only in destination, {} different, {} errored",
            report.identical.len(),
            report.source_only.len(),
            report.destination_only.len(),
            report.different.len(),
            report.errored.len()
        ));
    }

    /// Remove the bar without a final message (used on failure).
    pub fn abandon(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn add_units(&self, units: u64) {
        self.bar.inc_length(units);
    }

    fn complete_units(&self, units: u64) {
        self.bar.inc(units);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelPath;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_reporter_tracks_length_and_position() {
        let reporter = ProgressReporter::hidden();
        reporter.add_units(3);
        reporter.complete_units(2);

        assert_eq!(reporter.bar.length(), Some(3));
        assert_eq!(reporter.bar.position(), 2);
    }

    #[test]
    fn test_start_sets_message() {
        let reporter = ProgressReporter::hidden();
        reporter.start("src", "dst");

        let msg = reporter.bar.message();
        assert!(msg.contains("src"));
        assert!(msg.contains("dst"));
    }

    #[test]
    fn test_finish_summarizes_report() {
        let reporter = ProgressReporter::hidden();
        let report = Report {
            identical: vec![RelPath::from("a"), RelPath::from("b")],
            errored: vec![RelPath::from("c")],
            ..Report::default()
        };
        reporter.finish(&report);

        let msg = reporter.bar.message();
        assert!(msg.contains("2 identical"));
        assert!(msg.contains("1 errored"));
    }

    #[test]
    fn test_counting_progress_from_many_threads() {
        let progress = Arc::new(CountingProgress::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let progress = Arc::clone(&progress);
                thread::spawn(move || {
                    for _ in 0..100 {
                        progress.add_units(1);
                        progress.complete_units(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(progress.total(), 800);
        assert_eq!(progress.completed(), 800);
    }
}
