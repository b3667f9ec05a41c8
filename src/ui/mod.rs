//! Terminal output - progress bar and report rendering

mod progress;
mod render;

pub use progress::{CountingProgress, NoProgress, ProgressReporter, ProgressSink};
pub use render::{format_entry, format_report, format_summary, render_report, OutputFormat};
