//! Report rendering

use crate::types::{DiffEntry, DiffError, RelPath, Report};
use chrono::{DateTime, Local};
use console::style;
use indicatif::HumanBytes;
use std::time::SystemTime;

/// Output format of the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Grouped, human-readable sections
    #[default]
    Text,
    /// Pretty-printed JSON object with one array per bucket
    Json,
}

/// Render `report` in the requested format
pub fn render_report(report: &Report, format: OutputFormat) -> Result<String, DiffError> {
    match format {
        OutputFormat::Text => Ok(format_report(report)),
        OutputFormat::Json => format_json(report),
    }
}

/// Text report: identical, source-only, destination-only, different, errored
pub fn format_report(report: &Report) -> String {
    let mut lines = Vec::new();

    push_paths(&mut lines, "Identical items:", &report.identical);
    push_paths(&mut lines, "Just in source directory:", &report.source_only);
    push_paths(&mut lines, "Just in destination directory:", &report.destination_only);

    lines.push(style("Differing files:").bold().to_string());
    if report.different.is_empty() {
        lines.push("  (none)".to_string());
    }
    for entry in &report.different {
        for (i, line) in format_entry(entry).lines().enumerate() {
            let indent = if i == 0 { "  " } else { "    " };
            lines.push(format!("{}{}", indent, line));
        }
    }
    lines.push(String::new());

    push_paths(&mut lines, "Errored items:", &report.errored);

    lines.push(format_summary(report));
    lines.join("\n")
}

fn push_paths(lines: &mut Vec<String>, title: &str, paths: &[RelPath]) {
    lines.push(style(title).bold().to_string());
    if paths.is_empty() {
        lines.push("  (none)".to_string());
    }
    for path in paths {
        lines.push(format!("  {}", path));
    }
    lines.push(String::new());
}

/// One line of bucket counts
pub fn format_summary(report: &Report) -> String {
    format!(
        "Summary: {} identical, {} only in source, {} only in destination, {} different, {} errored",
        report.identical.len(),
        report.source_only.len(),
        report.destination_only.len(),
        report.different.len(),
        report.errored.len()
    )
}

/// Describe a differing file, listing only the attributes that disagree
pub fn format_entry(entry: &DiffEntry) -> String {
    let metadata = entry.metadata();
    let mut out = format!("file: {}", metadata.path);

    if !metadata.created.is_matching() {
        out.push_str(&format!(
            "\ncreation (source): {}\ncreation (destination): {}",
            format_time(metadata.created.source),
            format_time(metadata.created.destination)
        ));
    }
    if !metadata.modified.is_matching() {
        out.push_str(&format!(
            "\nmodification (source): {}\nmodification (destination): {}",
            format_time(metadata.modified.source),
            format_time(metadata.modified.destination)
        ));
    }
    if !metadata.size.is_matching() {
        out.push_str(&format!(
            "\nfile size (source): {} ({} bytes)\nfile size (destination): {} ({} bytes)",
            HumanBytes(metadata.size.source),
            metadata.size.source,
            HumanBytes(metadata.size.destination),
            metadata.size.destination
        ));
    }
    match entry.hash() {
        Some(hash) if !hash.is_matching() => {
            out.push_str(&format!(
                "\nhash (source): {}\nhash (destination): {}",
                hash.source, hash.destination
            ));
        }
        Some(_) => {}
        None if metadata.is_matching() => {
            out.push_str("\nhash: unavailable (content could not be read)");
        }
        None => {}
    }

    out
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn format_json(report: &Report) -> Result<String, DiffError> {
    serde_json::to_string_pretty(report).map_err(|e| DiffError::Io(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Digest, Paired, PairedMetadata};
    use std::time::{Duration, UNIX_EPOCH};

    fn entry(size: Paired<u64>, modified: Paired<u64>) -> DiffEntry {
        DiffEntry::pending(PairedMetadata {
            path: RelPath::from("a/x.txt"),
            created: Paired::new(UNIX_EPOCH, UNIX_EPOCH),
            modified: modified.map(|s| UNIX_EPOCH + Duration::from_secs(s)),
            size,
        })
    }

    #[test]
    fn test_sections_in_order() {
        let report = Report {
            identical: vec![RelPath::from("same.txt")],
            source_only: vec![RelPath::from("logs")],
            destination_only: vec![RelPath::from("extra.bin")],
            different: vec![entry(Paired::new(1, 2), Paired::new(0, 0))],
            errored: vec![RelPath::from("locked")],
        };
        let text = format_report(&report);

        let positions: Vec<usize> = [
            "Identical items:",
            "Just in source directory:",
            "Just in destination directory:",
            "Differing files:",
            "Errored items:",
            "Summary:",
        ]
        .iter()
        .map(|title| text.find(title).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(text.contains("  logs"));
        assert!(text.contains("  extra.bin"));
        assert!(text.contains("  file: a/x.txt"));
        assert!(text.contains("1 errored"));
    }

    #[test]
    fn test_empty_sections_say_none() {
        let text = format_report(&Report::new());
        assert_eq!(text.matches("(none)").count(), 5);
    }

    #[test]
    fn test_entry_lists_only_mismatching_fields() {
        let text = format_entry(&entry(Paired::new(10, 20), Paired::new(5, 5)));
        assert!(text.contains("file size (source)"));
        assert!(text.contains("(20 bytes)"));
        assert!(!text.contains("modification"));
        assert!(!text.contains("creation"));
        assert!(!text.contains("hash"));
    }

    #[test]
    fn test_entry_shows_mismatching_hashes() {
        let hashed = entry(Paired::new(10, 10), Paired::new(5, 5))
            .confirm(Paired::new(Digest([0xaa; 32]), Digest([0xbb; 32])));
        let text = format_entry(&hashed);
        assert!(text.contains(&format!("hash (source): {}", "aa".repeat(32))));
        assert!(text.contains(&format!("hash (destination): {}", "bb".repeat(32))));
    }

    #[test]
    fn test_entry_notes_unavailable_hash() {
        let text = format_entry(&entry(Paired::new(10, 10), Paired::new(5, 5)));
        assert!(text.contains("hash: unavailable"));
    }

    #[test]
    fn test_json_has_all_buckets() {
        let report = Report {
            source_only: vec![RelPath::from("logs")],
            ..Report::default()
        };
        let json = render_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source_only"][0], "logs");
        for bucket in ["identical", "destination_only", "different", "errored"] {
            assert!(value[bucket].as_array().unwrap().is_empty());
        }
    }
}
