//! Configuration management

use crate::diff::{CompareOptions, DEFAULT_MAX_CONCURRENT_HASHES};
use crate::types::DiffError;
use crate::ui::OutputFormat;
use clap::Parser;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "treediff", version, about = "Compare two directory trees and report every difference")]
pub struct Cli {
    /// Source directory
    pub source: PathBuf,

    /// Directory compared against the source
    pub destination: PathBuf,

    /// Compare via content hashes - slower than timestamps and size, but more accurate
    #[arg(long = "hash")]
    pub compare_hashes: bool,

    /// Maximum number of files hashed at the same time
    #[arg(long, value_name = "N")]
    pub max_concurrent_hashes: Option<usize>,

    /// Compare sibling directories concurrently
    #[arg(long)]
    pub parallel_dirs: bool,

    /// Skip entries matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Abort the comparison after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// TOML file with default settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Defaults loaded from a TOML config file
///
/// ```toml
/// max_concurrent_hashes = 4
/// parallel_dirs = true
/// exclude = [".DS_Store", "*.tmp"]
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub max_concurrent_hashes: Option<usize>,
    pub parallel_dirs: Option<bool>,
    pub exclude: Vec<String>,
    pub format: Option<OutputFormat>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, DiffError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DiffError::Config(format!("Cannot read config file {:?}: {}", path, e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, DiffError> {
        toml::from_str(text).map_err(|e| DiffError::Config(format!("Invalid config file: {}", e)))
    }
}

/// Global configuration for treediff
#[derive(Debug, Clone)]
pub struct Config {
    /// Source directory
    pub source: PathBuf,

    /// Destination directory
    pub destination: PathBuf,

    /// Confirm metadata-equal files by content hash
    pub compare_hashes: bool,

    /// Cap on concurrently running hash jobs
    pub max_concurrent_hashes: usize,

    /// Recurse into sibling directories concurrently
    pub parallel_dirs: bool,

    /// Exclude patterns (globs)
    pub exclude_patterns: Vec<String>,

    /// Report format
    pub format: OutputFormat,

    /// Draw a progress bar on stderr
    pub progress: bool,

    /// Abort after this long
    pub timeout: Option<Duration>,

    /// Debug logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            compare_hashes: false,
            max_concurrent_hashes: DEFAULT_MAX_CONCURRENT_HASHES,
            parallel_dirs: false,
            exclude_patterns: Vec::new(),
            format: OutputFormat::Text,
            progress: true,
            timeout: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Build from command-line arguments layered over optional file defaults
    pub fn from_parts(cli: Cli, file: FileConfig) -> Result<Self, DiffError> {
        let mut exclude_patterns = file.exclude;
        exclude_patterns.extend(cli.exclude);

        let config = Self {
            source: cli.source,
            destination: cli.destination,
            compare_hashes: cli.compare_hashes,
            max_concurrent_hashes: cli
                .max_concurrent_hashes
                .or(file.max_concurrent_hashes)
                .unwrap_or(DEFAULT_MAX_CONCURRENT_HASHES),
            parallel_dirs: cli.parallel_dirs || file.parallel_dirs.unwrap_or(false),
            exclude_patterns,
            format: cli.format.or(file.format).unwrap_or_default(),
            progress: !cli.no_progress,
            timeout: cli.timeout.map(Duration::from_secs),
            verbose: cli.verbose,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// Root existence is checked by the comparison itself, which reports a
    /// missing root as `DiffError::RootUnavailable`.
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.max_concurrent_hashes == 0 {
            return Err(DiffError::Config(
                "max concurrent hashes must be at least 1".to_string(),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(DiffError::Config("timeout must be at least 1 second".to_string()));
        }
        self.exclude_set()?;
        Ok(())
    }

    /// Compile exclude patterns
    pub fn exclude_set(&self) -> Result<GlobSet, DiffError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                DiffError::Config(format!("Invalid exclude pattern {:?}: {}", pattern, e))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| DiffError::Config(format!("Invalid exclude patterns: {}", e)))
    }

    /// Engine options derived from this configuration
    pub fn compare_options(&self) -> Result<CompareOptions, DiffError> {
        Ok(CompareOptions {
            compare_hashes: self.compare_hashes,
            parallel_dirs: self.parallel_dirs,
            exclude: self.exclude_set()?,
        })
    }
}

impl TryFrom<Cli> for Config {
    type Error = DiffError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::from_parts(cli, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["treediff", "/src", "/dst"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_from(cli(&[])).unwrap();
        assert_eq!(config.source, PathBuf::from("/src"));
        assert_eq!(config.destination, PathBuf::from("/dst"));
        assert!(!config.compare_hashes);
        assert_eq!(config.max_concurrent_hashes, DEFAULT_MAX_CONCURRENT_HASHES);
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.progress);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_flags() {
        let config = Config::try_from(cli(&[
            "--hash",
            "--max-concurrent-hashes",
            "3",
            "--parallel-dirs",
            "--exclude",
            "*.tmp",
            "--format",
            "json",
            "--no-progress",
            "--timeout",
            "60",
        ]))
        .unwrap();

        assert!(config.compare_hashes);
        assert_eq!(config.max_concurrent_hashes, 3);
        assert!(config.parallel_dirs);
        assert_eq!(config.exclude_patterns, vec!["*.tmp".to_string()]);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.progress);
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = Config::try_from(cli(&["--max-concurrent-hashes", "0"])).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let err = Config::try_from(cli(&["--exclude", "a[b"])).unwrap_err();
        assert!(err.to_string().contains("Invalid exclude pattern"));
    }

    #[test]
    fn test_file_config_parse() {
        let file = FileConfig::parse(
            r#"
            max_concurrent_hashes = 4
            parallel_dirs = true
            exclude = [".DS_Store"]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(file.max_concurrent_hashes, Some(4));
        assert_eq!(file.parallel_dirs, Some(true));
        assert_eq!(file.exclude, vec![".DS_Store".to_string()]);
        assert_eq!(file.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        assert!(FileConfig::parse("threads = 4").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            max_concurrent_hashes: Some(4),
            parallel_dirs: Some(true),
            exclude: vec!["*.bak".to_string()],
            format: Some(OutputFormat::Json),
        };
        let config = Config::from_parts(
            cli(&["--max-concurrent-hashes", "2", "--format", "text", "--exclude", "*.tmp"]),
            file,
        )
        .unwrap();

        assert_eq!(config.max_concurrent_hashes, 2);
        assert!(config.parallel_dirs);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(
            config.exclude_patterns,
            vec!["*.bak".to_string(), "*.tmp".to_string()]
        );
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::try_from(cli(&["--config", "/nonexistent/treediff.toml"])).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_compare_options() {
        let config = Config::try_from(cli(&["--hash", "--exclude", "*.log"])).unwrap();
        let options = config.compare_options().unwrap();
        assert!(options.compare_hashes);
        assert!(options.exclude.is_match("debug.log"));
    }
}
