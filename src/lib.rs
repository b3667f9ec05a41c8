//! # treediff - Directory Tree Reconciliation
//!
//! Compares a source tree against a destination tree and reports, for every
//! relative path, whether it is identical, present on one side only,
//! different, or could not be compared.
//!
//! Size and timestamps decide by default. With content hashing enabled,
//! metadata-equal files are confirmed by digest under a global cap on
//! concurrent reads.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod fs;
pub mod hash;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use diff::{compare, CompareOptions, DirectoryWalker};
pub use types::{DiffEntry, DiffError, Paired, RelPath, Report};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
