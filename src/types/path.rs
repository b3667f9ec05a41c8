//! RelPath - A path relative to the compared roots

use serde::{Serialize, Serializer};
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// Path relative to the source root, stored as its components
///
/// Components are display labels: names that are not valid UTF-8 are
/// converted lossily. On-disk paths are always built from the real names.
///
/// Ordering compares component by component; when one path is a prefix of
/// the other, the shorter one sorts first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelPath(Vec<String>);

impl RelPath {
    /// The empty path (the root itself)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path with one more component
    pub fn join(&self, name: impl AsRef<OsStr>) -> Self {
        let mut components = Vec::with_capacity(self.0.len() + 1);
        components.extend(self.0.iter().cloned());
        components.push(name.as_ref().to_string_lossy().into_owned());
        Self(components)
    }

    /// Components of `path` below `base`, or `None` if `path` is not under it
    pub fn relative_to(base: &Path, path: &Path) -> Option<Self> {
        let rest = path.strip_prefix(base).ok()?;
        Some(Self(
            rest.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect(),
        ))
    }
}

impl From<&str> for RelPath {
    /// Split on `/`, dropping empty components
    fn from(value: &str) -> Self {
        Self(
            value
                .split('/')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<Vec<String>> for RelPath {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl Serialize for RelPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
