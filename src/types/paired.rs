//! Paired - One attribute observed on both sides

use serde::Serialize;

/// The same logical attribute as seen in source and destination
///
/// Orders by `source` first, then by `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Paired<T> {
    pub source: T,
    pub destination: T,
}

impl<T> Paired<T> {
    pub fn new(source: T, destination: T) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Apply `f` to both sides
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Paired<U> {
        Paired {
            source: f(self.source),
            destination: f(self.destination),
        }
    }
}

impl<T: PartialEq> Paired<T> {
    /// Both sides agree
    pub fn is_matching(&self) -> bool {
        self.source == self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_matching() {
        assert!(Paired::new(10u64, 10).is_matching());
        assert!(!Paired::new(10u64, 11).is_matching());
    }

    #[test]
    fn test_ordering_source_first() {
        assert!(Paired::new(1, 9) < Paired::new(2, 0));
        assert!(Paired::new(1, 1) < Paired::new(1, 2));
        assert_eq!(
            Paired::new(3, 3).cmp(&Paired::new(3, 3)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn test_map() {
        let sizes = Paired::new(1024u64, 2048).map(|s| s / 1024);
        assert_eq!(sizes, Paired::new(1, 2));
    }
}
