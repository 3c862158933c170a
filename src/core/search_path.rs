//! Ordered search path for application configuration sources.
//!
//! Lookups walk the entries in order and the first directory that supplies a
//! configuration wins, so insertion order is significant. Entries are not
//! de-duplicated.

use std::path::{Path, PathBuf};

/// Ordered list of directories consulted when locating an application
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    /// Create a search path whose only entry is `first`.
    pub fn new(first: impl Into<PathBuf>) -> Self {
        SearchPath {
            entries: vec![first.into()],
        }
    }

    /// Append a fallback directory at the end.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(path.into());
    }

    /// Replace the first occurrence of `old` with `new`, keeping its index.
    ///
    /// When `old` is not present, `new` is inserted at the front. Returns the
    /// index `new` ended up at.
    pub fn replace(&mut self, old: &Path, new: impl Into<PathBuf>) -> usize {
        let new = new.into();
        match self.position(old) {
            Some(i) => {
                self.entries[i] = new;
                i
            }
            None => {
                self.entries.insert(0, new);
                0
            }
        }
    }

    /// Index of the first entry equal to `path`.
    pub fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|p| p == path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SearchPath {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
