//! The set of known asset paths.

use serde::Serialize;
use std::collections::BTreeMap;

/// Known asset paths, relative to the indexed root and `/`-separated.
///
/// Each path maps to itself; presence is the only signal used by the
/// rewriter. Serializes as a JSON object `{ "assets/foo.js": "assets/foo.js" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssetSet(BTreeMap<String, String>);

impl AssetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `path` as both key and value.
    pub fn insert(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.0.insert(path.clone(), path);
    }

    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// Mapped value for `path` (the path itself when present).
    #[inline]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Paths in lexical order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Paths ordered longest first, ties broken lexically.
    ///
    /// Rewriting in this order handles `assets/foo.js` before `foo.js`.
    pub fn paths_longest_first(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.paths().collect();
        paths.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        paths
    }
}

impl<S: Into<String>> FromIterator<S> for AssetSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}
