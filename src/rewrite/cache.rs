//! Rewrite cache keyed on input content.
//!
//! An entry is reused when a file at the same relative path hashes the same
//! as last time. The hash covers the file content and the prepend, but not
//! the asset set: an unchanged file keeps its previous output even if an
//! asset it references has appeared since.

use dashmap::DashMap;
use std::sync::Arc;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a byte buffer.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash several buffers as one, each length-prefixed so that
    /// `["ab", "c"]` and `["a", "bc"]` differ.
    pub fn of_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // first 16 hex chars are enough to tell entries apart in logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    input: ContentHash,
    output: Arc<str>,
}

/// Thread-safe map from relative path to the last rewrite of that path.
#[derive(Debug, Default)]
pub struct RewriteCache {
    entries: DashMap<String, CacheEntry>,
}

impl RewriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached output for `rel` if its content hash still matches.
    pub fn get(&self, rel: &str, input: ContentHash) -> Option<Arc<str>> {
        self.entries
            .get(rel)
            .filter(|entry| entry.input == input)
            .map(|entry| Arc::clone(&entry.output))
    }

    pub fn insert(&self, rel: &str, input: ContentHash, output: Arc<str>) {
        self.entries
            .insert(rel.to_string(), CacheEntry { input, output });
    }

    /// Drop entries whose path fails `keep`.
    pub fn retain(&self, keep: impl Fn(&str) -> bool) {
        self.entries.retain(|rel, _| keep(rel));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
