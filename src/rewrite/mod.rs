//! Content rewriting: prefix asset references in text files.
//!
//! The pipeline only talks to the [`ContentRewriter`] trait. It hands over the
//! input tree, the asset set of the current pass and [`RewriteOptions`], and
//! gets back the rewritten tree. [`RegexRewriter`] is the implementation
//! shipped with the crate.
//!
//! ```text
//! input/                          output/
//! ├── index.html  ─ rewrite ─►    ├── index.html   src="https://cdn/assets/app.js"
//! └── assets/app.js ── copy ─►    └── assets/app.js
//! ```

mod cache;
mod engine;
mod pattern;

pub use cache::{ContentHash, RewriteCache};
pub use engine::RegexRewriter;
pub use pattern::ReferencePattern;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asset::AssetSet;
use crate::core::BuildNode;

/// Options forwarded by the pipeline to the rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Prefix inserted before each asset reference.
    pub prepend: String,
    /// Extensions of files whose content is rewritten.
    pub replace_extensions: Vec<String>,
    /// Reuse previous output for files whose content did not change.
    pub enable_caching: bool,
    /// Relative paths copied unchanged.
    pub ignore: Vec<String>,
    /// Label of the stage requesting the rewrite, for logs.
    pub annotation: String,
}

impl RewriteOptions {
    /// Whether the file at `rel` is eligible for rewriting.
    pub fn should_rewrite(&self, rel: &str) -> bool {
        if self.is_ignored(rel) {
            return false;
        }
        // hidden files are rewritten too, `.env.js` counts as a js file
        let name = crate::utils::path::file_name(rel).trim_start_matches('.');
        self.replace_extensions
            .iter()
            .any(|ext| crate::utils::path::has_extension(name, ext))
    }

    fn is_ignored(&self, rel: &str) -> bool {
        self.ignore
            .iter()
            .any(|ignored| ignored.trim_start_matches("./").trim_start_matches('/') == rel)
    }
}

/// Counters for one rewrite pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Files whose text went through substitution this pass.
    pub rewritten: usize,
    /// Files whose output came from the cache.
    pub cached: usize,
    /// Files copied byte-for-byte.
    pub copied: usize,
}

impl RewriteStats {
    pub fn total(&self) -> usize {
        self.rewritten + self.cached + self.copied
    }
}

/// Result of a rewrite: the output tree and what happened to build it.
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    pub node: BuildNode,
    pub stats: RewriteStats,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("IO error when processing `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("failed to walk `{0}`")]
    Walk(PathBuf, #[source] jwalk::Error),

    #[error("output `{output}` overlaps input `{input}`")]
    Overlap { input: PathBuf, output: PathBuf },

    #[error("cannot build reference pattern for `{0}`")]
    Pattern(String, #[source] regex::Error),
}

/// The text-substitution capability the pipeline delegates to.
///
/// Implementations must be deterministic for a fixed input tree, asset set
/// and options, apart from whatever caching they document.
pub trait ContentRewriter: Send + Sync {
    /// Rewrite `input` into the directory `output`.
    fn rewrite(
        &self,
        input: &BuildNode,
        output: &Path,
        assets: &AssetSet,
        options: &RewriteOptions,
    ) -> Result<RewriteOutput, RewriteError>;
}
