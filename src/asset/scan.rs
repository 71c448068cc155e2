//! Asset indexing.
//!
//! Finds every file under a build root matching `**/*.{ext1,ext2,...}`:
//!
//! ```text
//! dist/
//! ├── index.html          -> (not an asset extension, skipped)
//! ├── .well-known/x.js    -> (hidden directory, skipped)
//! └── assets/
//!     ├── app.js          -> assets/app.js
//!     └── logo.png        -> assets/logo.png
//! ```
//!
//! Matching is case-sensitive. Hidden files and directories are never
//! matched, the same as a glob without the `dot` option. Symlinked
//! directories are descended into.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use thiserror::Error;

use super::AssetSet;
use crate::config::{AssetFilter, PrependConfig};
use crate::utils::path::{has_extension, rel_slash};

/// Failure to read the root being indexed. Fatal for the build pass.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("asset root `{0}` is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to walk `{0}`")]
    Walk(PathBuf, #[source] jwalk::Error),
}

/// Builds an [`AssetSet`] from a finalized output directory.
#[derive(Debug, Clone)]
pub struct AssetIndexer {
    extensions: Vec<String>,
    filter: AssetFilter,
}

impl AssetIndexer {
    pub fn new(extensions: Vec<String>, filter: AssetFilter) -> Self {
        Self { extensions, filter }
    }

    pub fn from_config(config: &PrependConfig) -> Self {
        Self::new(
            config.asset_extensions.clone(),
            config.asset_file_filter.clone(),
        )
    }

    /// Glob equivalent of what this indexer matches, for display.
    pub fn pattern(&self) -> String {
        match self.extensions.as_slice() {
            [single] => format!("**/*.{single}"),
            exts => format!("**/*.{{{}}}", exts.join(",")),
        }
    }

    /// Whether a `/`-separated relative path has one of the asset extensions.
    pub fn matches_extension(&self, rel: &str) -> bool {
        let name = crate::utils::path::file_name(rel);
        self.extensions.iter().any(|ext| has_extension(name, ext))
    }

    /// Enumerate asset files under `root` and return a fresh set.
    ///
    /// Any read failure aborts the scan; nothing is retried.
    pub fn scan(&self, root: &Path) -> Result<AssetSet, ScanError> {
        let meta = fs::metadata(root).map_err(|e| ScanError::Io(root.to_path_buf(), e))?;
        if !meta.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut assets = AssetSet::new();
        if self.extensions.is_empty() {
            return Ok(assets);
        }

        for entry in WalkDir::new(root)
            .skip_hidden(true)
            .follow_links(true)
            .sort(true)
        {
            let entry = entry.map_err(|e| ScanError::Walk(root.to_path_buf(), e))?;
            let path = entry.path();

            if !is_file(&entry.file_type(), &path) {
                continue;
            }

            let Some(rel) = rel_slash(&path, root) else {
                crate::debug!("scan"; "skipping non-utf8 path: {}", path.display());
                continue;
            };

            if self.matches_extension(&rel) && self.filter.accepts(&rel) {
                assets.insert(rel);
            }
        }

        crate::debug!("scan"; "{} matched {} in {}",
            self.pattern(), crate::utils::plural_count(assets.len(), "asset"), root.display());

        Ok(assets)
    }
}

/// Regular file, or a symlink resolving to one.
fn is_file(file_type: &fs::FileType, path: &Path) -> bool {
    file_type.is_file() || (file_type.is_symlink() && path.is_file())
}
