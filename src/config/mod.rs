//! Plugin configuration.
//!
//! Options come from the caller (or `asset-prepend.toml`) with every field
//! optional, and are shallow-merged over the defaults by [`configure`].
//!
//! ```toml
//! enabled = true
//! prepend = "https://cdn.example/"
//! asset_extensions = ["js", "css", "png"]
//! replace_extensions = ["html", "css", "js"]
//! enable_caching = true
//! ignore = ["robots.txt"]
//! asset_exclude = ["**/*.map"]
//! ```
//!
//! | Option               | Default                         |
//! |----------------------|---------------------------------|
//! | `enabled`            | `true`                          |
//! | `asset_extensions`   | [`DEFAULT_ASSET_EXTENSIONS`]    |
//! | `replace_extensions` | [`DEFAULT_REPLACE_EXTENSIONS`]  |
//! | `prepend`            | empty (rewriting disabled)      |
//! | `enable_caching`     | `true`                          |
//! | `ignore`             | empty                           |
//! | `asset_file_filter`  | accept-all                      |

mod error;
mod filter;
mod util;

pub use error::ConfigError;
pub use filter::AssetFilter;
pub use util::find_config_file;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name.
pub const CONFIG_FILE: &str = "asset-prepend.toml";

/// File types indexed as assets when the caller does not say otherwise.
pub const DEFAULT_ASSET_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "map", "woff", "woff2", "ttf",
    "eot",
];

/// File types whose content is rewritten when the caller does not say otherwise.
pub const DEFAULT_REPLACE_EXTENSIONS: &[&str] = &["html", "css", "js"];

// ============================================================================
// Caller options
// ============================================================================

/// Caller-supplied options. Every `None` falls back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrependOptions {
    /// Master on/off switch.
    pub enabled: Option<bool>,

    /// Extensions of files indexed as assets (without the dot).
    pub asset_extensions: Option<Vec<String>>,

    /// Extensions of files whose content gets rewritten.
    pub replace_extensions: Option<Vec<String>>,

    /// Prefix inserted before asset references. Empty disables rewriting.
    pub prepend: Option<String>,

    /// Forwarded to the content rewriter.
    pub enable_caching: Option<bool>,

    /// Relative paths never rewritten.
    pub ignore: Option<Vec<String>>,

    /// Glob patterns of asset paths excluded from indexing.
    /// Compiled into `asset_file_filter` when parsed from a config file.
    pub asset_exclude: Option<Vec<String>>,

    /// Extra inclusion rule for indexing.
    #[serde(skip)]
    pub asset_file_filter: Option<AssetFilter>,
}

impl PrependOptions {
    /// Parse options from TOML, collecting unknown keys.
    pub fn parse(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let mut options: Self =
            serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
                ignored.push(path.to_string());
            })?;
        options.compile_exclude()?;
        Ok((options, ignored))
    }

    /// Load options from a config file, warning about unknown keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (options, ignored) = Self::parse(&content)?;
        if !ignored.is_empty() {
            print_unknown_fields_warning(&ignored, path);
        }

        Ok(options)
    }

    /// Turn `asset_exclude` patterns into a filter, unless a filter is already set.
    fn compile_exclude(&mut self) -> Result<(), ConfigError> {
        if self.asset_file_filter.is_none()
            && let Some(patterns) = &self.asset_exclude
        {
            self.asset_file_filter = Some(AssetFilter::exclude(patterns)?);
        }
        Ok(())
    }
}

fn print_unknown_fields_warning(fields: &[String], path: &Path) {
    let display_path = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());
    crate::log!("warning"; "unknown fields in {}, ignoring:", display_path);
    for field in fields {
        eprintln!("- {}", field);
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Fully resolved configuration, produced once by [`configure`].
#[derive(Debug, Clone)]
pub struct PrependConfig {
    pub enabled: bool,
    pub asset_extensions: Vec<String>,
    pub replace_extensions: Vec<String>,
    pub prepend: Option<String>,
    pub enable_caching: bool,
    pub ignore: Vec<String>,
    pub asset_file_filter: AssetFilter,
}

impl PrependConfig {
    /// The prefix, or `""` when unset.
    #[inline]
    pub fn prepend(&self) -> &str {
        self.prepend.as_deref().unwrap_or_default()
    }

    /// Whether the plugin rewrites anything at all.
    ///
    /// `false` means passthrough: the input node is returned untouched.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.prepend().is_empty()
    }
}

impl Default for PrependConfig {
    fn default() -> Self {
        configure(PrependOptions::default())
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Merge caller options over the defaults. Caller values win.
///
/// The merge is shallow: a caller-supplied list replaces the default list.
pub fn configure(options: PrependOptions) -> PrependConfig {
    PrependConfig {
        enabled: options.enabled.unwrap_or(true),
        asset_extensions: options
            .asset_extensions
            .unwrap_or_else(|| to_owned_list(DEFAULT_ASSET_EXTENSIONS)),
        replace_extensions: options
            .replace_extensions
            .unwrap_or_else(|| to_owned_list(DEFAULT_REPLACE_EXTENSIONS)),
        prepend: options.prepend,
        enable_caching: options.enable_caching.unwrap_or(true),
        ignore: options.ignore.unwrap_or_default(),
        asset_file_filter: options.asset_file_filter.unwrap_or_default(),
    }
}
