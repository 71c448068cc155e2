//! Prefix asset references in a finished build with a CDN base url.
//!
//! A pass indexes the asset files of a build root ([`asset::AssetIndexer`]),
//! then hands the resulting [`AssetSet`] to a [`ContentRewriter`] that
//! rewrites html, css and js references into `{prepend}{path}`.
//!
//! ```no_run
//! use asset_prepend::{AssetPrepend, BuildNode, Plugin, PrependOptions, TreeKind};
//!
//! let mut plugin = AssetPrepend::new("dist-cdn");
//! plugin.included(PrependOptions {
//!     prepend: Some("https://cdn.example/".into()),
//!     ..Default::default()
//! });
//! let out = plugin.postprocess_tree(TreeKind::All, &BuildNode::new("dist"))?;
//! # Ok::<(), asset_prepend::PassError>(())
//! ```

pub mod asset;
pub mod cli;
pub mod config;
pub mod core;
pub mod logger;
pub mod pipeline;
pub mod rewrite;
pub mod utils;

pub use asset::{AssetIndexer, AssetSet, ScanError};
pub use config::{AssetFilter, ConfigError, PrependConfig, PrependOptions, configure};
pub use crate::core::{BuildNode, TreeKind};
pub use pipeline::{AssetPrepend, PLUGIN_NAME, PassError, Plugin, PrependStage, process};
pub use rewrite::{ContentRewriter, RegexRewriter, RewriteError, RewriteOptions, RewriteStats};
