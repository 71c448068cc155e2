//! The asset-prepend stage and its plugin surface.
//!
//! # Pass
//!
//! ```text
//! upstream output ──► AssetIndexer::scan ──► AssetSet ──► ContentRewriter ──► output
//!  (BuildNode)         (fresh every pass)    (&, read-only)
//! ```
//!
//! The plugin is set up once through [`Plugin::included`]. Without a prepend
//! (or with `enabled = false`) no stage is created and every tree passes
//! through untouched.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asset::{AssetIndexer, AssetSet, ScanError};
use crate::config::{PrependConfig, PrependOptions, configure};
use crate::core::{BuildNode, TreeKind};
use crate::rewrite::{
    ContentRewriter, RegexRewriter, RewriteError, RewriteOptions, RewriteOutput, RewriteStats,
};


/// Name the plugin reports to the host, also used to annotate rewrites.
pub const PLUGIN_NAME: &str = "asset-prepend";

#[derive(Debug, Error)]
pub enum PassError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Lifecycle hooks a host build calls on a post-processing plugin.
pub trait Plugin {
    type Options;
    type Error;

    fn name(&self) -> &str;

    /// Resolve options once, before any tree is processed.
    fn included(&mut self, options: Self::Options);

    /// Process a finalized tree of the given kind and return the tree that
    /// replaces it.
    fn postprocess_tree(&mut self, kind: TreeKind, node: &BuildNode)
    -> Result<BuildNode, Self::Error>;
}

// ============================================================================
// Stage
// ============================================================================

/// Indexer plus rewrite delegation for an active configuration.
///
/// Owns the asset set of the current pass. Each [`run`](Self::run) replaces
/// it before the rewriter sees it.
pub struct PrependStage<R> {
    indexer: AssetIndexer,
    rewriter: R,
    options: RewriteOptions,
    assets: AssetSet,
    output: PathBuf,
}

impl<R: ContentRewriter> PrependStage<R> {
    pub fn new(config: &PrependConfig, rewriter: R, output: impl Into<PathBuf>) -> Self {
        Self {
            indexer: AssetIndexer::from_config(config),
            rewriter,
            options: RewriteOptions {
                prepend: config.prepend().to_string(),
                replace_extensions: config.replace_extensions.clone(),
                enable_caching: config.enable_caching,
                ignore: config.ignore.clone(),
                annotation: PLUGIN_NAME.to_string(),
            },
            assets: AssetSet::new(),
            output: output.into(),
        }
    }

    /// Asset set of the most recent pass.
    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn rewriter(&self) -> &R {
        &self.rewriter
    }

    pub fn into_rewriter(self) -> R {
        self.rewriter
    }

    /// Rebuild the asset set from the final state of `input`.
    pub fn update_assets(&mut self, input: &BuildNode) -> Result<&AssetSet, ScanError> {
        self.assets = self.indexer.scan(input.path())?;
        Ok(&self.assets)
    }

    /// Hand the current asset set to the rewriter.
    pub fn rewrite_assets(&self, input: &BuildNode) -> Result<RewriteOutput, RewriteError> {
        self.rewriter
            .rewrite(input, &self.output, &self.assets, &self.options)
    }

    /// One full pass: index, then rewrite.
    pub fn run(&mut self, input: &BuildNode) -> Result<RewriteOutput, PassError> {
        let count = self.update_assets(input)?.len();
        crate::debug!(PLUGIN_NAME; "indexed {} in {}",
            crate::utils::plural_count(count, "asset"), input.path().display());

        Ok(self.rewrite_assets(input)?)
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// The plugin as a host sees it.
///
/// `output` is where rewritten trees are written.
pub struct AssetPrepend<R = RegexRewriter> {
    output: PathBuf,
    config: Option<PrependConfig>,
    /// Parked here while no stage is active.
    rewriter: Option<R>,
    stage: Option<PrependStage<R>>,
    last_stats: Option<RewriteStats>,
}

impl AssetPrepend {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self::with_rewriter(output, RegexRewriter::new())
    }
}

impl<R: ContentRewriter> AssetPrepend<R> {
    pub fn with_rewriter(output: impl Into<PathBuf>, rewriter: R) -> Self {
        Self {
            output: output.into(),
            config: None,
            rewriter: Some(rewriter),
            stage: None,
            last_stats: None,
        }
    }

    /// Resolved configuration, once `included` has run.
    pub fn config(&self) -> Option<&PrependConfig> {
        self.config.as_ref()
    }

    /// The active stage, `None` in passthrough.
    pub fn stage(&self) -> Option<&PrependStage<R>> {
        self.stage.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.stage.is_some()
    }

    /// Counters of the last rewrite pass.
    pub fn last_stats(&self) -> Option<RewriteStats> {
        self.last_stats
    }
}

impl<R: ContentRewriter> Plugin for AssetPrepend<R> {
    type Options = PrependOptions;
    type Error = PassError;

    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn included(&mut self, options: PrependOptions) {
        let config = configure(options);
        let rewriter = self
            .stage
            .take()
            .map(PrependStage::into_rewriter)
            .or_else(|| self.rewriter.take());

        match rewriter {
            Some(rewriter) if config.is_active() => {
                crate::debug!(PLUGIN_NAME; "prepending `{}`", config.prepend());
                self.stage = Some(PrependStage::new(&config, rewriter, &self.output));
            }
            rewriter => {
                crate::debug!(PLUGIN_NAME; "no prepend configured, passing trees through");
                self.rewriter = rewriter;
            }
        }

        self.config = Some(config);
    }

    fn postprocess_tree(&mut self, kind: TreeKind, node: &BuildNode) -> Result<BuildNode, PassError> {
        if kind != TreeKind::All {
            return Ok(node.clone());
        }
        let Some(stage) = self.stage.as_mut() else {
            return Ok(node.clone());
        };

        let output = stage.run(node)?;
        self.last_stats = Some(output.stats);
        Ok(output.node)
    }
}

/// Run a single pass with a fresh [`RegexRewriter`].
///
/// Returns `node` itself when `config` is not active.
pub fn process(
    node: &BuildNode,
    config: &PrependConfig,
    output: impl Into<PathBuf>,
) -> Result<BuildNode, PassError> {
    if !config.is_active() {
        return Ok(node.clone());
    }

    let mut stage = PrependStage::new(config, RegexRewriter::new(), output);
    Ok(stage.run(node)?.node)
}
