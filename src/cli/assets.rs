//! `assets`: print what the indexer finds under a build root.

use anyhow::{Context, Result};
use std::path::Path;

use crate::asset::{AssetIndexer, AssetSet};
use crate::config::{PrependOptions, configure};
use crate::utils::plural_count;

use super::common::expand_path;

/// Index `input` with the configured extensions and filter.
pub fn collect_assets(options: PrependOptions, input: &Path) -> Result<AssetSet> {
    let config = configure(options);
    let indexer = AssetIndexer::from_config(&config);
    let root = expand_path(input);

    indexer
        .scan(&root)
        .with_context(|| format!("failed to index `{}`", root.display()))
}

pub fn list_assets(options: PrependOptions, input: &Path, json: bool) -> Result<()> {
    let assets = collect_assets(options, input)?;

    if json {
        let out = serde_json::to_string_pretty(&assets).context("failed to serialize assets")?;
        println!("{out}");
        return Ok(());
    }

    for path in assets.paths() {
        println!("{path}");
    }
    crate::log!("assets"; "{} in {}", plural_count(assets.len(), "asset"), input.display());
    Ok(())
}
