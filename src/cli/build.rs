//! `build`: one pass from input to output.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::common::{apply_overrides, expand_path};
use super::PassArgs;
use crate::config::PrependOptions;
use crate::core::{BuildNode, TreeKind};
use crate::pipeline::{AssetPrepend, Plugin};
use crate::utils::plural_count;

/// Paths of a pass with `~` expanded.
pub(super) fn pass_paths(args: &PassArgs) -> (BuildNode, PathBuf) {
    (
        BuildNode::new(expand_path(&args.input)),
        expand_path(&args.output),
    )
}

/// Set up the plugin for a pass command.
pub(super) fn setup(mut options: PrependOptions, args: &PassArgs, output: PathBuf) -> AssetPrepend {
    apply_overrides(&mut options, args);
    let mut plugin = AssetPrepend::new(output);
    plugin.included(options);
    plugin
}

/// Run one pass and report what it did.
///
/// A plugin without a stage hands the input back; the input is then
/// mirrored to `output` so the command always leaves a complete tree there.
pub(super) fn run_pass(plugin: &mut AssetPrepend, input: &BuildNode, output: &Path) -> Result<String> {
    let node = plugin
        .postprocess_tree(TreeKind::All, input)
        .with_context(|| format!("pass over `{}` failed", input.path().display()))?;

    if node == *input {
        let (_, copied) = input
            .materialize(output)
            .with_context(|| format!("failed to copy into `{}`", output.display()))?;
        return Ok(format!("passthrough, copied {}", plural_count(copied, "file")));
    }

    let assets = plugin.stage().map_or(0, |stage| stage.assets().len());
    let stats = plugin.last_stats().unwrap_or_default();
    Ok(format!(
        "{} indexed, {} rewritten, {} cached, {} copied",
        plural_count(assets, "asset"),
        stats.rewritten,
        stats.cached,
        stats.copied
    ))
}

pub fn build(options: PrependOptions, args: &PassArgs) -> Result<()> {
    let (input, output) = pass_paths(args);
    let mut plugin = setup(options, args, output.clone());

    let summary = run_pass(&mut plugin, &input, &output)?;
    crate::log!("build"; "{} -> {}: {}", input.path().display(), output.display(), summary);
    Ok(())
}
