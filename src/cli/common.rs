//! Option loading shared by the subcommands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{Cli, PassArgs};
use crate::config::{PrependOptions, find_config_file};

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Load options from the config file, or defaults when there is none.
pub fn load_options(cli: &Cli) -> Result<PrependOptions> {
    let name = expand_path(&cli.config);
    let cwd = std::env::current_dir().context("cannot read current directory")?;

    match find_config_file(&name, &cwd) {
        Some(path) => {
            crate::debug!("config"; "using {}", path.display());
            PrependOptions::load(&path)
                .with_context(|| format!("failed to load config `{}`", path.display()))
        }
        None => {
            crate::debug!("config"; "no {} found, using defaults", name.display());
            Ok(PrependOptions::default())
        }
    }
}

/// Apply command-line flags on top of file options. Flags win.
pub fn apply_overrides(options: &mut PrependOptions, args: &PassArgs) {
    if let Some(prepend) = &args.prepend {
        options.prepend = Some(prepend.clone());
    }
    if args.no_cache {
        options.enable_caching = Some(false);
    }
    if args.disable {
        options.enabled = Some(false);
    }
}
