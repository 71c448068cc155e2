//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Prepend a CDN base url to asset references in built html, css and js
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one pass from input to output
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: PassArgs,
    },

    /// Run a pass, then another whenever the input changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        args: PassArgs,
    },

    /// Print the assets that would be indexed
    #[command(visible_alias = "a")]
    Assets {
        /// Build root to index
        #[arg(value_hint = clap::ValueHint::DirPath)]
        input: PathBuf,

        /// Print the asset map as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Shared arguments for Build and Watch commands
#[derive(clap::Args, Debug, Clone)]
pub struct PassArgs {
    /// Finalized build output to rewrite
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub input: PathBuf,

    /// Directory the rewritten tree is written to
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Override the prepend string from the config file
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub prepend: Option<String>,

    /// Rewrite every file on every pass
    #[arg(long)]
    pub no_cache: bool,

    /// Pass the input through untouched
    #[arg(long)]
    pub disable: bool,
}
