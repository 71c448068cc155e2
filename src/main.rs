//! asset-prepend command-line host.

use anyhow::Result;
use asset_prepend::cli::{Cli, Commands, assets, build, common, watch};
use asset_prepend::{core, logger};
use clap::{ColorChoice, Parser};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let options = common::load_options(&cli)?;

    match &cli.command {
        Commands::Build { args } => build::build(options, args),
        Commands::Watch { args } => watch::watch(options, args),
        Commands::Assets { input, json } => assets::list_assets(options, input, *json),
    }
}
