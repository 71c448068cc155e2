//! Command-line host: runs the plugin the way a build system would.

mod args;
pub mod assets;
pub mod build;
pub mod common;
pub mod watch;

pub use args::{Cli, Commands, PassArgs};
