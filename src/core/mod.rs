//! Core types shared by the pipeline, the rewriter and the CLI.

mod node;
mod state;

pub use node::{BuildNode, TreeKind};
pub use state::{is_shutdown, register_shutdown, setup_shutdown_handler};
