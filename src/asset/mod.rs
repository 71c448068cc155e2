//! Asset discovery: which files in a build root count as assets.

mod scan;
mod set;

pub use scan::{AssetIndexer, ScanError};
pub use set::AssetSet;
