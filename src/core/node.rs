//! Build nodes: finalized directory trees handed between stages.

use std::io;
use std::path::{Path, PathBuf};

use crate::utils::fs::{copy_tree, reset_dir};
use crate::utils::path::overlaps;

/// Which tree the host is handing to a stage.
///
/// Post-processing stages usually only care about [`TreeKind::All`], the
/// merged output of every upstream stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Js,
    Css,
    Template,
    Test,
    All,
}

/// A directory on disk whose contents are final for the current pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildNode {
    root: PathBuf,
}

impl BuildNode {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the tree (the first input path of the node).
    #[inline]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Mirror this tree into `dest` unchanged, replacing whatever was there.
    ///
    /// Returns the node for `dest` and the number of files copied.
    pub fn materialize(&self, dest: &Path) -> io::Result<(BuildNode, usize)> {
        if overlaps(&self.root, dest) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "output `{}` overlaps input `{}`",
                    dest.display(),
                    self.root.display()
                ),
            ));
        }

        reset_dir(dest)?;
        let copied = copy_tree(&self.root, dest)?;
        Ok((BuildNode::new(dest), copied))
    }
}
