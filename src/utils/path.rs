//! Path utilities.
//!
//! Asset paths travel through the pipeline as `/`-separated strings relative
//! to a build root, so lookups behave the same on every platform.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first, then falls back to joining with the
/// current directory.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Check whether one of the two directories contains the other.
pub fn overlaps(a: &Path, b: &Path) -> bool {
    let (a, b) = (normalize_path(a), normalize_path(b));
    a.starts_with(&b) || b.starts_with(&a)
}

/// Convert `path` relative to `root` into a `/`-separated string.
///
/// Returns `None` when `path` is outside `root` or not valid UTF-8.
pub fn rel_slash(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Directory part of a `/`-separated relative path (`""` for top-level files).
#[inline]
pub fn parent_dir(rel: &str) -> &str {
    rel.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Path of `target` as seen from directory `from_dir`, both `/`-separated
/// and relative to the same root.
///
/// ```text
/// relative_to("css", "assets/a.png")      -> "../assets/a.png"
/// relative_to("", "assets/a.png")         -> "assets/a.png"
/// relative_to("assets", "assets/a.png")   -> "a.png"
/// ```
pub fn relative_to(from_dir: &str, target: &str) -> String {
    let from: Vec<_> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<_> = target.split('/').filter(|s| !s.is_empty()).collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<&str> = Vec::with_capacity(from.len() - common + to.len() - common);
    parts.extend(std::iter::repeat_n("..", from.len() - common));
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Case-sensitive suffix match of a file name against `.{ext}`.
///
/// Hidden names never match, mirroring glob's `*` which does not match a
/// leading dot.
#[inline]
pub fn has_extension(file_name: &str, ext: &str) -> bool {
    if file_name.starts_with('.') || ext.is_empty() {
        return false;
    }
    file_name
        .strip_suffix(ext)
        .is_some_and(|stem| stem.ends_with('.'))
}

/// File name part of a `/`-separated relative path.
#[inline]
pub fn file_name(rel: &str) -> &str {
    rel.rsplit_once('/').map_or(rel, |(_, name)| name)
}
