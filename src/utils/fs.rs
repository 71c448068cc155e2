//! Directory helpers for materializing build output.

use std::fs;
use std::io;
use std::path::Path;

use jwalk::WalkDir;

/// Remove `dir` if present and recreate it empty.
pub fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Directory, or a symlink resolving to one.
pub fn is_dir_entry(file_type: &fs::FileType, path: &Path) -> bool {
    file_type.is_dir() || (file_type.is_symlink() && path.is_dir())
}

/// Copy every file under `src` into `dest`, preserving structure.
///
/// Hidden files are included and symlinks are followed, so a linked
/// directory lands in `dest` as a real one. Returns the number of files
/// copied.
pub fn copy_tree(src: &Path, dest: &Path) -> io::Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(src)
        .skip_hidden(false)
        .follow_links(true)
        .sort(true)
    {
        let entry = entry.map_err(io::Error::other)?;
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);

        if is_dir_entry(&entry.file_type(), &path) {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&path, &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_preserves_structure() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("assets/img")).unwrap();
        fs::write(src.join("index.html"), "<html>").unwrap();
        fs::write(src.join("assets/img/logo.png"), [0u8, 159, 146, 150]).unwrap();
        fs::write(src.join(".htaccess"), "deny").unwrap();

        let dest = dir.path().join("dest");
        let copied = copy_tree(&src, &dest).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read(dest.join("index.html")).unwrap(), b"<html>");
        assert_eq!(
            fs::read(dest.join("assets/img/logo.png")).unwrap(),
            [0u8, 159, 146, 150]
        );
        assert!(dest.join(".htaccess").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_follows_linked_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let ext = dir.path().join("ext");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&ext).unwrap();
        fs::write(ext.join("x.css"), "a{}").unwrap();
        std::os::unix::fs::symlink(&ext, src.join("linked")).unwrap();

        let dest = dir.path().join("dest");
        let copied = copy_tree(&src, &dest).unwrap();

        assert_eq!(copied, 1);
        assert!(dest.join("linked").is_dir());
        assert_eq!(fs::read_to_string(dest.join("linked/x.css")).unwrap(), "a{}");
    }

    #[test]
    fn test_reset_dir_clears_content() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("stale")).unwrap();
        fs::write(out.join("stale/old.js"), "old").unwrap();

        reset_dir(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }
}
