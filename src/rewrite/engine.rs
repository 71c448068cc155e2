//! Regex-based rewriter over a directory tree.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jwalk::WalkDir;
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::{
    ContentHash, ContentRewriter, ReferencePattern, RewriteCache, RewriteError, RewriteOptions,
    RewriteOutput, RewriteStats,
};
use crate::asset::AssetSet;
use crate::core::BuildNode;
use crate::utils::fs::{is_dir_entry, reset_dir};
use crate::utils::path::{overlaps, parent_dir, rel_slash, relative_to};

/// Rewrites delimited asset references in matching text files.
///
/// Keeps a [`RewriteCache`] for as long as the rewriter lives, so a stage
/// that runs several passes reuses output for files that did not change.
#[derive(Debug, Default)]
pub struct RegexRewriter {
    cache: RewriteCache,
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Rewritten,
    Cached,
    Copied,
}

impl RegexRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &RewriteCache {
        &self.cache
    }

    fn process_file(
        &self,
        source: &Path,
        target: &Path,
        rel: &str,
        plan: &RewritePlan<'_>,
        options: &RewriteOptions,
    ) -> Result<FileOutcome, RewriteError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |e: std::io::Error| RewriteError::Io(path, e)
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        if !options.should_rewrite(rel) {
            fs::copy(source, target).map_err(io_err(source))?;
            return Ok(FileOutcome::Copied);
        }

        let bytes = fs::read(source).map_err(io_err(source))?;
        let hash = options
            .enable_caching
            .then(|| ContentHash::of_parts(&[options.prepend.as_bytes(), &bytes]));

        if let Some(hash) = hash
            && let Some(cached) = self.cache.get(rel, hash)
        {
            crate::debug!("rewrite"; "cache hit {} ({})", rel, hash);
            fs::write(target, cached.as_bytes()).map_err(io_err(target))?;
            return Ok(FileOutcome::Cached);
        }

        let Ok(text) = std::str::from_utf8(&bytes) else {
            crate::debug!("rewrite"; "not utf-8, copying {}", rel);
            fs::write(target, &bytes).map_err(io_err(target))?;
            return Ok(FileOutcome::Copied);
        };

        let output = plan.apply(text, rel)?;
        fs::write(target, output.as_bytes()).map_err(io_err(target))?;

        if let Some(hash) = hash {
            self.cache.insert(rel, hash, Arc::from(output));
        }

        Ok(FileOutcome::Rewritten)
    }
}

impl ContentRewriter for RegexRewriter {
    fn rewrite(
        &self,
        input: &BuildNode,
        output: &Path,
        assets: &AssetSet,
        options: &RewriteOptions,
    ) -> Result<RewriteOutput, RewriteError> {
        let root = input.path();
        if overlaps(root, output) {
            return Err(RewriteError::Overlap {
                input: root.to_path_buf(),
                output: output.to_path_buf(),
            });
        }

        fs::metadata(root).map_err(|e| RewriteError::Io(root.to_path_buf(), e))?;
        let files = collect_files(root)?;
        let plan = RewritePlan::new(assets, &options.prepend)?;

        reset_dir(output).map_err(|e| RewriteError::Io(output.to_path_buf(), e))?;

        let outcomes = files
            .par_iter()
            .map(|(source, rel)| {
                self.process_file(source, &output.join(rel), rel, &plan, options)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // files gone from the input never come back as hits
        let live: FxHashSet<&str> = files.iter().map(|(_, rel)| rel.as_str()).collect();
        self.cache.retain(|rel| live.contains(rel));

        let mut stats = RewriteStats::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Rewritten => stats.rewritten += 1,
                FileOutcome::Cached => stats.cached += 1,
                FileOutcome::Copied => stats.copied += 1,
            }
        }

        crate::debug!(options.annotation.as_str(); "{} rewritten, {} cached, {} copied",
            stats.rewritten, stats.cached, stats.copied);

        Ok(RewriteOutput {
            node: BuildNode::new(output),
            stats,
        })
    }
}

/// All files under `root` (hidden ones included, symlinks followed) with
/// their relative paths.
fn collect_files(root: &Path) -> Result<Vec<(PathBuf, String)>, RewriteError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(true)
        .sort(true)
    {
        let entry = entry.map_err(|e| RewriteError::Walk(root.to_path_buf(), e))?;
        let path = entry.path();
        if is_dir_entry(&entry.file_type(), &path) {
            continue;
        }

        match rel_slash(&path, root) {
            Some(rel) => files.push((path, rel)),
            None => crate::debug!("rewrite"; "skipping non-utf8 path: {}", path.display()),
        }
    }

    Ok(files)
}

// ============================================================================
// Rewrite plan (per pass)
// ============================================================================

/// Patterns for every asset of the pass, longest key first.
struct RewritePlan<'a> {
    prepend: &'a str,
    patterns: Vec<ReferencePattern>,
}

impl<'a> RewritePlan<'a> {
    fn new(assets: &AssetSet, prepend: &'a str) -> Result<Self, RewriteError> {
        let patterns = assets
            .paths_longest_first()
            .into_iter()
            .map(compile)
            .collect::<Result<_, _>>()?;
        Ok(Self { prepend, patterns })
    }

    /// Rewrite the text of the file at `rel`.
    ///
    /// Each asset is matched as written (`assets/a.png`) and as seen from the
    /// file's own directory (`../assets/a.png` from `css/app.css`). Both forms
    /// become the absolute `{prepend}{asset}`.
    fn apply(&self, text: &str, rel: &str) -> Result<String, RewriteError> {
        let dir = parent_dir(rel);
        let mut text = text.to_string();

        for pattern in &self.patterns {
            let key = pattern.key();
            rewrite_in_place(pattern, &mut text, key, self.prepend);

            let relative = relative_to(dir, key);
            if relative != key && text.contains(&relative) {
                rewrite_in_place(&compile(&relative)?, &mut text, key, self.prepend);
            }
        }

        Ok(text)
    }
}

fn rewrite_in_place(
    pattern: &ReferencePattern,
    text: &mut String,
    target: &str,
    prepend: &str,
) {
    let rewritten = match pattern.rewrite(text, target, prepend) {
        Cow::Borrowed(_) => return,
        Cow::Owned(s) => s,
    };
    *text = rewritten;
}

fn compile(key: &str) -> Result<ReferencePattern, RewriteError> {
    ReferencePattern::new(key).map_err(|e| RewriteError::Pattern(key.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CDN: &str = "https://cdn.example/";

    fn options(replace: &[&str]) -> RewriteOptions {
        RewriteOptions {
            prepend: CDN.into(),
            replace_extensions: replace.iter().map(|s| s.to_string()).collect(),
            enable_caching: true,
            ignore: vec![],
            annotation: "asset-prepend".into(),
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join(rel)).unwrap()
    }

    #[test]
    fn test_plan_longest_key_first() {
        let assets: AssetSet = ["foo.js", "assets/foo.js"].into_iter().collect();
        let plan = RewritePlan::new(&assets, CDN).unwrap();

        let out = plan
            .apply(r#"<script src="assets/foo.js"></script><script src="foo.js"></script>"#, "index.html")
            .unwrap();
        assert_eq!(
            out,
            r#"<script src="https://cdn.example/assets/foo.js"></script><script src="https://cdn.example/foo.js"></script>"#
        );
    }

    #[test]
    fn test_plan_parent_relative_reference() {
        let assets: AssetSet = ["assets/bg.png"].into_iter().collect();
        let plan = RewritePlan::new(&assets, CDN).unwrap();

        let out = plan
            .apply("body { background: url(../assets/bg.png); }", "css/app.css")
            .unwrap();
        assert_eq!(out, "body { background: url(https://cdn.example/assets/bg.png); }");
    }

    #[test]
    fn test_plan_sibling_reference() {
        let assets: AssetSet = ["assets/css/bg.png"].into_iter().collect();
        let plan = RewritePlan::new(&assets, CDN).unwrap();

        let out = plan
            .apply("body { background: url(bg.png); }", "assets/css/app.css")
            .unwrap();
        assert_eq!(
            out,
            "body { background: url(https://cdn.example/assets/css/bg.png); }"
        );
    }

    #[test]
    fn test_rewrite_tree() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        write(&input, "index.html", r#"<link href="app.css"><script src="app.js"></script>"#);
        write(&input, "app.css", "x");
        write(&input, "app.js", "var a = 'app.css';");
        write(&input, "notes.txt", r#"src="app.js""#);

        let assets: AssetSet = ["app.css", "app.js"].into_iter().collect();
        let rewriter = RegexRewriter::new();
        let result = rewriter
            .rewrite(&BuildNode::new(&input), &output, &assets, &options(&["html", "js"]))
            .unwrap();

        assert_eq!(result.node.path(), output.as_path());
        assert_eq!(
            read(&output, "index.html"),
            r#"<link href="https://cdn.example/app.css"><script src="https://cdn.example/app.js"></script>"#
        );
        assert_eq!(read(&output, "app.js"), "var a = 'https://cdn.example/app.css';");
        assert_eq!(read(&output, "app.css"), "x");
        assert_eq!(read(&output, "notes.txt"), r#"src="app.js""#);
        assert_eq!(
            result.stats,
            RewriteStats {
                rewritten: 2,
                cached: 0,
                copied: 2
            }
        );
    }

    #[test]
    fn test_rewrite_copies_binary_content() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        let bytes = [0xffu8, 0xfe, b'"', b'a', b'.', b'j', b's', b'"'];
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("blob.js"), bytes).unwrap();

        let assets: AssetSet = ["a.js"].into_iter().collect();
        let stats = RegexRewriter::new()
            .rewrite(&BuildNode::new(&input), &output, &assets, &options(&["js"]))
            .unwrap()
            .stats;

        assert_eq!(fs::read(output.join("blob.js")).unwrap(), bytes);
        assert_eq!(stats.copied, 1);
    }

    #[test]
    fn test_rewrite_cache_across_passes() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        write(&input, "index.html", r#"<img src="a.png">"#);

        let assets: AssetSet = ["a.png"].into_iter().collect();
        let rewriter = RegexRewriter::new();
        let node = BuildNode::new(&input);
        let opts = options(&["html"]);

        let first = rewriter.rewrite(&node, &output, &assets, &opts).unwrap();
        assert_eq!(first.stats.rewritten, 1);

        let second = rewriter.rewrite(&node, &output, &assets, &opts).unwrap();
        assert_eq!(second.stats.cached, 1);
        assert_eq!(read(&output, "index.html"), r#"<img src="https://cdn.example/a.png">"#);
        assert_eq!(rewriter.cache().len(), 1);
    }

    #[test]
    fn test_rewrite_cache_drops_removed_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        write(&input, "index.html", r#"<img src="a.png">"#);
        write(&input, "about.html", r#"<img src="a.png">"#);

        let assets: AssetSet = ["a.png"].into_iter().collect();
        let rewriter = RegexRewriter::new();
        let node = BuildNode::new(&input);
        let opts = options(&["html"]);

        rewriter.rewrite(&node, &output, &assets, &opts).unwrap();
        assert_eq!(rewriter.cache().len(), 2);

        fs::remove_file(input.join("about.html")).unwrap();
        rewriter.rewrite(&node, &output, &assets, &opts).unwrap();

        assert_eq!(rewriter.cache().len(), 1);
        assert!(!output.join("about.html").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_follows_linked_dir() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        write(&input, "index.html", r#"<link href="linked/x.css">"#);
        write(&dir.path().join("ext"), "x.css", "a{}");
        std::os::unix::fs::symlink(dir.path().join("ext"), input.join("linked")).unwrap();

        let assets: AssetSet = ["linked/x.css"].into_iter().collect();
        let result = RegexRewriter::new()
            .rewrite(&BuildNode::new(&input), &output, &assets, &options(&["html"]))
            .unwrap();

        assert_eq!(read(&output, "linked/x.css"), "a{}");
        assert_eq!(
            read(&output, "index.html"),
            r#"<link href="https://cdn.example/linked/x.css">"#
        );
        assert_eq!(result.stats.copied, 1);
    }

    #[test]
    fn test_rewrite_without_cache() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        write(&input, "index.html", r#"<img src="a.png">"#);

        let assets: AssetSet = ["a.png"].into_iter().collect();
        let rewriter = RegexRewriter::new();
        let node = BuildNode::new(&input);
        let opts = RewriteOptions {
            enable_caching: false,
            ..options(&["html"])
        };

        rewriter.rewrite(&node, &output, &assets, &opts).unwrap();
        let second = rewriter.rewrite(&node, &output, &assets, &opts).unwrap();

        assert_eq!(second.stats.rewritten, 1);
        assert!(rewriter.cache().is_empty());
    }

    #[test]
    fn test_rewrite_clears_stale_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        write(&input, "index.html", "<html>");
        write(&output, "stale.html", "old");

        RegexRewriter::new()
            .rewrite(&BuildNode::new(&input), &output, &AssetSet::new(), &options(&["html"]))
            .unwrap();

        assert!(!output.join("stale.html").exists());
        assert!(output.join("index.html").exists());
    }

    #[test]
    fn test_rewrite_rejects_overlapping_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        write(&input, "index.html", "<html>");

        let err = RegexRewriter::new()
            .rewrite(
                &BuildNode::new(&input),
                &input.join("out"),
                &AssetSet::new(),
                &options(&["html"]),
            )
            .unwrap_err();

        assert!(matches!(err, RewriteError::Overlap { .. }));
        assert!(input.join("index.html").exists());
    }

    #[test]
    fn test_rewrite_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = RegexRewriter::new()
            .rewrite(
                &BuildNode::new(dir.path().join("missing")),
                &dir.path().join("out"),
                &AssetSet::new(),
                &options(&["html"]),
            )
            .unwrap_err();

        assert!(matches!(err, RewriteError::Io(..)));
    }
}
