//! Per-path inclusion rule for asset indexing.

use std::fmt;
use std::sync::Arc;

use glob::{MatchOptions, Pattern};

use super::ConfigError;

type Predicate = dyn Fn(&str) -> bool + Send + Sync;

/// Predicate deciding whether a scanned file is indexed as an asset.
///
/// Receives the path relative to the scanned root, `/`-separated.
/// The default accepts everything.
#[derive(Clone)]
pub struct AssetFilter(Arc<Predicate>);

impl AssetFilter {
    /// Wrap an arbitrary predicate.
    pub fn new(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Filter that accepts every path.
    pub fn accept_all() -> Self {
        Self::new(|_| true)
    }

    /// Filter that rejects paths matching any of the glob `patterns`.
    ///
    /// `*` does not cross `/`, `**` does.
    pub fn exclude<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let compiled = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| ConfigError::Pattern(p.to_string(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        Ok(Self::new(move |path| {
            !compiled.iter().any(|p| p.matches_with(path, options))
        }))
    }

    #[inline]
    pub fn accepts(&self, path: &str) -> bool {
        (self.0)(path)
    }
}

impl Default for AssetFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl fmt::Debug for AssetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AssetFilter(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accepts_everything() {
        let filter = AssetFilter::default();
        assert!(filter.accepts("assets/foo.js"));
        assert!(filter.accepts(""));
    }

    #[test]
    fn test_custom_predicate() {
        let filter = AssetFilter::new(|p| !p.starts_with("vendor/"));
        assert!(filter.accepts("assets/app.js"));
        assert!(!filter.accepts("vendor/lib.js"));
    }

    #[test]
    fn test_exclude_patterns() {
        let filter = AssetFilter::exclude(&["**/*.map", "private/*"]).unwrap();
        assert!(!filter.accepts("assets/app.js.map"));
        assert!(!filter.accepts("app.js.map"));
        assert!(!filter.accepts("private/key.png"));
        assert!(filter.accepts("private/nested/key.png"));
        assert!(filter.accepts("assets/app.js"));
    }

    #[test]
    fn test_exclude_invalid_pattern() {
        let err = AssetFilter::exclude(&["[unclosed"]).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern(p, _) if p == "[unclosed"));
    }
}
