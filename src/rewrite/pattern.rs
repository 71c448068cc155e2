//! Reference patterns: where an asset path counts as a reference.
//!
//! A reference is an asset path inside delimiters, as found in HTML
//! attributes, CSS `url(...)` and JS string literals:
//!
//! | Text                          | Captured path     |
//! |-------------------------------|-------------------|
//! | `src="assets/foo.js"`         | `assets/foo.js`   |
//! | `url(/img/a.png)`             | `/img/a.png`      |
//! | `'../fonts/x.woff?v=2'`       | `../fonts/x.woff` |
//!
//! Pattern matching, not parsing: any delimited occurrence is rewritten,
//! including a longer path that merely contains the key.

use std::borrow::Cow;

use regex::{Captures, Regex};

/// Compiled matcher for one asset path.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    key: String,
    reference: Regex,
    /// Matches a URL-encoded delimiter before the key (`%22`, `%27`, ...).
    /// Such matches sit inside encoded data and are left alone.
    encoded: Regex,
}

impl ReferencePattern {
    pub fn new(key: &str) -> Result<Self, regex::Error> {
        let escaped = regex::escape(key);
        let reference = Regex::new(&format!(
            r#"["'(=][[:space:]]*([^"'()=]*{escaped}[^"'()>=]*)(\?[^"')> ]*)?[[:space:]]*\\*[[:space:]]*["')> ]"#
        ))?;
        let encoded = Regex::new(&format!(r#"%(?:22|27|5C|28|29|3D)[^"'()=]*{escaped}"#))?;

        Ok(Self {
            key: key.to_string(),
            reference,
            encoded,
        })
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Prefix every reference to the key with `prepend`.
    ///
    /// Inside each captured path the key is swapped for `target` (the asset
    /// path it stands for), leading `/`, `./` or `../` segments are dropped
    /// and `prepend` goes in front of the whole path, so `vendor/lib.js`
    /// becomes `{prepend}vendor/lib.js` for key `lib.js`. References already
    /// starting with `prepend` are kept as-is.
    pub fn rewrite<'t>(&self, text: &'t str, target: &str, prepend: &str) -> Cow<'t, str> {
        if !text.contains(&self.key) {
            return Cow::Borrowed(text);
        }

        self.reference.replace_all(text, |caps: &Captures<'_>| {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
                return caps[0].to_string();
            };
            let path_str = path.as_str();

            if path_str.starts_with(prepend) || self.encoded.is_match(path_str) {
                return whole.as_str().to_string();
            }

            let resolved = path_str.replacen(self.key.as_str(), target, 1);
            format!(
                "{}{prepend}{}{}",
                &text[whole.start()..path.start()],
                strip_relative_lead(&resolved),
                &text[path.end()..whole.end()],
            )
        })
    }
}

/// Drop leading `/`, `./`, `../` (any run of dots then a slash) segments.
fn strip_relative_lead(path: &str) -> &str {
    let mut rest = path;
    while let Some((segment, tail)) = rest.split_once('/') {
        if !segment.chars().all(|c| c == '.') {
            break;
        }
        rest = tail;
    }
    rest
}
