//! Source-tree URL parsing.
//!
//! Accepts URLs of the form
//! `https://github.com/<owner>/<repo>/tree/<branch>[/<subpath>]`.

use std::sync::LazyLock;

use regex::Regex;

use docbundle_shared::{DocBundleError, Result, SourceReference};

static TREE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+)/tree/(?P<branch>[^/]+)(?:/(?P<subpath>.*))?$",
    )
    .expect("valid regex")
});

/// Parse a source-tree URL into its owner, repository, branch and subpath.
///
/// Surrounding whitespace is ignored and slashes around the subpath are
/// trimmed. Anything else fails with [`DocBundleError::MalformedUrl`].
pub fn parse_tree_url(url: &str) -> Result<SourceReference> {
    let caps = TREE_URL_RE
        .captures(url.trim())
        .ok_or_else(|| DocBundleError::malformed_url(url))?;

    Ok(SourceReference {
        owner: caps["owner"].to_string(),
        repo: caps["repo"].to_string(),
        branch: caps["branch"].to_string(),
        subpath: caps
            .name("subpath")
            .map(|m| m.as_str().trim_matches('/').to_string())
            .unwrap_or_default(),
    })
}
