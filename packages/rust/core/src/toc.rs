//! Table of contents and section anchors.
//!
//! Every collected file gets one anchor derived from its relative path. The
//! same function feeds the TOC link and the in-body `<a id>` marker, so the
//! two always agree.

use std::sync::LazyLock;

use regex::Regex;

use docbundle_shared::CollectedFile;

/// Heading of the table of contents section.
pub const TOC_HEADING: &str = "## Table of Contents";

/// Derive the link anchor for a `/`-separated relative path.
///
/// Lowercases the path, drops everything except letters, digits, `_`, `/`,
/// `-`, `.` and spaces, then turns spaces into hyphens. Letters and digits are
/// the Unicode `L` and `N` categories, so combining marks are dropped and
/// numerics like `½` are kept.
pub fn anchor_for(rel_path: &str) -> String {
    static STRIP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_/\-. ]").expect("valid regex"));

    let lowered = rel_path.to_lowercase();
    STRIP_RE.replace_all(&lowered, "").replace(' ', "-")
}

/// Render the TOC block: heading, blank line, one link per file, trailing
/// blank line.
pub fn render_toc(files: &[CollectedFile]) -> String {
    let mut lines = Vec::with_capacity(files.len() + 3);
    lines.push(TOC_HEADING.to_string());
    lines.push(String::new());

    for file in files {
        lines.push(format!("- [{}](#{})", file.rel_path, anchor_for(&file.rel_path)));
    }

    lines.push(String::new());
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
