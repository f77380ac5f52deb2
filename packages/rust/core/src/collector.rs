//! Input file discovery.
//!
//! Walks the scan root, prunes excluded directory names and keeps files whose
//! extension is selected. The result order only depends on the relative
//! paths, so a fixed file set always produces the same document.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use ignore::WalkBuilder;
use tracing::{debug, instrument, warn};

use docbundle_shared::{
    BundleConfig, CollectedFile, DEFAULT_EXCLUDE_DIRS, DEFAULT_INCLUDE_EXTENSIONS, Result,
};

/// File selection rules.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Lowercased extensions with their leading dot (e.g. `.md`).
    pub include_extensions: BTreeSet<String>,
    /// Directory names whose subtree is never visited.
    pub exclude_dirs: BTreeSet<String>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            include_extensions: DEFAULT_INCLUDE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<&BundleConfig> for CollectOptions {
    fn from(config: &BundleConfig) -> Self {
        Self {
            include_extensions: config.include_extensions.clone(),
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }
}

/// Collect matching files below `root`, sorted by relative path.
///
/// Ordering compares relative paths component by component, ignoring case,
/// with the exact path as tie-breaker. Finding nothing is not an error.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn collect(root: &Path, opts: &CollectOptions) -> Result<Vec<CollectedFile>> {
    let exclude_dirs = opts.exclude_dirs.clone();

    // Only the two filters below apply: no hidden-file or .gitignore rules.
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            let excluded = entry
                .file_name()
                .to_str()
                .is_some_and(|name| exclude_dirs.contains(name));
            entry.depth() == 0 || !(is_dir && excluded)
        })
        .build();

    let mut files = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if entry.depth() == 0 || entry.file_type().is_none_or(|ft| ft.is_dir()) {
            continue;
        }

        let path = entry.path();
        // Symlinked directories are listed but never followed.
        if entry.path_is_symlink() && path.is_dir() {
            continue;
        }
        if !has_selected_extension(path, &opts.include_extensions) {
            continue;
        }

        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };

        files.push(CollectedFile {
            path: path.to_path_buf(),
            rel_path: slash_path(rel),
        });
    }

    files.sort_by_cached_key(|f| (sort_key(&f.rel_path), f.rel_path.clone()));

    debug!(files = files.len(), "collected input files");

    Ok(files)
}

/// True when the final dot-suffix of the file name (lowercased) is selected.
fn has_selected_extension(path: &Path, include: &BTreeSet<String>) -> bool {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .is_some_and(|ext| include.contains(&ext))
}

/// Join path components with `/` regardless of platform.
fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn sort_key(rel_path: &str) -> Vec<String> {
    rel_path.split('/').map(str::to_lowercase).collect()
}
