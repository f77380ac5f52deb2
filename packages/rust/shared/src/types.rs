//! Core domain types shared between the fetch and bundling stages.

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// SourceReference
// ---------------------------------------------------------------------------

/// A directory within one branch of a hosted repository.
///
/// `owner`, `repo` and `branch` are never empty. `subpath` may be empty,
/// meaning "no directory given"; callers pick their own default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Directory inside the repository, without leading/trailing slashes.
    pub subpath: String,
}

impl SourceReference {
    /// Internal path prefix shared by every entry of a branch archive.
    pub fn archive_root(&self) -> String {
        format!("{}-{}/", self.repo, self.branch)
    }

    /// Return a copy with `subpath` replaced when it is empty.
    pub fn with_default_subpath(mut self, default: &str) -> Self {
        if self.subpath.is_empty() {
            self.subpath = default.trim_matches('/').to_string();
        }
        self
    }
}

impl std::fmt::Display for SourceReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)?;
        if !self.subpath.is_empty() {
            write!(f, ":{}", self.subpath)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CollectedFile
// ---------------------------------------------------------------------------

/// A file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    /// Location on disk (scan root joined with the relative path).
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated on every platform.
    pub rel_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(subpath: &str) -> SourceReference {
        SourceReference {
            owner: "zama-ai".into(),
            repo: "fhevm".into(),
            branch: "main".into(),
            subpath: subpath.into(),
        }
    }

    #[test]
    fn archive_root_uses_repo_and_branch() {
        assert_eq!(source("docs").archive_root(), "fhevm-main/");
    }

    #[test]
    fn default_subpath_only_fills_empty() {
        assert_eq!(source("").with_default_subpath("docs").subpath, "docs");
        assert_eq!(source("guides").with_default_subpath("docs").subpath, "guides");
    }

    #[test]
    fn display_includes_subpath_when_present() {
        assert_eq!(source("docs").to_string(), "zama-ai/fhevm@main:docs");
        assert_eq!(source("").to_string(), "zama-ai/fhevm@main");
    }
}
