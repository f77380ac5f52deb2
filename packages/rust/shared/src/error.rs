//! Error types for docbundle.
//!
//! Library crates use [`DocBundleError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docbundle operations.
#[derive(Debug, thiserror::Error)]
pub enum DocBundleError {
    /// The source-tree URL does not have the `<host>/<owner>/<repo>/tree/<branch>` shape.
    #[error("not a valid GitHub tree URL: {url}")]
    MalformedUrl { url: String },

    /// Network/HTTP error while downloading the branch archive.
    #[error("download error: {0}")]
    Download(String),

    /// The downloaded bytes could not be read as a zip archive.
    #[error("archive error: {0}")]
    Archive(String),

    /// The archive does not contain the requested subdirectory.
    #[error("subdirectory '{subpath}' not found in archive of {owner}/{repo}@{branch}")]
    SubdirectoryNotFound {
        owner: String,
        repo: String,
        branch: String,
        subpath: String,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration loading error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Precondition violated (e.g. scan root missing after the fetch step).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocBundleError>;

impl DocBundleError {
    /// Create a malformed-URL error for the offending input.
    pub fn malformed_url(url: impl Into<String>) -> Self {
        Self::MalformedUrl { url: url.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocBundleError::malformed_url("https://gitlab.com/a/b");
        assert_eq!(
            err.to_string(),
            "not a valid GitHub tree URL: https://gitlab.com/a/b"
        );

        let err = DocBundleError::SubdirectoryNotFound {
            owner: "zama-ai".into(),
            repo: "fhevm".into(),
            branch: "main".into(),
            subpath: "guides".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'guides'"));
        assert!(msg.contains("zama-ai/fhevm@main"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DocBundleError::io("/tmp/out.txt", source);
        assert!(err.to_string().contains("/tmp/out.txt"));
    }
}
