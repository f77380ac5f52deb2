//! Shared types, error model, and configuration for docbundle.
//!
//! This crate is the foundation depended on by all other docbundle crates.
//! It provides:
//! - [`DocBundleError`]: the unified error type
//! - Domain types ([`SourceReference`], [`CollectedFile`])
//! - Configuration ([`AppConfig`], [`BundleConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BundleConfig, DEFAULT_ARCHIVE_BASE_URL, DEFAULT_EXCLUDE_DIRS,
    DEFAULT_INCLUDE_EXTENSIONS, DEFAULT_OUT, DEFAULT_ROOT, DEFAULT_TITLE, DEFAULT_TREE_URL,
    DefaultsConfig, FetchConfig, FetchOptions, FiltersConfig, config_dir, config_file_path,
    load_config, load_config_from, normalize_extension,
};
pub use error::{DocBundleError, Result};
pub use types::{CollectedFile, SourceReference};
