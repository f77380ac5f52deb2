//! Application configuration for docbundle.
//!
//! User config lives at `~/.docbundle/docbundle.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocBundleError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docbundle.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docbundle";

/// Directory scanned (and downloaded into when missing).
pub const DEFAULT_ROOT: &str = "docs";

/// Combined output file.
pub const DEFAULT_OUT: &str = "zama-llm.txt";

/// Source tree fetched when the root is missing or empty.
pub const DEFAULT_TREE_URL: &str = "https://github.com/zama-ai/fhevm/tree/main/docs";

/// Title line of the combined document.
pub const DEFAULT_TITLE: &str = "Zama FHEVM Combined Documentation";

/// Host serving branch zip archives.
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://codeload.github.com";

pub const DEFAULT_INCLUDE_EXTENSIONS: &[&str] = &[".md", ".mdx", ".txt"];

pub const DEFAULT_EXCLUDE_DIRS: &[&str] =
    &[".git", ".gitbook", "node_modules", ".DS_Store", "__pycache__"];

// ---------------------------------------------------------------------------
// Config structs (matching docbundle.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Paths, source URL and title.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// File selection rules.
    #[serde(default)]
    pub filters: FiltersConfig,

    /// Archive download settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Folder to scan or download into.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Output file path.
    #[serde(default = "default_out")]
    pub out: PathBuf,

    /// Source-tree URL used when the root is missing or empty.
    #[serde(default = "default_github")]
    pub github: String,

    /// Title line of the combined document.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            out: default_out(),
            github: default_github(),
            title: default_title(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}
fn default_out() -> PathBuf {
    PathBuf::from(DEFAULT_OUT)
}
fn default_github() -> String {
    DEFAULT_TREE_URL.into()
}
fn default_title() -> String {
    DEFAULT_TITLE.into()
}

/// `[filters]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// File extensions to include (with or without the leading dot).
    #[serde(default = "default_include_extensions")]
    pub include_extensions: Vec<String>,

    /// Directory names never descended into.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            include_extensions: default_include_extensions(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

fn default_include_extensions() -> Vec<String> {
    DEFAULT_INCLUDE_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}
fn default_exclude_dirs() -> Vec<String> {
    DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the branch-archive endpoint.
    #[serde(default = "default_archive_base_url")]
    pub archive_base_url: String,

    /// Request timeout. Unset means the transport default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            archive_base_url: default_archive_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_archive_base_url() -> String {
    DEFAULT_ARCHIVE_BASE_URL.into()
}

// ---------------------------------------------------------------------------
// Bundle config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Download settings handed to the archive fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub archive_base_url: Url,
    pub timeout_secs: Option<u64>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            archive_base_url: Url::parse(DEFAULT_ARCHIVE_BASE_URL)
                .expect("valid default archive URL"),
            timeout_secs: None,
        }
    }
}

/// Runtime bundle configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Folder to scan or download into.
    pub root: PathBuf,
    /// Output file path.
    pub out: PathBuf,
    /// Source-tree URL.
    pub source_url: String,
    /// Title line of the combined document.
    pub title: String,
    /// Lowercased extensions, each with a leading dot.
    pub include_extensions: BTreeSet<String>,
    /// Directory names pruned from the walk.
    pub exclude_dirs: BTreeSet<String>,
    /// Archive download settings.
    pub fetch: FetchOptions,
}

impl BundleConfig {
    /// Add extra extensions on top of the configured set.
    pub fn add_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_extensions
            .extend(extensions.into_iter().filter_map(|e| normalize_extension(e.as_ref())));
    }

    /// Disable every directory exclusion.
    pub fn clear_excludes(&mut self) {
        self.exclude_dirs.clear();
    }
}

impl TryFrom<&AppConfig> for BundleConfig {
    type Error = DocBundleError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let archive_base_url = Url::parse(&config.fetch.archive_base_url).map_err(|e| {
            DocBundleError::config(format!(
                "invalid archive_base_url '{}': {e}",
                config.fetch.archive_base_url
            ))
        })?;

        Ok(Self {
            root: config.defaults.root.clone(),
            out: config.defaults.out.clone(),
            source_url: config.defaults.github.clone(),
            title: config.defaults.title.clone(),
            include_extensions: config
                .filters
                .include_extensions
                .iter()
                .filter_map(|e| normalize_extension(e))
                .collect(),
            exclude_dirs: config.filters.exclude_dirs.iter().cloned().collect(),
            fetch: FetchOptions {
                archive_base_url,
                timeout_secs: config.fetch.timeout_secs,
            },
        })
    }
}

/// Lowercase an extension and make sure it starts with a dot.
///
/// Returns `None` for blank input.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{ext}"))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docbundle/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocBundleError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docbundle/docbundle.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using defaults");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocBundleError::io(path, e))?;

    let config = toml::from_str(&content).map_err(|e| {
        DocBundleError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    tracing::debug!(?path, "loaded config file");

    Ok(config)
}
