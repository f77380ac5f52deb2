//! Remote documentation tree download.
//!
//! When the local scan root is missing or empty, docbundle downloads the
//! branch archive of the repository named by a source-tree URL and extracts
//! the requested subdirectory into the root. A populated root is treated as a
//! cache and never triggers network access.

pub mod archive;
pub mod locator;

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use docbundle_shared::{DocBundleError, FetchOptions, Result, SourceReference};

pub use archive::{extract_subdir, subdir_prefix};
pub use locator::parse_tree_url;

/// Subdirectory used when the source-tree URL names none.
pub const DEFAULT_SUBPATH: &str = "docs";

/// User-Agent string for archive downloads.
const USER_AGENT: &str = concat!("docbundle/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// What [`ensure_present`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The root already had content; nothing was downloaded.
    AlreadyPresent,
    /// The subdirectory was downloaded and extracted into the root.
    Downloaded {
        /// Where the files came from (subpath defaulted if needed).
        source: SourceReference,
        /// Number of files written below the root.
        files_written: usize,
    },
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Make sure `local_root` holds the documentation tree named by `source_url`.
///
/// A root that exists and is not an empty directory is left untouched. Otherwise
/// the branch archive is downloaded in one request, decoded, and the requested
/// subdirectory is mirrored into `local_root`.
///
/// `local_root` is only created once extraction writes its first file. When
/// the download fails and no root existed, none is left behind, so the caller
/// sees a missing root rather than an empty one.
#[instrument(skip_all, fields(root = %local_root.display()))]
pub async fn ensure_present(
    local_root: &Path,
    source_url: &str,
    opts: &FetchOptions,
) -> Result<FetchOutcome> {
    if !needs_download(local_root)? {
        debug!("root already populated, skipping download");
        return Ok(FetchOutcome::AlreadyPresent);
    }

    let source = parse_tree_url(source_url)?.with_default_subpath(DEFAULT_SUBPATH);
    let zip_url = archive_url(&opts.archive_base_url, &source)?;

    info!(
        subpath = %source.subpath,
        owner = %source.owner,
        repo = %source.repo,
        branch = %source.branch,
        "downloading documentation tree"
    );

    let client = build_client(opts)?;
    let bytes = download(&client, &zip_url).await?;
    debug!(bytes = bytes.len(), "archive downloaded");

    let files_written = extract_subdir(&bytes, &source, local_root)?;

    info!(
        files = files_written,
        dest = %local_root.display(),
        "extracted {}/",
        source.subpath
    );

    Ok(FetchOutcome::Downloaded {
        source,
        files_written,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// True when `root` does not exist or is an empty directory.
fn needs_download(root: &Path) -> Result<bool> {
    if !root.exists() {
        return Ok(true);
    }
    if !root.is_dir() {
        return Ok(false);
    }

    let mut entries = std::fs::read_dir(root).map_err(|e| DocBundleError::io(root, e))?;
    Ok(entries.next().is_none())
}

/// Branch-archive address: `<base>/<owner>/<repo>/zip/refs/heads/<branch>`.
pub fn archive_url(base: &Url, source: &SourceReference) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DocBundleError::config(format!("archive base URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend([
            source.owner.as_str(),
            source.repo.as_str(),
            "zip",
            "refs",
            "heads",
            source.branch.as_str(),
        ]);
    Ok(url)
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &FetchOptions) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = opts.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder
        .build()
        .map_err(|e| DocBundleError::Download(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the whole body.
async fn download(client: &Client, url: &Url) -> Result<Vec<u8>> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| DocBundleError::Download(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DocBundleError::Download(format!("{url}: HTTP {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| DocBundleError::Download(format!("{url}: failed to read body: {e}")))?;

    Ok(body.to_vec())
}
