//! End-to-end bundle pipeline: fetch (if needed) → collect → assemble → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use docbundle_fetch::FetchOutcome;
use docbundle_shared::{BundleConfig, DocBundleError, Result};

use crate::assembler::{build_document, content_sha256, write_document};
use crate::collector::{CollectOptions, collect};

/// Summary of a written combined document.
#[derive(Debug, Clone)]
pub struct BundleSummary {
    /// Absolute path of the output file.
    pub out_path: PathBuf,
    /// Number of input files combined.
    pub file_count: usize,
    /// Size of the document in bytes.
    pub bytes: usize,
    /// Hex SHA-256 of the document.
    pub sha256: String,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Result of the bundle pipeline.
#[derive(Debug, Clone)]
pub enum BundleOutcome {
    /// The combined document was written.
    Written(BundleSummary),
    /// No input file matched; nothing was written.
    NothingToDo,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &BundleOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &BundleOutcome) {}
}

/// Run the full bundle pipeline.
///
/// 1. Download the source tree if the root is missing or empty (failures only warn)
/// 2. Check that the root is a directory
/// 3. Collect input files
/// 4. Build and write the combined document
#[instrument(skip_all, fields(root = %config.root.display(), out = %config.out.display()))]
pub async fn bundle(
    config: &BundleConfig,
    progress: &dyn ProgressReporter,
) -> Result<BundleOutcome> {
    let start = Instant::now();

    // --- Phase 1: Fetch ---
    progress.phase("Checking documentation root");
    match docbundle_fetch::ensure_present(&config.root, &config.source_url, &config.fetch).await {
        Ok(FetchOutcome::AlreadyPresent) => debug!("using existing root"),
        Ok(FetchOutcome::Downloaded {
            source,
            files_written,
        }) => info!(%source, files_written, "fetched documentation tree"),
        // The root may still be usable (populated earlier or by other means).
        Err(e) => warn!(error = %e, "could not fetch from GitHub"),
    }

    if !config.root.is_dir() {
        return Err(DocBundleError::validation(format!(
            "root folder not found or not a directory: {}",
            config.root.display()
        )));
    }

    // --- Phase 2: Collect ---
    progress.phase("Collecting files");
    let files = collect(&config.root, &CollectOptions::from(config))?;

    if files.is_empty() {
        info!("no input files found");
        let outcome = BundleOutcome::NothingToDo;
        progress.done(&outcome);
        return Ok(outcome);
    }

    // --- Phase 3: Assemble + write ---
    progress.phase(&format!("Combining {} files", files.len()));
    let document = build_document(&config.title, &files)?;
    write_document(&config.out, &document)?;

    let out_path =
        std::fs::canonicalize(&config.out).map_err(|e| DocBundleError::io(&config.out, e))?;

    let summary = BundleSummary {
        out_path,
        file_count: files.len(),
        bytes: document.len(),
        sha256: content_sha256(&document),
        elapsed: start.elapsed(),
    };

    info!(
        files = summary.file_count,
        bytes = summary.bytes,
        sha256 = %summary.sha256,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "bundle complete"
    );

    let outcome = BundleOutcome::Written(summary);
    progress.done(&outcome);
    Ok(outcome)
}
