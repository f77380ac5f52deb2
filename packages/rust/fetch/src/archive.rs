//! Branch-archive extraction.
//!
//! A branch archive stores every entry under `<repo>-<branch>/`. Only the
//! members below `<repo>-<branch>/<subpath>/` are written out, relative to
//! that prefix.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument, warn};
use zip::ZipArchive;

use docbundle_shared::{DocBundleError, Result, SourceReference};

/// Internal path prefix selecting `source.subpath` inside the archive.
///
/// Always ends with exactly one `/`.
pub fn subdir_prefix(source: &SourceReference) -> String {
    let root = source.archive_root();
    let joined = format!("{root}{}", source.subpath.trim_matches('/'));
    format!("{}/", joined.trim_end_matches('/'))
}

/// Extract the members under `source.subpath` from zip `bytes` into `dest`.
///
/// Returns the number of files written. `dest` and any intermediate
/// directories are created as needed. Nothing is rolled back if writing
/// fails halfway.
#[instrument(skip_all, fields(source = %source, dest = %dest.display()))]
pub fn extract_subdir(bytes: &[u8], source: &SourceReference, dest: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocBundleError::Archive(format!("not a readable zip archive: {e}")))?;

    let prefix = subdir_prefix(source);
    let members = select_members(&mut archive, &prefix)?;

    if members.is_empty() {
        return Err(DocBundleError::SubdirectoryNotFound {
            owner: source.owner.clone(),
            repo: source.repo.clone(),
            branch: source.branch.clone(),
            subpath: source.subpath.clone(),
        });
    }

    debug!(%prefix, members = members.len(), "extracting archive members");

    let mut written = 0;
    for (index, rel) in members {
        let out_path = dest.join(&rel);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocBundleError::io(parent, e))?;
        }

        let mut entry = archive
            .by_index(index)
            .map_err(|e| DocBundleError::Archive(format!("entry {index}: {e}")))?;
        let mut file =
            std::fs::File::create(&out_path).map_err(|e| DocBundleError::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut file).map_err(|e| DocBundleError::io(&out_path, e))?;

        written += 1;
    }

    Ok(written)
}

/// Collect `(index, relative path)` for every file member under `prefix`.
///
/// Entry names go through [`zip::read::ZipFile::enclosed_name`], so absolute
/// names and names climbing out of the archive are dropped. A member must
/// also stay below `prefix` after it is stripped.
fn select_members(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    prefix: &str,
) -> Result<Vec<(usize, PathBuf)>> {
    let prefix = Path::new(prefix);
    let mut members = Vec::new();

    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| DocBundleError::Archive(format!("entry {index}: {e}")))?;

        if entry.is_dir() {
            continue;
        }
        let Some(enclosed) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let Ok(rel) = enclosed.strip_prefix(prefix) else {
            continue;
        };

        if stays_below(rel) {
            members.push((index, rel.to_path_buf()));
        } else {
            warn!(entry = entry.name(), "skipping archive entry outside target directory");
        }
    }

    Ok(members)
}

/// True for a non-empty path made only of plain names.
fn stays_below(rel: &Path) -> bool {
    rel.components().next().is_some()
        && rel.components().all(|c| matches!(c, Component::Normal(_)))
}
