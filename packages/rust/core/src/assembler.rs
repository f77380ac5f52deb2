//! Combined document assembler.
//!
//! Reads every collected file, renders the title, table of contents and one
//! section per file, and writes the result to the output path.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use docbundle_shared::{CollectedFile, DocBundleError, Result};

use crate::toc::{anchor_for, render_toc};

/// Separator emitted before every section and at the very end.
const RULE: &str = "\n---\n";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Text decoding
// ---------------------------------------------------------------------------

/// Encodings tried when reading an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// UTF-8 with a leading byte-order mark, which is dropped.
    Utf8Bom,
    Latin1,
    /// UTF-8 with invalid sequences replaced by U+FFFD. Never fails.
    Utf8Lossy,
}

/// Strict decodings in the order they are attempted.
const DECODE_ORDER: [TextEncoding; 3] =
    [TextEncoding::Utf8, TextEncoding::Utf8Bom, TextEncoding::Latin1];

impl TextEncoding {
    fn try_decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Utf8Bom => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Utf8Lossy => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Decode file bytes with the first encoding that accepts them.
///
/// Line endings are normalized to `\n`.
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    let (text, encoding) = DECODE_ORDER
        .iter()
        .find_map(|enc| enc.try_decode(bytes).map(|text| (text, *enc)))
        .unwrap_or_else(|| {
            (
                String::from_utf8_lossy(bytes).into_owned(),
                TextEncoding::Utf8Lossy,
            )
        });

    (normalize_newlines(&text), encoding)
}

/// Read a text file without ever failing on its encoding.
pub fn read_text_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| DocBundleError::io(path, e))?;
    let (text, encoding) = decode_text(&bytes);

    if encoding != TextEncoding::Utf8 {
        debug!(path = %path.display(), ?encoding, "decoded with fallback encoding");
    }

    Ok(text)
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Document assembly
// ---------------------------------------------------------------------------

/// Build the combined document for `files`, in the given order.
///
/// Layout:
/// ```text
/// # <title>
///
/// ## Table of Contents
///
/// - [guide/intro.md](#guide/intro.md)
///
///
/// ---
///
/// ## guide/intro.md
///
/// <a id="guide/intro.md"></a>
///
/// > _From `guide/intro.md`_
///
///
/// <file text>
///
///
/// ---
/// ```
#[instrument(skip_all, fields(files = files.len()))]
pub fn build_document(title: &str, files: &[CollectedFile]) -> Result<String> {
    let mut parts: Vec<String> = Vec::with_capacity(files.len() * 7 + 3);

    parts.push(format!("# {title}\n"));
    parts.push(render_toc(files));

    for file in files {
        let anchor = anchor_for(&file.rel_path);
        let text = read_text_file(&file.path)?;

        parts.push(RULE.to_string());
        parts.push(format!("## {}\n", file.rel_path));
        parts.push(format!("<a id=\"{anchor}\"></a>\n"));
        parts.push(format!("> _From `{}`_\n", file.rel_path));
        parts.push(String::new());
        parts.push(text.trim_end().to_string());
        parts.push(String::new());
    }

    parts.push(RULE.to_string());

    let document = parts.join("\n");
    debug!(bytes = document.len(), "document built");

    Ok(document)
}

/// Hex SHA-256 of the document text.
pub fn content_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Write `content` to `path`, replacing any existing file.
///
/// Writes to a sibling temp file first, then renames over the target.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent).map_err(|e| DocBundleError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| DocBundleError::validation(format!("not a file path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&temp, content).map_err(|e| DocBundleError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(DocBundleError::io(path, e));
    }

    info!(size = content.len(), "wrote combined document");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("db-assemble-{tag}-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    fn collected(root: &Path, rel: &str, bytes: &[u8]) -> CollectedFile {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        CollectedFile {
            path,
            rel_path: rel.into(),
        }
    }

    #[test]
    fn decode_prefers_plain_utf8() {
        let (text, enc) = decode_text("héllo".as_bytes());
        assert_eq!(text, "héllo");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn decode_keeps_bom_when_utf8_accepts_it() {
        let (text, enc) = decode_text(b"\xEF\xBB\xBFhi");
        assert_eq!(text, "\u{feff}hi");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn decode_falls_back_to_latin1() {
        let (text, enc) = decode_text(b"caf\xe9 \xff");
        assert_eq!(text, "caf\u{e9} \u{ff}");
        assert_eq!(enc, TextEncoding::Latin1);
    }

    #[test]
    fn terminal_strategies_never_fail() {
        let bytes = b"\xc3\x28 broken";
        assert!(TextEncoding::Utf8.try_decode(bytes).is_none());
        assert!(TextEncoding::Utf8Bom.try_decode(bytes).is_none());
        assert_eq!(
            TextEncoding::Utf8Lossy.try_decode(bytes).as_deref(),
            Some("\u{fffd}( broken")
        );
    }

    #[test]
    fn decode_normalizes_line_endings() {
        let (text, _) = decode_text(b"a\r\nb\rc\n");
        assert_eq!(text, "a\nb\nc\n");
    }

    #[test]
    fn document_layout_is_exact() {
        let root = temp_root("layout");
        let files = vec![
            collected(&root, "Getting Started/FAQ (v2).md", b"# FAQ\n\nAnswers.\n\n\n"),
            collected(&root, "notes.txt", b"plain"),
        ];

        let doc = build_document("Test Docs", &files).unwrap();
        let expected = "# Test Docs\n\
\n\
## Table of Contents\n\
\n\
- [Getting Started/FAQ (v2).md](#getting-started/faq-v2.md)\n\
- [notes.txt](#notes.txt)\n\
\n\
\n---\n\
\n\
## Getting Started/FAQ (v2).md\n\
\n\
<a id=\"getting-started/faq-v2.md\"></a>\n\
\n\
> _From `Getting Started/FAQ (v2).md`_\n\
\n\
\n\
# FAQ\n\nAnswers.\n\
\n\
\n---\n\
\n\
## notes.txt\n\
\n\
<a id=\"notes.txt\"></a>\n\
\n\
> _From `notes.txt`_\n\
\n\
\n\
plain\n\
\n\
\n---\n";
        assert_eq!(doc, expected);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn toc_links_match_body_anchors() {
        let root = temp_root("anchors");
        let files = vec![
            collected(&root, "A Dir/Mixed Case (1).md", b"x"),
            collected(&root, "b/c&d.mdx", b"y"),
        ];

        let doc = build_document("T", &files).unwrap();
        for file in &files {
            let anchor = anchor_for(&file.rel_path);
            assert!(doc.contains(&format!("](#{anchor})")));
            assert!(doc.contains(&format!("<a id=\"{anchor}\"></a>")));
        }

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn invalid_utf8_does_not_abort() {
        let root = temp_root("latin1");
        let files = vec![collected(&root, "legacy.txt", b"r\xe9sum\xe9 \x80\x81")];

        let doc = build_document("T", &files).unwrap();
        assert!(doc.contains("r\u{e9}sum\u{e9}"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn same_inputs_give_identical_output() {
        let root = temp_root("determinism");
        let files = vec![
            collected(&root, "a.md", b"alpha\r\n"),
            collected(&root, "b/c.md", b"gamma"),
        ];

        let first = build_document("T", &files).unwrap();
        let second = build_document("T", &files).unwrap();
        assert_eq!(first, second);
        assert_eq!(content_sha256(&first), content_sha256(&second));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_input_is_io_error() {
        let root = temp_root("missing");
        let files = vec![CollectedFile {
            path: root.join("gone.md"),
            rel_path: "gone.md".into(),
        }];

        assert!(matches!(
            build_document("T", &files),
            Err(DocBundleError::Io { .. })
        ));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn write_document_overwrites_and_creates_parents() {
        let root = temp_root("write");
        let out = root.join("nested/dir/out.txt");

        write_document(&out, "first").unwrap();
        write_document(&out, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "second");
        assert!(!root.join("nested/dir/.out.txt.tmp").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let root = temp_root("rename-fail");
        let out = root.join("taken");
        std::fs::create_dir_all(out.join("child")).unwrap();

        let err = write_document(&out, "content").unwrap_err();
        assert!(matches!(err, DocBundleError::Io { .. }));
        assert!(!root.join(".taken.tmp").exists());
        assert!(out.is_dir());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn sha256_is_hex() {
        assert_eq!(
            content_sha256(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
