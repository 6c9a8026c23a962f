//! TOC discovery: every `toc.json` under a root directory, parsed as an
//! outline tree. Trees whose root lacks `enablePdf: true` are dropped here
//! so nothing downstream has to re-check it (§4.5).

use std::path::{Path, PathBuf};

use pdf_merge_core::OutlineNode;
use walkdir::WalkDir;

use crate::error::OrchestratorError;

/// One discovered, eligible TOC: its path (relative to `root`) and parsed
/// outline tree.
pub struct DiscoveredToc {
    pub toc_path: String,
    pub output_path: PathBuf,
    pub outline: OutlineNode,
}

/// Walks `root` for `toc.json` files. A malformed TOC is logged and skipped
/// rather than aborting the walk -- one stray file in a large docs tree
/// shouldn't take every other tree down with it (mirrors the per-URL/per-TOC
/// fault isolation in `orchestrate.rs`). An unreadable directory entry still
/// propagates, since that points at something wrong with the filesystem
/// itself rather than one bad document.
pub fn discover_tocs(root: &Path) -> Result<Vec<DiscoveredToc>, OrchestratorError> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_name() != "toc.json" {
            continue;
        }
        let path = entry.path();
        let bytes = std::fs::read(path)?;
        let outline = match OutlineNode::from_json(&bytes) {
            Ok(outline) => outline,
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "skipping malformed toc.json");
                continue;
            }
        };

        if outline.enable_pdf != Some(true) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let toc_path = relative.to_string_lossy().replace('\\', "/");
        let output_path = path.with_file_name("toc.pdf");

        found.push(DiscoveredToc {
            toc_path,
            output_path,
            outline,
        });
    }

    found.sort_by(|a, b| a.toc_path.cmp(&b.toc_path));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write_toc(dir: &Path, rel: &str, json: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, json).unwrap();
    }

    #[test]
    fn discovers_only_enabled_tocs() {
        let tmp = tempdir();
        write_toc(&tmp, "guide/toc.json", r#"{"enablePdf": true, "name": "Guide"}"#);
        write_toc(&tmp, "api/toc.json", r#"{"enablePdf": false, "name": "Api"}"#);
        write_toc(&tmp, "blog/toc.json", r#"{"name": "Blog"}"#);

        let found = discover_tocs(&tmp).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].toc_path, "guide/toc.json");

        fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn no_tocs_found_is_not_an_error() {
        let tmp = tempdir();
        let found = discover_tocs(&tmp).unwrap();
        assert!(found.is_empty());
        fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn malformed_toc_is_skipped_not_fatal() {
        let tmp = tempdir();
        write_toc(&tmp, "bad/toc.json", "not json");
        write_toc(&tmp, "good/toc.json", r#"{"enablePdf": true, "name": "Good"}"#);

        let found = discover_tocs(&tmp).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].toc_path, "good/toc.json");

        fs::remove_dir_all(&tmp).ok();
    }

    fn tempdir() -> PathBuf {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "pdf-merge-discover-test-{}-{}",
            std::process::id(),
            n
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
