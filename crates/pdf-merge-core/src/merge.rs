//! Top-level single-TOC merge: absorb one Chrome PDF per unique page URL
//! referenced by the outline, in pre-order, then synthesize the trailer.

use crate::error::MergeError;
use crate::outline::{collect_unique_page_urls, resolve_hrefs, OutlineNode};
use crate::rewriter::process_object;
use crate::scanner::{detect_incomplete_object, ObjectScanner};
use crate::state::MergerState;
use crate::writer::ByteWriter;

const PDF_HEADER: &[u8] = b"%PDF-1.4\n%\xD3\xEB\xE9\xE1\n";

/// Product/version string written into the synthesized `/Info` dictionary.
#[derive(Debug, Clone)]
pub struct MergerIdentity {
    pub name: String,
    pub version: String,
}

/// Merge one TOC's outline tree into a single PDF.
///
/// `fetch` returns the rendered bytes for an internal page URL, or `None` if
/// that page failed to render -- per §7, a render failure elides that page's
/// destination but never aborts the merge.
pub fn merge_toc(
    mut root: OutlineNode,
    toc_path: &str,
    server_url: &str,
    external_base_url: Option<&str>,
    identity: &MergerIdentity,
    mut fetch: impl FnMut(&str) -> Option<Vec<u8>>,
) -> Result<Vec<u8>, MergeError> {
    let mut state = MergerState::new();
    resolve_hrefs(&mut root, toc_path, server_url, external_base_url);
    let unique_urls = collect_unique_page_urls(&root, &mut state);

    let mut writer = ByteWriter::new();
    writer.write_bytes(PDF_HEADER);

    for (index, url) in unique_urls.iter().enumerate() {
        match fetch(url) {
            Some(bytes) => {
                absorb_input(&mut state, &mut writer, &bytes, index, url)?;
            }
            None => {
                tracing::warn!(url, "page failed to render, its outline entries get no destination");
            }
        }
    }

    crate::trailer::synthesize_trailer(&mut state, &mut writer, &mut root, &identity.name, &identity.version)?;
    Ok(writer.into_bytes())
}

fn absorb_input(
    state: &mut MergerState,
    writer: &mut ByteWriter,
    bytes: &[u8],
    input_index: usize,
    source_url: &str,
) -> Result<(), MergeError> {
    let mark = state.begin_input();
    let mut scanner = ObjectScanner::new();
    let mut count: i64 = 0;

    while let Some(object) = scanner.next(bytes) {
        count += 1;
        process_object(state, writer, input_index, object.id, object.body)?;
    }

    if let Some(id_hint) = detect_incomplete_object(bytes, scanner.cursor()) {
        return Err(MergeError::UnterminatedObject { input_index, id_hint });
    }

    if count == 0 {
        return Err(MergeError::NotChromePdf {
            input_index,
            reason: "no `N 0 obj ... endobj` objects found".to_string(),
        });
    }

    state.finish_input(mark, count, Some(source_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn page_pdf(id: u32, parent_placeholder: u32) -> Vec<u8> {
        format!(
            "1 0 obj\n<<\n/Producer (Chrome)\n>>\nendobj\n\
             {id} 0 obj\n<<\n/Type /Page\n/Parent {parent_placeholder} 0 R\n/Contents {next} 0 R\n>>\nendobj\n\
             {next} 0 obj\n<< /Length 0 >>\nstream\nendstream\nendobj\n",
            next = id + 1,
        )
        .into_bytes()
    }

    #[test]
    fn merges_single_page_toc_with_external_link() {
        let root = OutlineNode::from_json(
            br#"{"enablePdf": true, "name": "Doc", "items": [
                {"name": "Page One", "href": "a.html"},
                {"name": "External", "href": "https://example.com"}
            ]}"#,
        )
        .unwrap();

        let mut inputs = HashMap::new();
        inputs.insert(
            "http://127.0.0.1:4000/guide/a.html".to_string(),
            page_pdf(2, 99),
        );

        let identity = MergerIdentity {
            name: "vitepress-pdf".to_string(),
            version: "0.1.0".to_string(),
        };

        let bytes = merge_toc(
            root,
            "guide/toc.json",
            "http://127.0.0.1:4000",
            None,
            &identity,
            |url| inputs.get(url).cloned(),
        )
        .unwrap();

        let out = String::from_utf8(bytes).unwrap();
        assert!(out.starts_with("%PDF-1.4\n"));
        assert!(out.contains("/Type /Page"));
        assert!(out.contains("/Dest /URLD-0"));
        assert!(out.contains("/S /URI"));
        assert!(out.contains("example.com"));
        assert!(out.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn unrendered_page_does_not_abort_merge() {
        let root = OutlineNode::from_json(
            br#"{"enablePdf": true, "name": "Doc", "items": [{"name": "Missing", "href": "gone.html"}]}"#,
        )
        .unwrap();
        let identity = MergerIdentity {
            name: "t".to_string(),
            version: "0".to_string(),
        };
        let bytes = merge_toc(root, "toc.json", "http://x", None, &identity, |_| None).unwrap();
        let out = String::from_utf8(bytes).unwrap();
        assert!(out.contains("/Type /Outlines"));
        assert!(!out.contains("/Dest"));
    }

    #[test]
    fn malformed_input_bytes_produce_not_chrome_pdf_error() {
        let root = OutlineNode::from_json(
            br#"{"enablePdf": true, "name": "Doc", "items": [{"name": "Bad", "href": "bad.html"}]}"#,
        )
        .unwrap();
        let identity = MergerIdentity {
            name: "t".to_string(),
            version: "0".to_string(),
        };
        let err = merge_toc(root, "toc.json", "http://x", None, &identity, |_| {
            Some(b"not a pdf at all".to_vec())
        })
        .unwrap_err();
        assert_eq!(
            matches!(err, MergeError::NotChromePdf { .. }),
            true
        );
    }

    #[test]
    fn truncated_object_produces_unterminated_object_error() {
        let root = OutlineNode::from_json(
            br#"{"enablePdf": true, "name": "Doc", "items": [{"name": "Bad", "href": "bad.html"}]}"#,
        )
        .unwrap();
        let identity = MergerIdentity {
            name: "t".to_string(),
            version: "0".to_string(),
        };
        let truncated = b"1 0 obj\n<<\n/Producer (Chrome)\n>>\nendobj\n2 0 obj\n<<\n/Type /Page\n".to_vec();
        let err = merge_toc(root, "toc.json", "http://x", None, &identity, move |_| Some(truncated.clone()))
            .unwrap_err();
        assert!(matches!(err, MergeError::UnterminatedObject { id_hint: 2, .. }));
    }
}
