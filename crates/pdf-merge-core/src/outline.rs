//! The outline (bookmark) tree parsed from a `toc.json`, and resolution of
//! each node's `href` into an internal page URL and/or an external URL.

use serde::Deserialize;

use crate::state::MergerState;

/// One node of a `toc.json` tree.
///
/// `pdf_id`, `count`, and `resolved` are not part of the JSON shape; they are
/// filled in during merge preparation, in that order: parse, resolve hrefs,
/// assign outline ids, compute counts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutlineNode {
    #[serde(default, rename = "enablePdf")]
    pub enable_pdf: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub items: Vec<OutlineNode>,

    #[serde(skip)]
    pub pdf_id: i64,
    #[serde(skip)]
    pub count: i64,
    #[serde(skip)]
    pub resolved: ParsedUrl,
}

/// The two forms a resolved `href` can take. Both may be populated (an
/// absolute href still yields an external URL; a relative one yields a page
/// URL plus, when an external base is configured, a mirrored external URL).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    pub page_url: Option<String>,
    pub external_url: Option<String>,
}

impl OutlineNode {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Resolve every node's `href` in this tree, relative to `toc_path` (the
/// slash-separated path of the owning `toc.json`, used only for its
/// directory component).
pub fn resolve_hrefs(
    root: &mut OutlineNode,
    toc_path: &str,
    server_url: &str,
    external_base_url: Option<&str>,
) {
    let dir = toc_dir(toc_path);
    resolve_node(root, dir, server_url, external_base_url);
}

fn resolve_node(node: &mut OutlineNode, dir: &str, server_url: &str, external_base_url: Option<&str>) {
    node.resolved = resolve_href(dir, node.href.as_deref(), server_url, external_base_url);
    for child in node.items.iter_mut() {
        resolve_node(child, dir, server_url, external_base_url);
    }
}

/// Resolve a single `href` into a [`ParsedUrl`] (§4.6).
pub fn resolve_href(
    toc_dir_path: &str,
    href: Option<&str>,
    server_url: &str,
    external_base_url: Option<&str>,
) -> ParsedUrl {
    let Some(href) = href else {
        return ParsedUrl::default();
    };
    if href.is_empty() {
        return ParsedUrl::default();
    }

    if is_absolute_uri(href) {
        return ParsedUrl {
            page_url: None,
            external_url: Some(href.to_string()),
        };
    }

    let page_url = Some(join_url(server_url, toc_dir_path, href));
    let external_url = external_base_url.map(|base| join_url(base, toc_dir_path, href));
    ParsedUrl {
        page_url,
        external_url,
    }
}

fn is_absolute_uri(href: &str) -> bool {
    match href.find("://") {
        Some(idx) if idx > 0 => href[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}

fn toc_dir(toc_path: &str) -> &str {
    match toc_path.rfind('/') {
        Some(idx) => &toc_path[..idx],
        None => "",
    }
}

fn join_url(base: &str, dir: &str, href: &str) -> String {
    let mut out = base.trim_end_matches('/').to_string();
    let dir = dir.trim_matches('/');
    if !dir.is_empty() {
        out.push('/');
        out.push_str(dir);
    }
    out.push('/');
    out.push_str(href.trim_start_matches('/'));
    out
}

/// Pre-order: assign each node in the tree a dense url id for every distinct
/// internal page URL found, and return the unique page URLs in first-seen
/// (pre-order) order -- the order inputs are absorbed into the merged PDF in.
pub fn collect_unique_page_urls(root: &OutlineNode, state: &mut MergerState) -> Vec<String> {
    let mut ordered = Vec::new();
    visit(root, state, &mut ordered);
    ordered
}

fn visit(node: &OutlineNode, state: &mut MergerState, ordered: &mut Vec<String>) {
    if let Some(url) = &node.resolved.page_url {
        if state.existing_url_id(url).is_none() {
            ordered.push(url.clone());
        }
        state.url_id(url);
    }
    for child in &node.items {
        visit(child, state, ordered);
    }
}

/// Pre-order: assign each node a unique pdf object id, starting at
/// `next_id`. Returns the id one past the last one assigned.
pub fn assign_outline_ids(node: &mut OutlineNode, next_id: &mut i64) {
    node.pdf_id = *next_id;
    *next_id += 1;
    for child in node.items.iter_mut() {
        assign_outline_ids(child, next_id);
    }
}

/// Bottom-up: `count` is the number of descendant nodes (children plus their
/// own counts), per §4.4.1.
pub fn compute_counts(node: &mut OutlineNode) -> i64 {
    let mut total = 0i64;
    for child in node.items.iter_mut() {
        total += compute_counts(child) + 1;
    }
    node.count = total;
    total
}
