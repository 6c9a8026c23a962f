//! Drives the two parallel phases described in §4.5/§5: render every unique
//! page URL once, then merge each TOC from the shared render-result map.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use pdf_merge_core::merge::MergerIdentity;
use pdf_merge_core::outline::{collect_unique_page_urls, resolve_hrefs};
use pdf_merge_core::state::MergerState;

use crate::collaborators::{PageRenderer, StaticFileServer};
use crate::config::RenderConfig;
use crate::discover::{discover_tocs, DiscoveredToc};
use crate::error::OrchestratorError;
use crate::pool::PagePool;

/// Runs the full pipeline: discover, render, merge, write. Returns `Ok(())`
/// both when every TOC merged successfully and when no eligible TOC was
/// found (§7's "fail soft").
pub async fn run(
    root: &Path,
    server: &dyn StaticFileServer,
    renderer: Arc<dyn PageRenderer>,
    render_config: &RenderConfig,
    parallelism: usize,
    identity: MergerIdentity,
    mut cancel: watch::Receiver<bool>,
) -> Result<(), OrchestratorError> {
    let tocs = discover_tocs(root)?;
    if tocs.is_empty() {
        tracing::warn!(root = %root.display(), "no eligible TOC found, nothing to render");
        return Ok(());
    }
    tracing::info!(count = tocs.len(), "discovered eligible TOCs");

    let unique_urls = collect_global_unique_urls(&tocs, server.base_url());
    tracing::info!(count = unique_urls.len(), "rendering unique page URLs");

    let render_map = render_all(unique_urls, renderer, render_config.clone(), parallelism, &mut cancel).await;
    let render_map = Arc::new(render_map);

    merge_all(tocs, server.base_url(), render_config, &identity, render_map, &mut cancel).await
}

fn collect_global_unique_urls(tocs: &[DiscoveredToc], server_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for toc in tocs {
        let mut tree = toc.outline.clone();
        resolve_hrefs(&mut tree, &toc.toc_path, server_url, None);
        let mut scratch = MergerState::new();
        for url in collect_unique_page_urls(&tree, &mut scratch) {
            if seen.insert(url.clone()) {
                ordered.push(url);
            }
        }
    }
    ordered
}

async fn render_all(
    urls: Vec<String>,
    renderer: Arc<dyn PageRenderer>,
    config: RenderConfig,
    parallelism: usize,
    cancel: &mut watch::Receiver<bool>,
) -> HashMap<String, Option<Vec<u8>>> {
    let pool = Arc::new(PagePool::new(parallelism.max(1)));
    let config = Arc::new(config);
    let mut joins = JoinSet::new();

    for url in urls {
        if *cancel.borrow() {
            tracing::warn!("cancellation requested, stopping render dispatch");
            break;
        }
        let renderer = renderer.clone();
        let config = config.clone();
        let pool = pool.clone();
        joins.spawn(async move {
            let _page = pool.acquire().await;
            let result = renderer.render(&url, &config).await;
            (url, result)
        });
    }

    let mut results = HashMap::new();
    while let Some(joined) = joins.join_next().await {
        match joined {
            Ok((url, Ok(bytes))) => {
                tracing::info!(url, bytes = bytes.len(), "rendered page");
                results.insert(url, Some(bytes));
            }
            Ok((url, Err(err))) => {
                tracing::warn!(url, error = %err, "page render failed, outline subtree will have no destination");
                results.insert(url, None);
            }
            Err(join_err) => {
                tracing::warn!(error = %join_err, "render task panicked");
            }
        }
    }
    results
}

async fn merge_all(
    tocs: Vec<DiscoveredToc>,
    server_url: &str,
    render_config: &RenderConfig,
    identity: &MergerIdentity,
    render_map: Arc<HashMap<String, Option<Vec<u8>>>>,
    cancel: &mut watch::Receiver<bool>,
) -> Result<(), OrchestratorError> {
    let external_base_url = render_config.base_url.clone();
    let mut joins: JoinSet<Result<(), OrchestratorError>> = JoinSet::new();

    for toc in tocs {
        if *cancel.borrow() {
            tracing::warn!("cancellation requested, stopping merge dispatch");
            break;
        }
        let server_url = server_url.to_string();
        let external_base_url = external_base_url.clone();
        let identity = identity.clone();
        let render_map = render_map.clone();

        joins.spawn(async move {
            merge_one_toc(toc, &server_url, external_base_url.as_deref(), &identity, &render_map).await
        });
    }

    let mut first_error = None;
    while let Some(joined) = joins.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(error = %err, "merge failed for one TOC");
                first_error.get_or_insert(err);
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "merge task panicked");
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn merge_one_toc(
    toc: DiscoveredToc,
    server_url: &str,
    external_base_url: Option<&str>,
    identity: &MergerIdentity,
    render_map: &HashMap<String, Option<Vec<u8>>>,
) -> Result<(), OrchestratorError> {
    let toc_path = toc.toc_path.clone();
    let bytes = pdf_merge_core::merge_toc(toc.outline, &toc_path, server_url, external_base_url, identity, |url| {
        render_map.get(url).and_then(|entry| entry.clone())
    })
    .map_err(|source| OrchestratorError::Merge {
        toc_path: toc_path.clone(),
        source,
    })?;

    if let Err(err) = tokio::fs::write(&toc.output_path, &bytes).await {
        let _ = tokio::fs::remove_file(&toc.output_path).await;
        return Err(OrchestratorError::Io(err));
    }
    tracing::info!(path = %toc.output_path.display(), "wrote merged PDF");
    Ok(())
}
