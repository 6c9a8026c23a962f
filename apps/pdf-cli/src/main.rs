//! PDF assembly CLI.
//!
//! One command: `pdf [directory]`. Discovers every eligible `toc.json`
//! under `directory`, renders its pages, and merges each into a sibling
//! `toc.pdf`. The headless-browser and static-file-server collaborators are
//! out of scope for this repository (§1); this binary wires the
//! orchestrator to minimal stand-ins and is where a real deployment would
//! plug in its own `PageRenderer`/`StaticFileServer`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use render_orchestrator::{OrchestratorError, PageRenderer, RenderConfig, StaticFileServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pdf")]
#[command(version, about = "Merge a directory of documentation pages into navigable PDFs")]
struct Args {
    /// Root directory to scan for `toc.json` files.
    directory: PathBuf,

    /// Number of pages rendered concurrently.
    #[arg(long, default_value = "4")]
    parallelism: usize,
}

/// Stand-in for the out-of-scope static-file-server collaborator: assumes
/// the directory's contents are reachable at this base URL already (e.g.
/// served by an external process during the documentation build).
struct DirectoryFileServer {
    url: String,
}

impl StaticFileServer for DirectoryFileServer {
    fn base_url(&self) -> &str {
        &self.url
    }
}

/// Stand-in for the out-of-scope headless-browser collaborator. Every
/// render fails soft (§7), so the CLI still produces structurally valid
/// PDFs with no internal page destinations until a real `PageRenderer` is
/// wired in.
struct UnavailableRenderer;

#[async_trait]
impl PageRenderer for UnavailableRenderer {
    async fn render(&self, url: &str, _config: &RenderConfig) -> Result<Vec<u8>, OrchestratorError> {
        Err(OrchestratorError::RenderFailed {
            url: url.to_string(),
            reason: "no headless-browser collaborator configured for this binary".to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!(directory = %args.directory.display(), "starting pdf merge");

    let server = DirectoryFileServer {
        url: format!("file://{}", args.directory.display()),
    };
    let renderer: Arc<dyn PageRenderer> = Arc::new(UnavailableRenderer);
    let config = RenderConfig::default();
    let identity = pdf_merge_core::MergerIdentity {
        name: "pdf-cli".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received ctrl-c, cancelling pending renders and merges");
            let _ = cancel_tx.send(true);
        }
    });

    match render_orchestrator::run(
        &args.directory,
        &server,
        renderer,
        &config,
        args.parallelism,
        identity,
        cancel_rx,
    )
    .await
    {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!(error = %err, "pdf merge failed");
            std::process::exit(1);
        }
    }
}
