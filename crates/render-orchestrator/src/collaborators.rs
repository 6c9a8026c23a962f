//! The two external-collaborator traits named in §1/§4.5.1.
//!
//! Neither trait names a concrete implementation: the headless-browser
//! library and the static file server are out-of-scope collaborators. This
//! crate depends only on these abstractions; production wiring happens in
//! the (out-of-scope) CLI layer.

use async_trait::async_trait;

use crate::config::RenderConfig;
use crate::error::OrchestratorError;

/// Renders one URL to PDF bytes. The headless-browser collaborator.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, config: &RenderConfig) -> Result<Vec<u8>, OrchestratorError>;
}

/// The static-file-server collaborator; the orchestrator only ever needs
/// its bound URL to resolve page hrefs (§4.6).
pub trait StaticFileServer: Send + Sync {
    fn base_url(&self) -> &str;
}
