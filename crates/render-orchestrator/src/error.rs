use thiserror::Error;

/// Errors raised while discovering TOCs, rendering pages, or driving merges.
///
/// Mirrors `pdf_merge_core::error::MergeError`'s one-error-enum-per-crate
/// shape; render failures are recorded in the render map rather than
/// propagated (§7), so most call sites only ever see `Io` or `Merge`.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("rendering {url} failed: {reason}")]
    RenderFailed { url: String, reason: String },

    #[error("merging toc at {toc_path} failed: {source}")]
    Merge {
        toc_path: String,
        #[source]
        source: pdf_merge_core::MergeError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
