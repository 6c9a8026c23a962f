//! Byte-level merging of Chrome-rendered PDFs into one outline-linked PDF.
//!
//! Every input is assumed to be a single Chrome print-to-PDF output:
//! sequential object ids starting at 1, object 1 always `/Info`, no object
//! streams, no cross-reference streams. The merger never builds a general
//! object graph; it scans each input once, rewrites the handful of
//! cross-references that need renumbering, and synthesizes a fresh trailer
//! skeleton for the whole output.

pub mod error;
pub mod merge;
pub mod outline;
pub mod rewriter;
pub mod scanner;
pub mod state;
pub mod trailer;
pub mod writer;

pub use error::MergeError;
pub use merge::{merge_toc, MergerIdentity};
pub use outline::OutlineNode;
