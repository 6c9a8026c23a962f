use thiserror::Error;

/// Errors raised while scanning, rewriting, or synthesizing a merged PDF.
///
/// The merger is a pure transform with no retries; every variant here is
/// terminal for the TOC currently being merged, not for the whole run.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("input {input_index} is not a recognizable Chrome PDF: {reason}")]
    NotChromePdf { input_index: usize, reason: String },

    #[error(
        "input {input_index} ended before an `endobj` terminator was found for object {id_hint}"
    )]
    UnterminatedObject { input_index: usize, id_hint: u32 },

    #[error("object {id} in input {input_index} is missing required field `{field}`")]
    MissingField {
        input_index: usize,
        id: u32,
        field: &'static str,
    },

    #[error(
        "merging would assign object id {attempted}, which crosses the reserved range starting at {limit}"
    )]
    ReservedIdOverflow { attempted: i64, limit: i64 },

    #[error("I/O error while merging: {0}")]
    Io(#[from] std::io::Error),
}
