//! Streaming scanner for `<id> 0 obj\n ... endobj\n` regions.
//!
//! Chrome's PDF output places exactly one object per such block with no
//! object streams, so finding them is a matter of locating two literal
//! tokens (` 0 obj\n` and `endobj\n`) rather than a general PDF tokenizer.

/// One scanned object: its id and the byte span of its body, running from
/// the `<<` that opens its dictionary up to (not including) `endobj`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedObject<'a> {
    pub id: u32,
    pub body: &'a [u8],
}

/// Scans a single contiguous buffer for object regions, re-entrant across
/// calls so more bytes can be appended between them.
///
/// `next` never consumes bytes it can't form a complete object from: if
/// `endobj\n` hasn't arrived yet, it returns `None` and leaves `self.cursor`
/// untouched, so the caller can append more bytes and call again.
#[derive(Debug, Default)]
pub struct ObjectScanner {
    cursor: usize,
}

const OBJ_MARKER: &[u8] = b" 0 obj\n";
const ENDOBJ_MARKER: &[u8] = b"endobj\n";

impl ObjectScanner {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Single-segment fast path: direct index search over one contiguous
    /// buffer. Returns the next `(id, body)` pair without copying, or `None`
    /// if no complete object is available yet.
    pub fn next<'a>(&mut self, buf: &'a [u8]) -> Option<ScannedObject<'a>> {
        let (id_start, body_start, id) = find_header(buf, self.cursor)?;
        let endobj_rel = find_pattern(&buf[body_start..], ENDOBJ_MARKER)?;
        let body_end = body_start + endobj_rel;
        self.cursor = body_end + ENDOBJ_MARKER.len();
        debug_assert!(id_start <= body_start);
        Some(ScannedObject {
            id,
            body: &buf[body_start..body_end],
        })
    }

    /// Multi-segment path: the same scan, but over data that arrived as
    /// separate chunks (e.g. successive reads from a pipe) that haven't been
    /// joined into one buffer. Unlike `next`, this necessarily copies: a
    /// token can straddle a chunk boundary, so there is no way to hand back
    /// a borrow into a single segment. Callers on the hot path should prefer
    /// accumulating into one buffer and calling `next`; this exists for
    /// callers that genuinely cannot hold the whole input contiguously.
    pub fn next_segmented(&mut self, segments: &[&[u8]]) -> Option<(u32, Vec<u8>)> {
        let joined = concat_segments(segments);
        let scanned = self.next(&joined)?;
        Some((scanned.id, scanned.body.to_vec()))
    }
}

/// After a scan loop stops yielding objects, check whether the unconsumed
/// tail still contains an object header with no matching `endobj\n` -- a
/// truncated/malformed input, as opposed to harmless trailing xref/trailer
/// bytes the scanner never needed to look at.
pub fn detect_incomplete_object(buf: &[u8], from: usize) -> Option<u32> {
    let (_, _, id) = find_header(buf, from)?;
    Some(id)
}

/// Concatenate segments into one owned buffer.
pub fn concat_segments(segments: &[&[u8]]) -> Vec<u8> {
    let total: usize = segments.iter().map(|s| s.len()).sum();
    let mut out = Vec::with_capacity(total);
    for seg in segments {
        out.extend_from_slice(seg);
    }
    out
}

/// Locate the next `<id> 0 obj\n` header at or after `from`, returning
/// `(id_start, body_start, id)`. The id is parsed by scanning ASCII digits
/// backwards from the space that precedes ` 0 obj\n`.
fn find_header(buf: &[u8], from: usize) -> Option<(usize, usize, u32)> {
    if from > buf.len() {
        return None;
    }
    let rel = find_pattern(&buf[from..], OBJ_MARKER)?;
    let marker_pos = from + rel;

    let mut id_start = marker_pos;
    while id_start > 0 && buf[id_start - 1].is_ascii_digit() {
        id_start -= 1;
    }
    if id_start == marker_pos {
        // " 0 obj\n" with no digits before it -- not a real header; keep
        // scanning from just past this occurrence on the next attempt.
        return find_header(buf, marker_pos + 1);
    }

    let id: u32 = std::str::from_utf8(&buf[id_start..marker_pos])
        .ok()?
        .parse()
        .ok()?;
    let body_start = marker_pos + OBJ_MARKER.len();
    Some((id_start, body_start, id))
}

fn find_pattern(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || haystack.len() < pattern.len() {
        return None;
    }
    haystack
        .windows(pattern.len())
        .position(|window| window == pattern)
}
