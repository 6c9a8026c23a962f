//! Position-tracking append-only byte writer.
//!
//! Every `write_*` primitive advances `position` by exactly the number of
//! bytes it emits. The merger relies on `position` being the precise byte
//! offset of the *next* write so that `xrefs` entries point at the first
//! byte of their object's `N 0 obj` token.

/// Appends bytes to an in-memory buffer while tracking the running offset.
///
/// A real deployment writes through a pipe to the output file; for the
/// streaming byte-level transform a `Vec<u8>` sink is sufficient and is what
/// every test in this crate exercises. `position` is always `buf.len()`, but
/// is tracked as a separate field (rather than re-derived) because it is the
/// quantity the rest of the merger reasons about.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
    position: i64,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset the next write will land at.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Append raw bytes verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.position += bytes.len() as i64;
    }

    /// Append the ASCII decimal representation of `n`.
    pub fn write_int(&mut self, n: i64) {
        self.write_bytes(n.to_string().as_bytes());
    }

    /// Append the decimal representation of `n`, left-padded with ASCII `'0'`
    /// to exactly `width` characters. Used for 10-digit xref offsets.
    pub fn write_long_padded(&mut self, n: i64, width: usize) {
        self.write_bytes(format!("{n:0width$}", width = width).as_bytes());
    }

    /// Append `<FEFF` + uppercase hex of the UTF-16BE encoding of `s` + `>`,
    /// PDF's hexadecimal string literal form for Unicode text.
    pub fn write_hex_string(&mut self, s: &str) {
        let mut hex = String::with_capacity(4 + s.len() * 4 + 1);
        hex.push_str("<FEFF");
        for unit in s.encode_utf16() {
            hex.push_str(&format!("{unit:04X}"));
        }
        hex.push('>');
        self.write_bytes(hex.as_bytes());
    }

    /// Append the ASCII bytes of `s` with no escaping. Callers must not pass
    /// strings containing unbalanced parentheses or backslashes.
    pub fn write_ascii_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Flush is a no-op for the in-memory sink; kept so callers can treat the
    /// writer uniformly with a real pipe-backed implementation.
    pub fn flush(&mut self) {}

    /// Consume the writer, returning the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn position_tracks_exact_byte_count() {
        let mut w = ByteWriter::new();
        assert_eq!(w.position(), 0);
        w.write_bytes(b"abc");
        assert_eq!(w.position(), 3);
        w.write_int(42);
        assert_eq!(w.position(), 5);
    }

    #[test]
    fn write_long_padded_pads_to_width() {
        let mut w = ByteWriter::new();
        w.write_long_padded(42, 10);
        assert_eq!(w.into_bytes(), b"0000000042");
    }

    #[test]
    fn write_long_padded_handles_zero() {
        let mut w = ByteWriter::new();
        w.write_long_padded(0, 10);
        assert_eq!(w.into_bytes(), b"0000000000");
    }

    #[test]
    fn write_hex_string_cover_title() {
        let mut w = ByteWriter::new();
        w.write_hex_string("A");
        assert_eq!(w.into_bytes(), b"<FEFF0041>");
    }

    #[test]
    fn write_hex_string_empty() {
        let mut w = ByteWriter::new();
        w.write_hex_string("");
        assert_eq!(w.into_bytes(), b"<FEFF>");
    }

    #[test]
    fn write_hex_string_multi_char() {
        let mut w = ByteWriter::new();
        w.write_hex_string("Hi");
        assert_eq!(w.into_bytes(), b"<FEFF00480069>");
    }

    #[test]
    fn write_ascii_string_no_escaping() {
        let mut w = ByteWriter::new();
        w.write_ascii_string("hello (world)");
        assert_eq!(w.into_bytes(), b"hello (world)");
    }

    proptest::proptest! {
        #[test]
        fn write_int_roundtrips_through_parse(n in 0i64..1_000_000_000) {
            let mut w = ByteWriter::new();
            w.write_int(n);
            let bytes = w.into_bytes();
            let parsed: i64 = std::str::from_utf8(&bytes).unwrap().parse().unwrap();
            proptest::prop_assert_eq!(parsed, n);
        }

        #[test]
        fn write_long_padded_always_matches_width(n in 0i64..9_999_999_999, width in 10usize..12) {
            let mut w = ByteWriter::new();
            w.write_long_padded(n, width);
            proptest::prop_assert_eq!(w.into_bytes().len(), width);
        }
    }
}
