//! Per-object dispatch and reference rewriting (§4.3).
//!
//! Dispatch is prefix-based: every rule below matches literal leading bytes
//! of an object's body, never a general tokenizer. This is only safe because
//! every input is assumed to be Chrome's own PDF output, where these prefixes
//! are produced consistently.

use crate::error::MergeError;
use crate::state::{MergerState, STRUCT_PARENT_THRESHOLD};
use crate::writer::ByteWriter;

/// What to do with one scanned object, decided by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Skip,
    ParentTree,
    Emit(EmitKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitKind {
    Page,
    StructElemDocument,
    Other,
}

fn classify(input_id: u32, body: &[u8]) -> Action {
    if input_id == 1 {
        return Action::Skip;
    }
    if body.starts_with(b"<<\n/Limits ") {
        return Action::Skip;
    }
    if body.starts_with(b"<<\n/Type /Catalog") {
        return Action::Skip;
    }
    if body.starts_with(b"<<\n/Type /StructTreeRoot") {
        return Action::Skip;
    }
    if body.starts_with(b"<<\n/Type /ParentTree\n") {
        return Action::ParentTree;
    }
    if body.starts_with(b"<<\n/Type /Page\n") {
        return Action::Emit(EmitKind::Page);
    }
    if body.starts_with(b"<<\n/Type /StructElem\n/S /Document\n") {
        return Action::Emit(EmitKind::StructElemDocument);
    }
    Action::Emit(EmitKind::Other)
}

/// Process one object scanned from input `input_index`, writing it (or
/// absorbing it into `state` without writing, for skipped/`ParentTree`
/// objects) as appropriate.
pub fn process_object(
    state: &mut MergerState,
    writer: &mut ByteWriter,
    input_index: usize,
    input_id: u32,
    body: &[u8],
) -> Result<(), MergeError> {
    match classify(input_id, body) {
        Action::Skip => Ok(()),
        Action::ParentTree => parse_parent_tree(state, input_index, body),
        Action::Emit(kind) => {
            let uid = state.base_id + input_id as i64;
            state.record_object(uid, writer.position());
            writer.write_int(uid);
            writer.write_bytes(b" 0 obj\n");
            rewrite_body(state, writer, kind, body);
            writer.write_bytes(b"endobj\n");
            match kind {
                EmitKind::Page => state.pages.push(uid),
                EmitKind::StructElemDocument => state.struct_elems.push(uid),
                EmitKind::Other => {}
            }
            Ok(())
        }
    }
}

fn rewrite_body(state: &MergerState, writer: &mut ByteWriter, kind: EmitKind, body: &[u8]) {
    let mut i = 0usize;
    let mut last_copied = 0usize;

    while i < body.len() {
        if body[i..].starts_with(b"/StructParents ") {
            writer.write_bytes(&body[last_copied..i]);
            i += "/StructParents ".len();
            let (num, consumed) = parse_ascii_int(&body[i..]);
            i += consumed;
            write_struct_parent_field(state, writer, num);
            last_copied = i;
            continue;
        }
        if body[i..].starts_with(b"/StructParent ") {
            writer.write_bytes(&body[last_copied..i]);
            i += "/StructParent ".len();
            let (num, consumed) = parse_ascii_int(&body[i..]);
            i += consumed;
            write_struct_parent_field(state, writer, num);
            last_copied = i;
            continue;
        }
        if body[i].is_ascii_digit() && (i == 0 || is_ref_predecessor(body[i - 1])) {
            if let Some((num, consumed)) = try_match_reference(&body[i..]) {
                writer.write_bytes(&body[last_copied..i]);
                let new_id = resolve_reference_target(state, kind, &body[..i], num);
                writer.write_int(new_id);
                writer.write_bytes(b" 0 R");
                i += consumed;
                last_copied = i;
                continue;
            }
        }
        i += 1;
    }
    writer.write_bytes(&body[last_copied..]);
}

fn write_struct_parent_field(state: &MergerState, writer: &mut ByteWriter, num: i64) {
    if num >= STRUCT_PARENT_THRESHOLD {
        writer.write_bytes(b"/StructParent ");
        writer.write_int(state.base_struct_parent_num + num);
    } else {
        writer.write_bytes(b"/StructParents ");
        writer.write_int(state.base_struct_parents_num + num);
    }
}

fn resolve_reference_target(state: &MergerState, kind: EmitKind, before: &[u8], num: i64) -> i64 {
    if kind == EmitKind::Page && preceded_by_keyword(before, b"/Parent") {
        return crate::trailer::PAGES_ID;
    }
    if kind == EmitKind::StructElemDocument && preceded_by_keyword(before, b"/P") {
        return crate::trailer::STRUCT_TREE_ROOT_ID;
    }
    state.base_id + num
}

fn preceded_by_keyword(before: &[u8], keyword: &[u8]) -> bool {
    let trimmed = trim_trailing_ws(before);
    trimmed.ends_with(keyword)
}

fn trim_trailing_ws(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    &bytes[..end]
}

fn is_ref_predecessor(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t' | b'[' | b'<' | b'(' | b'/')
}

/// Parses leading ASCII digits, returning (value, bytes consumed).
fn parse_ascii_int(bytes: &[u8]) -> (i64, usize) {
    let mut n = 0usize;
    while n < bytes.len() && bytes[n].is_ascii_digit() {
        n += 1;
    }
    let value = std::str::from_utf8(&bytes[..n])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    (value, n)
}

/// Tries to match `<digits> 0 R` at the start of `after`, returning
/// `(object_number, bytes_consumed)` on success.
fn try_match_reference(after: &[u8]) -> Option<(i64, usize)> {
    let mut k = 0usize;
    while k < after.len() && after[k].is_ascii_digit() {
        k += 1;
    }
    if k == 0 {
        return None;
    }
    let num: i64 = std::str::from_utf8(&after[..k]).ok()?.parse().ok()?;

    let mut j = k;
    if j >= after.len() || after[j] != b' ' {
        return None;
    }
    j += 1;
    if j >= after.len() || after[j] != b'0' {
        return None;
    }
    j += 1;
    if j >= after.len() || after[j] != b' ' {
        return None;
    }
    j += 1;
    if j >= after.len() || after[j] != b'R' {
        return None;
    }
    j += 1;
    if j < after.len() && (after[j].is_ascii_alphanumeric() || after[j] == b'_') {
        return None;
    }
    Some((num, j))
}

/// Parse a `/ParentTree`'s `/Nums [ n id 0 R ... ]` array, folding each pair
/// into `state.struct_parents` or `state.struct_parent` by magnitude (§4.3).
fn parse_parent_tree(state: &mut MergerState, input_index: usize, body: &[u8]) -> Result<(), MergeError> {
    let nums_at = find(body, b"/Nums").ok_or(MergeError::MissingField {
        input_index,
        id: 0,
        field: "/Nums",
    })?;
    let after_nums = &body[nums_at + 5..];
    let open = find(after_nums, b"[").ok_or(MergeError::MissingField {
        input_index,
        id: 0,
        field: "/Nums [",
    })?;
    let close = find(after_nums, b"]").ok_or(MergeError::MissingField {
        input_index,
        id: 0,
        field: "/Nums ]",
    })?;
    let arr = &after_nums[open + 1..close];

    let mut pos = 0usize;
    loop {
        pos = skip_ws(arr, pos);
        if pos >= arr.len() {
            break;
        }
        let (n, consumed) = parse_ascii_int(&arr[pos..]);
        pos += consumed;
        pos = skip_ws(arr, pos);
        let (id, consumed) = parse_ascii_int(&arr[pos..]);
        pos += consumed;
        pos = skip_ws(arr, pos);
        pos = skip_token(arr, pos, b"0");
        pos = skip_ws(arr, pos);
        pos = skip_token(arr, pos, b"R");

        let uid = state.base_id + id;
        if n >= STRUCT_PARENT_THRESHOLD {
            state.struct_parent.push(uid);
        } else {
            state.struct_parents.push(uid);
        }
    }
    Ok(())
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn skip_token(bytes: &[u8], pos: usize, token: &[u8]) -> usize {
    if bytes[pos..].starts_with(token) {
        pos + token.len()
    } else {
        pos
    }
}

fn find(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || haystack.len() < pattern.len() {
        return None;
    }
    haystack.windows(pattern.len()).position(|w| w == pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn info_object_is_always_skipped() {
        let mut state = MergerState::new();
        let mut writer = ByteWriter::new();
        process_object(&mut state, &mut writer, 0, 1, b"<<\n/Producer (Chrome)\n>>\n").unwrap();
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn catalog_and_struct_tree_root_are_skipped() {
        let mut state = MergerState::new();
        let mut writer = ByteWriter::new();
        process_object(&mut state, &mut writer, 0, 2, b"<<\n/Type /Catalog\n/Pages 3 0 R\n>>\n").unwrap();
        process_object(&mut state, &mut writer, 0, 4, b"<<\n/Type /StructTreeRoot\n/K 5 0 R\n>>\n").unwrap();
        assert_eq!(writer.position(), 0);
        assert!(state.xrefs.is_empty());
    }

    #[test]
    fn limits_object_is_skipped() {
        let mut state = MergerState::new();
        let mut writer = ByteWriter::new();
        process_object(&mut state, &mut writer, 0, 6, b"<<\n/Limits [0 10]\n>>\n").unwrap();
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn page_object_is_emitted_with_rewritten_refs_and_tracked() {
        let mut state = MergerState::new();
        state.base_id = 100;
        let mut writer = ByteWriter::new();
        let body = b"<<\n/Type /Page\n/Parent 2 0 R\n/Contents 7 0 R\n/StructParents 0\n>>\n";
        process_object(&mut state, &mut writer, 0, 5, body).unwrap();
        assert_eq!(state.pages, vec![105]);
        let out = String::from_utf8(writer.into_bytes()).unwrap();
        assert!(out.starts_with("105 0 obj\n"));
        assert!(out.contains("/Parent 1000002 0 R"));
        assert!(out.contains("/Contents 107 0 R"));
        assert!(out.contains("/StructParents 0"));
        assert!(out.ends_with("endobj\n"));
    }

    #[test]
    fn struct_elem_document_rewrites_p_to_struct_tree_root() {
        let mut state = MergerState::new();
        state.base_id = 0;
        let mut writer = ByteWriter::new();
        let body = b"<<\n/Type /StructElem\n/S /Document\n/P 9 0 R\n/K [1 0 R]\n>>\n";
        process_object(&mut state, &mut writer, 0, 3, body).unwrap();
        assert_eq!(state.struct_elems, vec![3]);
        let out = String::from_utf8(writer.into_bytes()).unwrap();
        assert!(out.contains("/P 1000003 0 R"));
        assert!(out.contains("/K [1 0 R]"));
    }

    #[test]
    fn struct_parent_above_threshold_uses_annotation_counter() {
        let mut state = MergerState::new();
        state.base_struct_parent_num = 50;
        state.base_struct_parents_num = 2;
        let mut writer = ByteWriter::new();
        let body = b"<<\n/Type /Annot\n/StructParent 100005\n>>\n";
        process_object(&mut state, &mut writer, 0, 9, body).unwrap();
        let out = String::from_utf8(writer.into_bytes()).unwrap();
        assert!(out.contains("/StructParent 100055"));
    }

    #[test]
    fn struct_parents_below_threshold_uses_page_counter() {
        let mut state = MergerState::new();
        state.base_struct_parents_num = 4;
        let mut writer = ByteWriter::new();
        let body = b"<<\n/Type /Whatever\n/StructParents 1\n>>\n";
        process_object(&mut state, &mut writer, 0, 9, body).unwrap();
        let out = String::from_utf8(writer.into_bytes()).unwrap();
        assert!(out.contains("/StructParents 5"));
    }

    #[test]
    fn reference_inside_name_digit_is_not_mistaken_for_object_ref() {
        // `/F0 1 0 R` is a reference; but a digit inside a name token like
        // `/F10` must never be treated as the start of one.
        let mut state = MergerState::new();
        let mut writer = ByteWriter::new();
        let body = b"<<\n/Type /Whatever\n/Name /F10\n/Next 3 0 R\n>>\n";
        process_object(&mut state, &mut writer, 0, 9, body).unwrap();
        let out = String::from_utf8(writer.into_bytes()).unwrap();
        assert!(out.contains("/Name /F10"));
        assert!(out.contains("/Next 3 0 R"));
    }

    #[test]
    fn parent_tree_splits_entries_by_magnitude() {
        let mut state = MergerState::new();
        state.base_id = 10;
        let body = b"<<\n/Type /ParentTree\n/Nums [0 1 0 R 100000 2 0 R]\n>>\n";
        parse_parent_tree(&mut state, 0, body).unwrap();
        assert_eq!(state.struct_parents, vec![11]);
        assert_eq!(state.struct_parent, vec![12]);
    }

    #[test]
    fn parent_tree_missing_nums_is_an_error() {
        let mut state = MergerState::new();
        let body = b"<<\n/Type /ParentTree\n>>\n";
        let err = parse_parent_tree(&mut state, 2, body).unwrap_err();
        assert!(matches!(err, MergeError::MissingField { input_index: 2, .. }));
    }
}
