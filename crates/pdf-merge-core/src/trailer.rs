//! Synthesis of the fixed trailer skeleton: `/Info`, `/Catalog`, `/Pages`,
//! `/StructTreeRoot`, `/ParentTree`, `/Dests`, the outline tree, the xref
//! table, and the trailer dictionary (§4.4).

use crate::error::MergeError;
use crate::outline::{assign_outline_ids, compute_counts, OutlineNode};
use crate::state::{MergerState, RESERVED_ID_START, STRUCT_PARENT_THRESHOLD};
use crate::writer::ByteWriter;

pub const INFO_ID: i64 = 1_000_000;
pub const CATALOG_ID: i64 = 1_000_001;
pub const PAGES_ID: i64 = 1_000_002;
pub const STRUCT_TREE_ROOT_ID: i64 = 1_000_003;
pub const PARENT_TREE_ID: i64 = 1_000_004;
pub const DESTS_ID: i64 = 1_000_005;

const FIXED_IDS: [i64; 6] = [
    INFO_ID,
    CATALOG_ID,
    PAGES_ID,
    STRUCT_TREE_ROOT_ID,
    PARENT_TREE_ID,
    DESTS_ID,
];

/// Assigns outline ids and counts, emits the outline tree, the fixed
/// skeleton objects, the xref table, and the trailer dictionary.
pub fn synthesize_trailer(
    state: &mut MergerState,
    writer: &mut ByteWriter,
    outline_root: &mut OutlineNode,
    tool_name: &str,
    tool_version: &str,
) -> Result<(), MergeError> {
    let mut next_id = state.xrefs.len() as i64 + 1;
    assign_outline_ids(outline_root, &mut next_id);
    compute_counts(outline_root);

    if next_id - 1 >= RESERVED_ID_START {
        return Err(MergeError::ReservedIdOverflow {
            attempted: next_id - 1,
            limit: RESERVED_ID_START,
        });
    }

    write_outline_node(state, writer, outline_root, None);

    write_info(state, writer, tool_name, tool_version);
    write_catalog(state, writer, outline_root.pdf_id);
    write_pages(state, writer);
    write_struct_tree_root(state, writer);
    write_parent_tree(state, writer);
    write_dests(state, writer);

    write_xref_and_trailer(state, writer);
    Ok(())
}

fn write_outline_node(
    state: &mut MergerState,
    writer: &mut ByteWriter,
    node: &OutlineNode,
    next_sibling: Option<i64>,
) {
    let uid = node.pdf_id;
    state.record_object(uid, writer.position());
    writer.write_int(uid);
    writer.write_bytes(b" 0 obj\n<<\n/Type /Outlines\n/Count ");
    writer.write_int(node.count);
    writer.write_bytes(b"\n");

    if let (Some(first), Some(last)) = (node.items.first(), node.items.last()) {
        writer.write_bytes(b"/First ");
        writer.write_int(first.pdf_id);
        writer.write_bytes(b" 0 R\n/Last ");
        writer.write_int(last.pdf_id);
        writer.write_bytes(b" 0 R\n");
    }
    if let Some(next_id) = next_sibling {
        writer.write_bytes(b"/Next ");
        writer.write_int(next_id);
        writer.write_bytes(b" 0 R\n");
    }

    writer.write_bytes(b"/Title ");
    writer.write_hex_string(node.name.as_deref().unwrap_or(""));
    writer.write_bytes(b"\n");

    if let Some(page_url) = &node.resolved.page_url {
        if state.url_dests.contains_key(page_url) {
            let n = state.existing_url_id(page_url).unwrap_or(0);
            writer.write_bytes(b"/Dest /URLD-");
            writer.write_int(n);
            writer.write_bytes(b"\n");
        } else if let Some(ext) = &node.resolved.external_url {
            write_uri_action(writer, ext);
        }
    } else if let Some(ext) = &node.resolved.external_url {
        write_uri_action(writer, ext);
    }

    writer.write_bytes(b">>\nendobj\n");

    for (i, child) in node.items.iter().enumerate() {
        let next = node.items.get(i + 1).map(|n| n.pdf_id);
        write_outline_node(state, writer, child, next);
    }
}

fn write_uri_action(writer: &mut ByteWriter, url: &str) {
    writer.write_bytes(b"/A << /Type /Action /S /URI /URI (");
    writer.write_ascii_string(url);
    writer.write_bytes(b") >>\n");
}

fn write_info(state: &mut MergerState, writer: &mut ByteWriter, tool_name: &str, tool_version: &str) {
    record_fixed(state, INFO_ID, writer.position());
    writer.write_int(INFO_ID);
    writer.write_bytes(b" 0 obj\n<<\n/Creator (");
    writer.write_ascii_string(tool_name);
    writer.write_bytes(b" ");
    writer.write_ascii_string(tool_version);
    writer.write_bytes(b")\n>>\nendobj\n");
}

fn write_catalog(state: &mut MergerState, writer: &mut ByteWriter, outline_root_id: i64) {
    record_fixed(state, CATALOG_ID, writer.position());
    writer.write_int(CATALOG_ID);
    writer.write_bytes(b" 0 obj\n<<\n/Type /Catalog\n/Pages ");
    writer.write_int(PAGES_ID);
    writer.write_bytes(b" 0 R\n/Dests ");
    writer.write_int(DESTS_ID);
    writer.write_bytes(b" 0 R\n/PageMode /UseOutlines\n/Outlines ");
    writer.write_int(outline_root_id);
    writer.write_bytes(b" 0 R\n/MarkInfo << /Type /MarkInfo /Marked true >>\n/StructTreeRoot ");
    writer.write_int(STRUCT_TREE_ROOT_ID);
    writer.write_bytes(b" 0 R\n>>\nendobj\n");
}

fn write_pages(state: &mut MergerState, writer: &mut ByteWriter) {
    record_fixed(state, PAGES_ID, writer.position());
    writer.write_int(PAGES_ID);
    writer.write_bytes(b" 0 obj\n<<\n/Type /Pages\n/Count ");
    writer.write_int(state.pages.len() as i64);
    writer.write_bytes(b"\n/Kids [");
    for (i, page_id) in state.pages.clone().iter().enumerate() {
        if i > 0 {
            writer.write_bytes(b" ");
        }
        writer.write_int(*page_id);
        writer.write_bytes(b" 0 R");
    }
    writer.write_bytes(b"]\n>>\nendobj\n");
}

fn write_struct_tree_root(state: &mut MergerState, writer: &mut ByteWriter) {
    record_fixed(state, STRUCT_TREE_ROOT_ID, writer.position());
    writer.write_int(STRUCT_TREE_ROOT_ID);
    writer.write_bytes(b" 0 obj\n<<\n/Type /StructTreeRoot\n/K [");
    for (i, id) in state.struct_elems.clone().iter().enumerate() {
        if i > 0 {
            writer.write_bytes(b" ");
        }
        writer.write_int(*id);
        writer.write_bytes(b" 0 R");
    }
    writer.write_bytes(b"]\n/ParentTree ");
    writer.write_int(PARENT_TREE_ID);
    writer.write_bytes(b" 0 R\n>>\nendobj\n");
}

fn write_parent_tree(state: &mut MergerState, writer: &mut ByteWriter) {
    record_fixed(state, PARENT_TREE_ID, writer.position());
    writer.write_int(PARENT_TREE_ID);
    writer.write_bytes(b" 0 obj\n<<\n/Type /ParentTree\n/Nums [");
    let mut first = true;
    for (i, id) in state.struct_parents.clone().iter().enumerate() {
        if *id == 0 {
            continue;
        }
        if !first {
            writer.write_bytes(b" ");
        }
        first = false;
        writer.write_int(i as i64);
        writer.write_bytes(b" ");
        writer.write_int(*id);
        writer.write_bytes(b" 0 R");
    }
    for (i, id) in state.struct_parent.clone().iter().enumerate() {
        if !first {
            writer.write_bytes(b" ");
        }
        first = false;
        writer.write_int(STRUCT_PARENT_THRESHOLD + i as i64);
        writer.write_bytes(b" ");
        writer.write_int(*id);
        writer.write_bytes(b" 0 R");
    }
    writer.write_bytes(b"]\n>>\nendobj\n");
}

fn write_dests(state: &mut MergerState, writer: &mut ByteWriter) {
    record_fixed(state, DESTS_ID, writer.position());
    writer.write_int(DESTS_ID);
    writer.write_bytes(b" 0 obj\n<<\n/Dests <<\n");
    for url in state.url_order().to_vec() {
        if let Some(&page_id) = state.url_dests.get(&url) {
            let n = state.existing_url_id(&url).unwrap_or(0);
            writer.write_bytes(b"/URLD-");
            writer.write_int(n);
            writer.write_bytes(b" [");
            writer.write_int(page_id);
            writer.write_bytes(b" 0 R /Fit]\n");
        }
    }
    writer.write_bytes(b">>\n>>\nendobj\n");
}

fn record_fixed(state: &mut MergerState, id: i64, offset: i64) {
    let idx = FIXED_IDS.iter().position(|&x| x == id).expect("known fixed id");
    state.fixed_offsets[idx] = offset;
}

fn write_xref_and_trailer(state: &MergerState, writer: &mut ByteWriter) {
    let xref_offset = writer.position();
    let count = state.xrefs.len() as i64;

    writer.write_bytes(b"xref\n0 ");
    writer.write_int(count + 1);
    writer.write_bytes(b"\n0000000000 65535 f \n");
    for offset in state.xrefs.values() {
        writer.write_long_padded(*offset, 10);
        writer.write_bytes(b" 00000 n \n");
    }

    writer.write_int(INFO_ID);
    writer.write_bytes(b" ");
    writer.write_int(FIXED_IDS.len() as i64);
    writer.write_bytes(b"\n");
    for offset in &state.fixed_offsets {
        writer.write_long_padded(*offset, 10);
        writer.write_bytes(b" 00000 n \n");
    }

    writer.write_bytes(b"trailer\n<<\n/Size ");
    writer.write_int(count + FIXED_IDS.len() as i64 + 1);
    writer.write_bytes(b"\n/Root ");
    writer.write_int(CATALOG_ID);
    writer.write_bytes(b" 0 R\n/Info ");
    writer.write_int(INFO_ID);
    writer.write_bytes(b" 0 R\n>>\nstartxref\n");
    writer.write_int(xref_offset);
    writer.write_bytes(b"\n%%EOF");
}
