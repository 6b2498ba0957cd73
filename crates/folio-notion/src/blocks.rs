//! Notion request bodies.

use serde_json::{json, Value};

/// Longest text Notion accepts in one rich text object.
pub const MAX_BLOCK_CHARS: usize = 2000;

/// Most children Notion accepts in one request.
pub const MAX_CHILDREN_PER_REQUEST: usize = 100;

/// Split text into block-sized chunks.
///
/// Paragraphs (separated by a blank line) become separate chunks; a
/// paragraph longer than `max_chars` is cut at the last whitespace before
/// the limit, or at the limit if it has none.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let mut rest = paragraph;
        while rest.chars().count() > max_chars {
            let limit = rest
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let cut = rest[..limit]
                .rfind(char::is_whitespace)
                .filter(|&i| i > 0)
                .unwrap_or(limit);

            chunks.push(rest[..cut].trim_end().to_string());
            rest = rest[cut..].trim_start();
        }
        if !rest.is_empty() {
            chunks.push(rest.to_string());
        }
    }

    chunks
}

/// A paragraph block holding `text`.
pub fn paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {
            "rich_text": [{ "type": "text", "text": { "content": text } }]
        }
    })
}

/// Body of `POST /pages` creating a child page with the first children.
pub fn create_page(parent_page_id: &str, title: &str, children: &[Value]) -> Value {
    json!({
        "parent": { "page_id": parent_page_id },
        "properties": {
            "title": {
                "title": [{ "type": "text", "text": { "content": title } }]
            }
        },
        "children": children,
    })
}

/// Body of `PATCH /blocks/{id}/children`.
pub fn append_children(children: &[Value]) -> Value {
    json!({ "children": children })
}
