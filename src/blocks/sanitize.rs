// src/blocks/sanitize.rs
//! Allow-listing and size limits applied to blocks before transmission.

use crate::constants::{MAX_BLOCKS, MAX_TOTAL_TEXT_LENGTH};
use crate::error::AppError;
use serde_json::{json, Map, Value};

/// Block types the write tool is willing to send.
pub const ALLOWED_BLOCK_TYPES: &[&str] = &[
    "paragraph",
    "heading_1",
    "heading_2",
    "heading_3",
    "bulleted_list_item",
    "numbered_list_item",
    "to_do",
    "toggle",
    "callout",
    "quote",
    "code",
    "divider",
];

/// Rich text arrays inside a block payload that count toward the text budget.
const RICH_TEXT_FIELDS: &[&str] = &["rich_text", "caption"];

pub fn is_allowed_block_type(kind: &str) -> bool {
    ALLOWED_BLOCK_TYPES.contains(&kind)
}

#[derive(Default)]
struct Budget {
    blocks: usize,
    text: usize,
}

/// Validates and normalises blocks for the Notion API.
///
/// Each block must be an object with an allow-listed `type` and an object
/// payload under that key. Server-owned fields (`id`, timestamps, ...) are
/// dropped, links are stripped from code text, and nested children are
/// checked the same way. The whole tree may hold at most [`MAX_BLOCKS`]
/// blocks and [`MAX_TOTAL_TEXT_LENGTH`] characters of text.
pub fn sanitize_blocks(blocks: &[Value]) -> Result<Vec<Value>, AppError> {
    let mut budget = Budget::default();
    let sanitized = sanitize_list(blocks, "blocks", &mut budget)?;
    log::debug!(
        "Sanitized {} block(s) carrying {} character(s) of text",
        budget.blocks,
        budget.text
    );
    Ok(sanitized)
}

fn sanitize_list(blocks: &[Value], path: &str, budget: &mut Budget) -> Result<Vec<Value>, AppError> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| sanitize_block(block, &format!("{}[{}]", path, index), budget))
        .collect()
}

fn sanitize_block(block: &Value, path: &str, budget: &mut Budget) -> Result<Value, AppError> {
    let object = block
        .as_object()
        .ok_or_else(|| invalid(format!("{} must be a JSON object", path)))?;

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("{} is missing its 'type'", path)))?;

    if !is_allowed_block_type(kind) {
        return Err(invalid(format!(
            "{} has unsupported block type '{}' (allowed: {})",
            path,
            kind,
            ALLOWED_BLOCK_TYPES.join(", ")
        )));
    }

    budget.blocks += 1;
    if budget.blocks > MAX_BLOCKS {
        return Err(invalid(format!(
            "too many blocks: at most {} are allowed per request",
            MAX_BLOCKS
        )));
    }

    let mut payload = match object.get(kind) {
        Some(Value::Object(payload)) => payload.clone(),
        None if kind == "divider" => Map::new(),
        _ => {
            return Err(invalid(format!(
                "{} must carry an object payload under '{}'",
                path, kind
            )))
        }
    };

    for field in RICH_TEXT_FIELDS {
        if let Some(items) = payload.get_mut(*field) {
            let items = items
                .as_array_mut()
                .ok_or_else(|| invalid(format!("{}.{}.{} must be an array", path, kind, field)))?;
            for item in items.iter_mut() {
                budget.text += rich_text_length(item);
                if kind == "code" {
                    strip_link(item);
                }
            }
        }
    }

    if budget.text > MAX_TOTAL_TEXT_LENGTH {
        return Err(invalid(format!(
            "text too long: at most {} characters are allowed per request",
            MAX_TOTAL_TEXT_LENGTH
        )));
    }

    // Children may be nested in the payload (API form) or next to it.
    let children = payload
        .remove("children")
        .or_else(|| object.get("children").cloned());
    if let Some(children) = children {
        let children = children
            .as_array()
            .ok_or_else(|| invalid(format!("{}.children must be an array", path)))?;
        let children_path = format!("{}.children", path);
        let sanitized = sanitize_list(children, &children_path, budget)?;
        if !sanitized.is_empty() {
            payload.insert("children".into(), Value::Array(sanitized));
        }
    }

    let mut clean = Map::new();
    clean.insert("object".into(), json!("block"));
    clean.insert("type".into(), json!(kind));
    clean.insert(kind.into(), Value::Object(payload));
    Ok(Value::Object(clean))
}

fn rich_text_length(item: &Value) -> usize {
    item.pointer("/text/content")
        .or_else(|| item.get("plain_text"))
        .or_else(|| item.pointer("/equation/expression"))
        .and_then(Value::as_str)
        .map(|s| s.chars().count())
        .unwrap_or(0)
}

fn strip_link(item: &mut Value) {
    if let Some(text) = item.get_mut("text").and_then(Value::as_object_mut) {
        text.remove("link");
    }
    if let Some(object) = item.as_object_mut() {
        object.remove("href");
    }
}

fn invalid(message: String) -> AppError {
    AppError::InvalidInput(message)
}
