// src/blocks/mod.rs
//! Notion block payloads: builders, a markdown-ish text converter, and the
//! sanitiser every write goes through before it is sent.
//!
//! Blocks are plain `serde_json::Value`s in the shape the Notion API expects,
//! so callers can mix builder output with hand-written payloads.

mod builders;
mod sanitize;
mod text;

pub use builders::*;
pub use sanitize::{is_allowed_block_type, sanitize_blocks, ALLOWED_BLOCK_TYPES};
pub use text::from_text;

pub use crate::constants::{MAX_BLOCKS, MAX_TOTAL_TEXT_LENGTH};
