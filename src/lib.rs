// src/lib.rs
//! notion-agent-tools: Notion search and write tools for agent frameworks.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `NotionErrorCode`, `ValidationError`
//! - **Configuration**: `ClientSettings`, `SettingsOverrides`
//! - **Domain types**: `ObjectId`, `ApiToken`
//! - **API client**: `NotionApi`, `NotionHttpClient`
//! - **Blocks**: builders, `from_text`, `sanitize_blocks`
//! - **Tools**: `AgentTool`, `SearchTool`, `WriteTool`, `Toolkit`

pub mod api;
pub mod blocks;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod toolkit;
pub mod tools;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{ClientSettings, SettingsOverrides};

// --- Domain Types ---
pub use crate::types::{redact_token, ApiToken, ObjectId};

// --- API Client ---
pub use crate::api::{NotionApi, NotionHttpClient};

// --- Blocks ---
pub use crate::blocks::{from_text, sanitize_blocks, ALLOWED_BLOCK_TYPES, MAX_BLOCKS, MAX_TOTAL_TEXT_LENGTH};

// --- Tools ---
pub use crate::toolkit::{create_toolkit, Toolkit};
pub use crate::tools::{
    AgentTool, PageParent, SearchInput, SearchResult, SearchTool, ToolDefinition,
    UpdateInstruction, UpdateMode, WriteAction, WriteInput, WriteResult, WriteTool,
};
