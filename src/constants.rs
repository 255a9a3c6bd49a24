// src/constants.rs
//! Domain constants that define the operational boundaries of the crate.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API
// ---------------------------------------------------------------------------

/// Base URL of the public Notion API.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// API version pinned in the `Notion-Version` header.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// How many objects the Notion API returns per page of results (API maximum).
pub const NOTION_API_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

pub const NOTION_API_TOKEN_ENV_VAR: &str = "NOTION_API_TOKEN";
pub const NOTION_DEFAULT_PARENT_PAGE_ID_ENV_VAR: &str = "NOTION_DEFAULT_PARENT_PAGE_ID";
pub const NOTION_API_TIMEOUT_ENV_VAR: &str = "NOTION_API_TIMEOUT";
pub const NOTION_API_MAX_RETRIES_ENV_VAR: &str = "NOTION_API_MAX_RETRIES";

/// Request timeout applied when none is configured, in seconds.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: f64 = 30.0;

/// Smallest accepted request timeout, in seconds.
pub const MIN_CLIENT_TIMEOUT_SECS: f64 = 1.0;

/// Retry budget for transient API failures when none is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// Retry backoff
// ---------------------------------------------------------------------------

/// Delay before the first retry; doubles on every further attempt.
pub const RETRY_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Upper bound for a single backoff delay, `Retry-After` included.
pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(8);

// ---------------------------------------------------------------------------
// Write payload limits
// ---------------------------------------------------------------------------

/// Maximum number of blocks accepted in one write, nested children included.
pub const MAX_BLOCKS: usize = 50;

/// Maximum number of characters across all rich text of one write.
pub const MAX_TOTAL_TEXT_LENGTH: usize = 20_000;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
