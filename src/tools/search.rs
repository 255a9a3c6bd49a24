// src/tools/search.rs
//! The `notion_search` tool: full-text search, page retrieval, database query.

use super::{parse_input, provided, AgentTool};
use crate::api::parser::results_of;
use crate::api::{NotionApi, NotionHttpClient};
use crate::config::ClientSettings;
use crate::error::{tool_failure, AppError};
use crate::types::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub const SEARCH_TOOL_NAME: &str = "notion_search";

const SEARCH_TOOL_DESCRIPTION: &str = "Search Notion for pages or databases, or retrieve a specific \
page or database. Provide a full-text query, page_id, or database_id.";

/// Inputs accepted by the search tool. Exactly one target must be given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchInput {
    /// Full-text query passed to the search endpoint.
    pub query: Option<String>,
    /// Identifier of a specific page to retrieve.
    pub page_id: Option<String>,
    /// Identifier of a database to query.
    pub database_id: Option<String>,
    /// Filter forwarded to the search or database query endpoint.
    pub filter: Option<Map<String, Value>>,
}

impl SearchInput {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn page(page_id: impl Into<String>) -> Self {
        Self {
            page_id: Some(page_id.into()),
            ..Self::default()
        }
    }

    pub fn database(database_id: impl Into<String>) -> Self {
        Self {
            database_id: Some(database_id.into()),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Map<String, Value>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Checks the input and names what it targets.
    pub fn target(&self) -> Result<SearchTarget, AppError> {
        let query = provided(&self.query);
        let page_id = provided(&self.page_id);
        let database_id = provided(&self.database_id);

        let target = match (query, page_id, database_id) {
            (Some(query), None, None) => SearchTarget::Query(query.to_string()),
            (None, Some(page_id), None) => SearchTarget::Page(ObjectId::parse(page_id)?),
            (None, None, Some(database_id)) => SearchTarget::Database(ObjectId::parse(database_id)?),
            _ => {
                return Err(AppError::InvalidInput(
                    "Provide exactly one of 'query', 'page_id', or 'database_id'.".to_string(),
                ))
            }
        };

        if matches!(target, SearchTarget::Page(_)) && self.filter.is_some() {
            return Err(AppError::InvalidInput(
                "Filters cannot be used when retrieving a single page.".to_string(),
            ));
        }

        Ok(target)
    }
}

/// What a validated search request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    Query(String),
    Page(ObjectId),
    Database(ObjectId),
}

impl SearchTarget {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Query(_) => "search",
            Self::Page(_) => "page",
            Self::Database(_) => "database",
        }
    }
}

/// Normalised representation of a Notion search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Best-effort title of the object.
    pub title: String,
    /// Notion object type such as `page` or `database`.
    pub object_type: String,
    pub id: String,
    pub url: Option<String>,
    /// Parent page or database, when the object has one.
    pub parent_id: Option<String>,
    /// Short text preview extracted from the object.
    pub preview: Option<String>,
}

/// Searches Notion through a shared [`NotionApi`] client.
#[derive(Clone)]
pub struct SearchTool {
    settings: ClientSettings,
    client: Arc<dyn NotionApi>,
}

impl SearchTool {
    pub fn new(settings: ClientSettings, client: Arc<dyn NotionApi>) -> Self {
        Self { settings, client }
    }

    /// Creates the tool with its own HTTP client.
    pub fn from_settings(settings: ClientSettings) -> Result<Self, AppError> {
        let client = NotionHttpClient::new(&settings)?;
        Ok(Self::new(settings, Arc::new(client)))
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Runs a search and returns normalised results.
    pub async fn search(&self, input: &SearchInput) -> Result<Vec<SearchResult>, AppError> {
        let target = input.target()?;
        log::debug!(
            "Running Notion search (mode={}, query={:?}, page_id={:?}, database_id={:?})",
            target.mode(),
            input.query,
            input.page_id,
            input.database_id
        );

        let items = match &target {
            SearchTarget::Page(page_id) => {
                let page = self
                    .client
                    .retrieve_page(page_id)
                    .await
                    .map_err(|e| tool_failure("Retrieve page", e))?;
                vec![page]
            }
            SearchTarget::Database(database_id) => {
                let response = self
                    .client
                    .query_database(database_id, input.filter.as_ref())
                    .await
                    .map_err(|e| tool_failure("Query database", e))?;
                results_of(&response)
            }
            SearchTarget::Query(query) => {
                let response = self
                    .client
                    .search(query, input.filter.as_ref())
                    .await
                    .map_err(|e| tool_failure("Search", e))?;
                results_of(&response)
            }
        };

        let results: Vec<SearchResult> = items.iter().map(normalize_result).collect();
        log::info!("Notion {} returned {} result(s)", target.mode(), results.len());
        Ok(results)
    }

    /// Synchronous variant of [`SearchTool::search`].
    pub fn search_blocking(&self, input: &SearchInput) -> Result<Vec<SearchResult>, AppError> {
        super::block_on(self.search(input))?
    }
}

#[async_trait::async_trait]
impl AgentTool for SearchTool {
    fn name(&self) -> &'static str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &'static str {
        SEARCH_TOOL_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Full-text query passed to the Notion search endpoint."
                },
                "page_id": {
                    "type": "string",
                    "description": "Identifier or URL of a specific page to retrieve."
                },
                "database_id": {
                    "type": "string",
                    "description": "Identifier or URL of a database to query."
                },
                "filter": {
                    "type": "object",
                    "description": "Optional filter payload forwarded to Notion's search or database query APIs."
                }
            },
            "additionalProperties": false
        })
    }

    async fn invoke(&self, input: Value) -> Result<Value, AppError> {
        let input: SearchInput = parse_input(SEARCH_TOOL_NAME, input)?;
        let results = self.search(&input).await?;
        Ok(serde_json::to_value(results)?)
    }
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Reshapes a page or database object into a [`SearchResult`].
pub fn normalize_result(item: &Value) -> SearchResult {
    SearchResult {
        title: extract_title(item),
        object_type: item
            .get("object")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        id: item
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        url: item.get("url").and_then(Value::as_str).map(str::to_string),
        parent_id: extract_parent_id(item.get("parent")),
        preview: extract_preview(item),
    }
}

/// Joins the `plain_text` of rich text pieces with single spaces.
pub fn rich_text_to_plain_text(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(|piece| piece.get("plain_text").and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn plain_text_of(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_array)
        .map(|items| rich_text_to_plain_text(items))
        .filter(|text| !text.is_empty())
}

fn properties(data: &Value) -> impl Iterator<Item = &Map<String, Value>> {
    data.get("properties")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|props| props.values())
        .filter_map(Value::as_object)
}

fn extract_title(data: &Value) -> String {
    if let Some(title) = plain_text_of(data.get("title")) {
        return title;
    }

    properties(data)
        .find_map(|prop| match prop.get("type").and_then(Value::as_str) {
            Some(kind @ ("title" | "rich_text")) => plain_text_of(prop.get(kind)),
            _ => None,
        })
        .unwrap_or_else(|| {
            data.get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
}

fn extract_preview(data: &Value) -> Option<String> {
    if let Some(preview) = data.get("preview").and_then(Value::as_str) {
        let preview = preview.trim();
        return (!preview.is_empty()).then(|| preview.to_string());
    }

    properties(data).find_map(|prop| match prop.get("type").and_then(Value::as_str) {
        Some("rich_text") => plain_text_of(prop.get("rich_text")),
        _ => None,
    })
}

fn extract_parent_id(parent: Option<&Value>) -> Option<String> {
    let parent = parent?.as_object()?;
    let key = match parent.get("type").and_then(Value::as_str)? {
        "page_id" => "page_id",
        "database_id" => "database_id",
        _ => return None,
    };
    parent.get(key).and_then(Value::as_str).map(str::to_string)
}
