// src/tools/write.rs
//! The `notion_write` tool: create pages, update existing ones, preview both.

use super::{parse_input, provided, AgentTool};
use crate::api::{NotionApi, NotionHttpClient};
use crate::blocks::{rich_text, sanitize_blocks};
use crate::config::ClientSettings;
use crate::error::{tool_failure, AppError};
use crate::types::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

pub const WRITE_TOOL_NAME: &str = "notion_write";

const WRITE_TOOL_DESCRIPTION: &str = "Create a new Notion page or update an existing one with \
structured blocks. Requires parent information for create operations unless a default parent \
page is configured.";

/// Number of property names shown in a create summary before eliding.
const SUMMARY_PROPERTY_PREVIEW: usize = 3;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Where a new page is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParentFields", into = "ParentFields")]
pub enum PageParent {
    Page(ObjectId),
    Database(ObjectId),
}

/// Wire form of [`PageParent`]: exactly one of the two ids is set.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParentFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_id: Option<String>,
}

impl TryFrom<ParentFields> for PageParent {
    type Error = String;

    fn try_from(fields: ParentFields) -> Result<Self, Self::Error> {
        let parse = |raw: &str| ObjectId::parse(raw).map_err(|e| e.to_string());
        match (provided(&fields.page_id), provided(&fields.database_id)) {
            (Some(page_id), None) => Ok(Self::Page(parse(page_id)?)),
            (None, Some(database_id)) => Ok(Self::Database(parse(database_id)?)),
            _ => Err("Provide exactly one of 'page_id' or 'database_id' for parent.".to_string()),
        }
    }
}

impl From<PageParent> for ParentFields {
    fn from(parent: PageParent) -> Self {
        match parent {
            PageParent::Page(id) => Self {
                page_id: Some(id.to_string()),
                database_id: None,
            },
            PageParent::Database(id) => Self {
                page_id: None,
                database_id: Some(id.to_string()),
            },
        }
    }
}

impl PageParent {
    /// The `parent` object of a create-page request.
    pub fn to_api_payload(&self) -> Value {
        match self {
            Self::Page(id) => json!({"type": "page_id", "page_id": id.as_str()}),
            Self::Database(id) => json!({"type": "database_id", "database_id": id.as_str()}),
        }
    }

    /// Human-readable form used in summaries, e.g. `page abc`.
    pub fn describe(&self) -> String {
        match self {
            Self::Page(id) => format!("page {}", id),
            Self::Database(id) => format!("database {}", id),
        }
    }

    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    #[default]
    Append,
    Replace,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Names an existing page and how its content changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInstruction {
    pub page_id: ObjectId,
    #[serde(default)]
    pub mode: UpdateMode,
}

impl UpdateInstruction {
    pub fn new(page_id: ObjectId, mode: UpdateMode) -> Self {
        Self { page_id, mode }
    }
}

/// Inputs accepted by the write tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteInput {
    /// Page title. Required under a page parent unless properties are given.
    pub title: Option<String>,
    /// Parent for create operations.
    pub parent: Option<PageParent>,
    /// Block payloads to add to the page.
    pub blocks: Option<Vec<Value>>,
    /// Update instructions for an existing page.
    pub update: Option<UpdateInstruction>,
    /// Property payload; required under a database parent.
    pub properties: Option<Map<String, Value>>,
    /// Render the summary without calling Notion.
    #[serde(default)]
    pub is_dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    Created,
    Updated,
    DryRun,
}

/// Outcome of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    pub action: WriteAction,
    pub page_id: Option<String>,
    pub url: Option<String>,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// A validated write with its sanitised blocks.
#[derive(Debug, Clone, PartialEq)]
enum WritePlan {
    Create {
        parent: PageParent,
        title: Option<String>,
        properties: Map<String, Value>,
        blocks: Vec<Value>,
    },
    Update {
        target: UpdateInstruction,
        properties: Map<String, Value>,
        blocks: Vec<Value>,
    },
}

impl WritePlan {
    fn from_input(input: &WriteInput, settings: &ClientSettings) -> Result<Self, AppError> {
        if input.parent.is_some() && input.update.is_some() {
            return Err(AppError::InvalidInput(
                "Provide either parent for create or update instructions, not both.".to_string(),
            ));
        }

        let title = input
            .title
            .clone()
            .filter(|title| !title.trim().is_empty());
        let blocks = match &input.blocks {
            Some(blocks) if !blocks.is_empty() => sanitize_blocks(blocks)?,
            _ => Vec::new(),
        };

        if let Some(update) = &input.update {
            if input.blocks.is_none() && input.properties.is_none() {
                return Err(AppError::InvalidInput(
                    "Provide blocks and/or properties when using update instructions.".to_string(),
                ));
            }
            return Ok(Self::Update {
                target: update.clone(),
                properties: input.properties.clone().unwrap_or_default(),
                blocks,
            });
        }

        let parent = match &input.parent {
            Some(parent) => parent.clone(),
            None => {
                let fallback = settings.require_parent()?.clone();
                log::debug!("No parent given; using default parent page {}", fallback);
                PageParent::Page(fallback)
            }
        };

        if parent.is_database() && input.properties.is_none() {
            return Err(AppError::InvalidInput(
                "properties must be provided when parent is a database.".to_string(),
            ));
        }
        if !parent.is_database() && title.is_none() && input.properties.is_none() {
            return Err(AppError::InvalidInput(
                "title or properties must be provided when creating under a page parent."
                    .to_string(),
            ));
        }

        let mut properties = input.properties.clone().unwrap_or_default();
        if let (Some(title), PageParent::Page(_)) = (&title, &parent) {
            properties
                .entry("title")
                .or_insert_with(|| json!({ "title": rich_text(title) }));
        }

        Ok(Self::Create {
            parent,
            title,
            properties,
            blocks,
        })
    }

    fn summary(&self, dry_run: bool) -> String {
        match self {
            Self::Create {
                parent,
                title,
                properties,
                blocks,
            } => summarize_create(parent, title.as_deref(), properties, blocks.len(), dry_run),
            Self::Update {
                target,
                properties,
                blocks,
            } => summarize_update(target, properties, blocks.len(), dry_run),
        }
    }
}

fn sorted_keys(properties: &Map<String, Value>) -> Vec<&str> {
    let mut keys: Vec<&str> = properties.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

/// `no properties`, or up to three sorted names followed by `, ...`.
pub fn format_property_keys(keys: &[&str]) -> String {
    if keys.is_empty() {
        return "no properties".to_string();
    }
    let mut preview = keys
        .iter()
        .take(SUMMARY_PROPERTY_PREVIEW)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if keys.len() > SUMMARY_PROPERTY_PREVIEW {
        preview.push_str(", ...");
    }
    format!("properties: {}", preview)
}

fn summarize_create(
    parent: &PageParent,
    title: Option<&str>,
    properties: &Map<String, Value>,
    block_count: usize,
    dry_run: bool,
) -> String {
    let (prefix, action) = if dry_run {
        ("Dry run: ", "would create")
    } else {
        ("", "Created")
    };
    format!(
        "{}{} page under {} with title '{}' ({} block(s); {}).",
        prefix,
        action,
        parent.describe(),
        title.unwrap_or("untitled"),
        block_count,
        format_property_keys(&sorted_keys(properties))
    )
}

fn summarize_update(
    target: &UpdateInstruction,
    properties: &Map<String, Value>,
    block_count: usize,
    dry_run: bool,
) -> String {
    let keys = sorted_keys(properties);
    let property_fragment = format!("properties ({})", keys.join(", "));

    let (future, past) = match (block_count, keys.is_empty()) {
        (0, true) => ("make no changes".to_string(), "No changes".to_string()),
        (0, false) => (
            format!("update {}", property_fragment),
            format!("Updated {}", property_fragment),
        ),
        (count, no_properties) => {
            let (mut future, mut past) = match target.mode {
                UpdateMode::Replace => (
                    format!("replace content with {} block(s)", count),
                    format!("Replaced content with {} block(s)", count),
                ),
                UpdateMode::Append => (
                    format!("append {} block(s)", count),
                    format!("Appended {} block(s)", count),
                ),
            };
            if !no_properties {
                future.push_str(&format!(" and update {}", property_fragment));
                past.push_str(&format!(" and updated {}", property_fragment));
            }
            (future, past)
        }
    };

    if dry_run {
        format!("Dry run: would {} on page {}.", future, target.page_id)
    } else {
        format!("{} on page {}.", past, target.page_id)
    }
}

// ---------------------------------------------------------------------------
// Tool
// ---------------------------------------------------------------------------

/// Creates and updates Notion pages through a shared [`NotionApi`] client.
#[derive(Clone)]
pub struct WriteTool {
    settings: ClientSettings,
    client: Arc<dyn NotionApi>,
}

impl WriteTool {
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

    /// Validates, sanitises and performs (or previews) a write.
    pub async fn write(&self, input: &WriteInput) -> Result<WriteResult, AppError> {
        let plan = WritePlan::from_input(input, &self.settings)?;
        let summary = plan.summary(input.is_dry_run);

        if input.is_dry_run {
            log::info!("{}", summary);
            let page_id = match &plan {
                WritePlan::Update { target, .. } => Some(target.page_id.to_string()),
                WritePlan::Create { .. } => None,
            };
            return Ok(WriteResult {
                action: WriteAction::DryRun,
                page_id,
                url: None,
                summary,
            });
        }

        let result = match plan {
            WritePlan::Create {
                parent,
                properties,
                blocks,
                ..
            } => self.create(&parent, properties, blocks, summary).await?,
            WritePlan::Update {
                target,
                properties,
                blocks,
            } => self.update(&target, &properties, &blocks, summary).await?,
        };
        log::info!("{}", result.summary);
        Ok(result)
    }

    /// Synchronous variant of [`WriteTool::write`].
    pub fn write_blocking(&self, input: &WriteInput) -> Result<WriteResult, AppError> {
        super::block_on(self.write(input))?
    }

    async fn create(
        &self,
        parent: &PageParent,
        properties: Map<String, Value>,
        blocks: Vec<Value>,
        summary: String,
    ) -> Result<WriteResult, AppError> {
        log::debug!(
            "Creating Notion page under {} ({} block(s))",
            parent.describe(),
            blocks.len()
        );

        let mut payload = Map::new();
        payload.insert("parent".into(), parent.to_api_payload());
        payload.insert("properties".into(), Value::Object(properties));
        if !blocks.is_empty() {
            payload.insert("children".into(), Value::Array(blocks));
        }

        let response = self
            .client
            .create_page(&Value::Object(payload))
            .await
            .map_err(|e| tool_failure("Create page", e))?;

        Ok(WriteResult {
            action: WriteAction::Created,
            page_id: string_field(&response, "id"),
            url: string_field(&response, "url"),
            summary,
        })
    }

    async fn update(
        &self,
        target: &UpdateInstruction,
        properties: &Map<String, Value>,
        blocks: &[Value],
        summary: String,
    ) -> Result<WriteResult, AppError> {
        let page_id = &target.page_id;
        log::debug!(
            "Updating Notion page {} (mode={}, {} block(s), {} property value(s))",
            page_id,
            target.mode,
            blocks.len(),
            properties.len()
        );

        if !properties.is_empty() {
            self.client
                .update_page_properties(page_id, properties)
                .await
                .map_err(|e| tool_failure("Update page properties", e))?;
        }

        if !blocks.is_empty() {
            // Old children are only removed once the new ones are in place.
            let replaced = match target.mode {
                UpdateMode::Replace => self
                    .existing_child_ids(page_id)
                    .await
                    .map_err(|e| tool_failure("Update page blocks", e))?,
                UpdateMode::Append => Vec::new(),
            };
            self.client
                .append_block_children(page_id, blocks)
                .await
                .map_err(|e| tool_failure("Update page blocks", e))?;
            self.remove_blocks(page_id, &replaced)
                .await
                .map_err(|e| tool_failure("Update page blocks", e))?;
        }

        let page = self
            .client
            .retrieve_page(page_id)
            .await
            .map_err(|e| tool_failure("Retrieve page", e))?;

        Ok(WriteResult {
            action: WriteAction::Updated,
            page_id: Some(page_id.to_string()),
            url: string_field(&page, "url"),
            summary,
        })
    }

    /// Ids of the blocks currently under `page_id`, in page order.
    async fn existing_child_ids(&self, page_id: &ObjectId) -> Result<Vec<ObjectId>, AppError> {
        let children = self.client.list_block_children(page_id).await?;
        children
            .iter()
            .filter_map(|child| child.get("id").and_then(Value::as_str))
            .map(|raw_id| ObjectId::parse(raw_id).map_err(AppError::from))
            .collect()
    }

    /// Archives the given child blocks of `page_id`.
    async fn remove_blocks(&self, page_id: &ObjectId, block_ids: &[ObjectId]) -> Result<(), AppError> {
        if block_ids.is_empty() {
            return Ok(());
        }
        log::debug!("Removing {} replaced block(s) from {}", block_ids.len(), page_id);
        for block_id in block_ids {
            self.client.delete_block(block_id).await?;
        }
        Ok(())
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

#[async_trait::async_trait]
impl AgentTool for WriteTool {
    fn name(&self) -> &'static str {
        WRITE_TOOL_NAME
    }

    fn description(&self) -> &'static str {
        WRITE_TOOL_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title for the page. Required when creating under a page parent unless properties are provided."
                },
                "parent": {
                    "type": "object",
                    "description": "Parent reference for create operations. Provide exactly one of page_id or database_id.",
                    "properties": {
                        "page_id": {"type": "string"},
                        "database_id": {"type": "string"}
                    },
                    "additionalProperties": false
                },
                "blocks": {
                    "type": "array",
                    "description": "Notion block payloads to include in the page.",
                    "items": {"type": "object"}
                },
                "update": {
                    "type": "object",
                    "description": "Update instructions for an existing page.",
                    "properties": {
                        "page_id": {"type": "string"},
                        "mode": {"type": "string", "enum": ["append", "replace"]}
                    },
                    "required": ["page_id"],
                    "additionalProperties": false
                },
                "properties": {
                    "type": "object",
                    "description": "Properties payload, required when writing to a database parent."
                },
                "is_dry_run": {
                    "type": "boolean",
                    "description": "When true, render a preview summary without calling the Notion API.",
                    "default": false
                }
            },
            "additionalProperties": false
        })
    }

    async fn invoke(&self, input: Value) -> Result<Value, AppError> {
        let input: WriteInput = parse_input(WRITE_TOOL_NAME, input)?;
        let result = self.write(&input).await?;
        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings() -> ClientSettings {
        ClientSettings::new("token").unwrap()
    }

    fn id(raw: &str) -> ObjectId {
        ObjectId::parse(raw).unwrap()
    }

    fn properties(keys: &[&str]) -> Map<String, Value> {
        keys.iter().map(|k| (k.to_string(), json!({}))).collect()
    }

    #[test]
    fn test_parent_wire_form() {
        let parent: PageParent = serde_json::from_value(json!({"page_id": "parent-1"})).unwrap();
        assert_eq!(parent, PageParent::Page(id("parent-1")));
        assert_eq!(
            serde_json::to_value(&parent).unwrap(),
            json!({"page_id": "parent-1"})
        );
        assert_eq!(
            parent.to_api_payload(),
            json!({"type": "page_id", "page_id": "parent-1"})
        );

        assert!(serde_json::from_value::<PageParent>(json!({})).is_err());
        assert!(
            serde_json::from_value::<PageParent>(json!({"page_id": "x", "junk": 1})).is_err()
        );
        assert!(serde_json::from_value::<PageParent>(
            json!({"page_id": "a", "database_id": "b"})
        )
        .is_err());
    }

    #[test]
    fn test_update_mode_wire_form() {
        let update: UpdateInstruction =
            serde_json::from_value(json!({"page_id": "p", "mode": "replace"})).unwrap();
        assert_eq!(update.mode, UpdateMode::Replace);

        let update: UpdateInstruction = serde_json::from_value(json!({"page_id": "p"})).unwrap();
        assert_eq!(update.mode, UpdateMode::Append);

        assert!(
            serde_json::from_value::<UpdateInstruction>(json!({"page_id": "p", "mode": "merge"}))
                .is_err()
        );
    }

    #[test]
    fn test_format_property_keys() {
        assert_eq!(format_property_keys(&[]), "no properties");
        assert_eq!(format_property_keys(&["A", "B"]), "properties: A, B");
        assert_eq!(
            format_property_keys(&["A", "B", "C", "D"]),
            "properties: A, B, C, ..."
        );
    }

    #[test]
    fn test_create_summary() {
        let parent = PageParent::Database(id("db-1"));
        assert_eq!(
            summarize_create(&parent, None, &properties(&["Name"]), 0, false),
            "Created page under database db-1 with title 'untitled' (0 block(s); properties: Name)."
        );
        assert_eq!(
            summarize_create(&parent, Some("Plan"), &Map::new(), 2, true),
            "Dry run: would create page under database db-1 with title 'Plan' (2 block(s); no properties)."
        );
    }

    #[test]
    fn test_update_summaries() {
        let append = UpdateInstruction::new(id("page-1"), UpdateMode::Append);
        let replace = UpdateInstruction::new(id("page-1"), UpdateMode::Replace);
        let status = properties(&["Status", "Owner"]);

        assert_eq!(
            summarize_update(&append, &Map::new(), 2, false),
            "Appended 2 block(s) on page page-1."
        );
        assert_eq!(
            summarize_update(&replace, &status, 1, false),
            "Replaced content with 1 block(s) and updated properties (Owner, Status) on page page-1."
        );
        assert_eq!(
            summarize_update(&append, &status, 0, true),
            "Dry run: would update properties (Owner, Status) on page page-1."
        );
        assert_eq!(
            summarize_update(&replace, &Map::new(), 3, true),
            "Dry run: would replace content with 3 block(s) on page page-1."
        );
        assert_eq!(
            summarize_update(&append, &Map::new(), 0, false),
            "No changes on page page-1."
        );
        assert_eq!(
            summarize_update(&append, &Map::new(), 0, true),
            "Dry run: would make no changes on page page-1."
        );
    }

    #[test]
    fn test_plan_validation() {
        let settings = settings();
        let both = WriteInput {
            parent: Some(PageParent::Page(id("p"))),
            update: Some(UpdateInstruction::new(id("q"), UpdateMode::Append)),
            blocks: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            WritePlan::from_input(&both, &settings),
            Err(AppError::InvalidInput(_))
        ));

        let empty_update = WriteInput {
            update: Some(UpdateInstruction::new(id("q"), UpdateMode::Append)),
            ..Default::default()
        };
        assert!(WritePlan::from_input(&empty_update, &settings).is_err());

        let database_without_properties = WriteInput {
            title: Some("Row".into()),
            parent: Some(PageParent::Database(id("db"))),
            ..Default::default()
        };
        assert!(WritePlan::from_input(&database_without_properties, &settings).is_err());

        let page_without_title = WriteInput {
            parent: Some(PageParent::Page(id("p"))),
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(WritePlan::from_input(&page_without_title, &settings).is_err());

        let no_parent = WriteInput {
            title: Some("Only Title".into()),
            ..Default::default()
        };
        assert!(WritePlan::from_input(&no_parent, &settings).unwrap_err().is_configuration());
    }

    #[test]
    fn test_default_parent_is_used() {
        let settings = settings().with_default_parent_page_id("fallback").unwrap();
        let input = WriteInput {
            title: Some("Notes".into()),
            ..Default::default()
        };
        match WritePlan::from_input(&input, &settings).unwrap() {
            WritePlan::Create { parent, .. } => assert_eq!(parent, PageParent::Page(id("fallback"))),
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_title_kept_as_given() {
        let input = WriteInput {
            title: Some("  Plan ".into()),
            parent: Some(PageParent::Page(id("p"))),
            ..Default::default()
        };
        let plan = WritePlan::from_input(&input, &settings()).unwrap();
        assert_eq!(
            plan.summary(true),
            "Dry run: would create page under page p with title '  Plan ' (0 block(s); properties: title)."
        );
        match plan {
            WritePlan::Create { properties, .. } => {
                assert_eq!(properties["title"]["title"][0]["text"]["content"], "  Plan ");
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_title_property_not_overwritten() {
        let mut existing = Map::new();
        existing.insert("title".into(), json!({"title": []}));
        let input = WriteInput {
            title: Some("Ignored".into()),
            parent: Some(PageParent::Page(id("p"))),
            properties: Some(existing.clone()),
            ..Default::default()
        };
        match WritePlan::from_input(&input, &settings()).unwrap() {
            WritePlan::Create { properties, .. } => assert_eq!(properties, existing),
            other => panic!("unexpected plan {:?}", other),
        }
    }
}
