// tests/common/mod.rs
//! In-memory Notion double shared by the integration tests.
#![allow(dead_code)]

use notion_agent_tools::error::NotionErrorCode;
use notion_agent_tools::{AppError, ClientSettings, NotionApi, ObjectId};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One recorded call against the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search {
        query: String,
        filter: Option<Map<String, Value>>,
    },
    RetrievePage(String),
    QueryDatabase {
        database_id: String,
        filter: Option<Map<String, Value>>,
    },
    CreatePage(Value),
    UpdateProperties {
        page_id: String,
        properties: Map<String, Value>,
    },
    AppendChildren {
        block_id: String,
        children: Vec<Value>,
    },
    ListChildren(String),
    DeleteBlock(String),
}

/// Records every call and answers with canned JSON.
#[derive(Default)]
pub struct FakeNotion {
    calls: Mutex<Vec<Call>>,
    search_results: Mutex<Vec<Value>>,
    database_results: Mutex<Vec<Value>>,
    children: Mutex<Vec<Value>>,
    failures: Mutex<HashMap<&'static str, (u16, &'static str, &'static str)>>,
}

impl FakeNotion {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_search_results(self: Arc<Self>, results: Vec<Value>) -> Arc<Self> {
        *self.search_results.lock().unwrap() = results;
        self
    }

    pub fn with_database_results(self: Arc<Self>, results: Vec<Value>) -> Arc<Self> {
        *self.database_results.lock().unwrap() = results;
        self
    }

    pub fn with_children(self: Arc<Self>, children: Vec<Value>) -> Arc<Self> {
        *self.children.lock().unwrap() = children;
        self
    }

    /// Makes `operation` fail with a Notion error response.
    pub fn failing(
        self: Arc<Self>,
        operation: &'static str,
        status: u16,
        code: &'static str,
        message: &'static str,
    ) -> Arc<Self> {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status, code, message));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(operation) {
            Some((status, code, message)) => Err(AppError::NotionApi {
                status: *status,
                code: NotionErrorCode::from_api_response(code),
                message: message.to_string(),
                request_id: None,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl NotionApi for FakeNotion {
    async fn search(
        &self,
        query: &str,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Value, AppError> {
        self.record(
            "search",
            Call::Search {
                query: query.to_string(),
                filter: filter.cloned(),
            },
        )?;
        Ok(json!({"object": "list", "results": self.search_results.lock().unwrap().clone()}))
    }

    async fn retrieve_page(&self, page_id: &ObjectId) -> Result<Value, AppError> {
        self.record("retrieve_page", Call::RetrievePage(page_id.to_string()))?;
        Ok(json!({
            "object": "page",
            "id": page_id.as_str(),
            "url": format!("https://notion.so/{}", page_id),
            "properties": {
                "title": {"type": "title", "title": [{"plain_text": format!("Page {}", page_id)}]}
            }
        }))
    }

    async fn query_database(
        &self,
        database_id: &ObjectId,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Value, AppError> {
        self.record(
            "query_database",
            Call::QueryDatabase {
                database_id: database_id.to_string(),
                filter: filter.cloned(),
            },
        )?;
        Ok(json!({"object": "list", "results": self.database_results.lock().unwrap().clone()}))
    }

    async fn create_page(&self, payload: &Value) -> Result<Value, AppError> {
        self.record("create_page", Call::CreatePage(payload.clone()))?;
        Ok(json!({"id": "page-created", "url": "https://notion.so/page-created"}))
    }

    async fn update_page_properties(
        &self,
        page_id: &ObjectId,
        properties: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        self.record(
            "update_page_properties",
            Call::UpdateProperties {
                page_id: page_id.to_string(),
                properties: properties.clone(),
            },
        )?;
        Ok(json!({"id": page_id.as_str()}))
    }

    async fn append_block_children(
        &self,
        block_id: &ObjectId,
        children: &[Value],
    ) -> Result<Value, AppError> {
        self.record(
            "append_block_children",
            Call::AppendChildren {
                block_id: block_id.to_string(),
                children: children.to_vec(),
            },
        )?;
        Ok(json!({"results": children}))
    }

    async fn list_block_children(&self, block_id: &ObjectId) -> Result<Vec<Value>, AppError> {
        self.record("list_block_children", Call::ListChildren(block_id.to_string()))?;
        Ok(self.children.lock().unwrap().clone())
    }

    async fn delete_block(&self, block_id: &ObjectId) -> Result<(), AppError> {
        self.record("delete_block", Call::DeleteBlock(block_id.to_string()))
    }
}

pub fn settings() -> ClientSettings {
    ClientSettings::new("secret_test_token").expect("test token should be valid")
}

pub fn paragraph_block(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {"rich_text": [{"type": "text", "text": {"content": text}}]}
    })
}
