// src/api/mod.rs
//! Notion API interaction.
//!
//! The tools depend on the [`NotionApi`] trait only. [`NotionHttpClient`] is
//! the production implementation; tests substitute an in-memory one.

pub mod client;
pub mod pagination;
pub mod parser;
pub mod retry;

use crate::error::AppError;
use crate::types::ObjectId;
use serde_json::{Map, Value};

/// The Notion endpoints the search and write tools rely on.
///
/// Payloads are passed through as JSON: their schema is owned and versioned
/// by Notion, not by this crate.
#[async_trait::async_trait]
pub trait NotionApi: Send + Sync {
    /// `POST /search`
    async fn search(&self, query: &str, filter: Option<&Map<String, Value>>)
        -> Result<Value, AppError>;

    /// `GET /pages/{id}`
    async fn retrieve_page(&self, page_id: &ObjectId) -> Result<Value, AppError>;

    /// `POST /databases/{id}/query`
    async fn query_database(
        &self,
        database_id: &ObjectId,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Value, AppError>;

    /// `POST /pages`
    async fn create_page(&self, payload: &Value) -> Result<Value, AppError>;

    /// `PATCH /pages/{id}` with a properties payload.
    async fn update_page_properties(
        &self,
        page_id: &ObjectId,
        properties: &Map<String, Value>,
    ) -> Result<Value, AppError>;

    /// `PATCH /blocks/{id}/children`
    async fn append_block_children(
        &self,
        block_id: &ObjectId,
        children: &[Value],
    ) -> Result<Value, AppError>;

    /// `GET /blocks/{id}/children`, following pagination to the end.
    async fn list_block_children(&self, block_id: &ObjectId) -> Result<Vec<Value>, AppError>;

    /// `DELETE /blocks/{id}` (Notion archives the block).
    async fn delete_block(&self, block_id: &ObjectId) -> Result<(), AppError>;
}

pub use client::NotionHttpClient;
