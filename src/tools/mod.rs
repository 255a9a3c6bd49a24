// src/tools/mod.rs
//! Agent-facing tools.
//!
//! A host framework sees each tool as a name, a description and a JSON
//! Schema for its input, and calls it with a JSON document. The async path
//! is primary; [`AgentTool::invoke_blocking`] serves synchronous hosts.

pub mod search;
pub mod write;

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

pub use search::{SearchInput, SearchResult, SearchTool};
pub use write::{
    PageParent, UpdateInstruction, UpdateMode, WriteAction, WriteInput, WriteResult, WriteTool,
};

/// What a host framework needs to advertise a tool to a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// The calling convention shared by every tool in this crate.
#[async_trait::async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema describing the accepted input object.
    fn input_schema(&self) -> Value;

    /// Runs the tool on a JSON input and returns its JSON output.
    async fn invoke(&self, input: Value) -> Result<Value, AppError>;

    /// Runs the tool to completion on a private runtime.
    ///
    /// Fails with a configuration error when called from inside a Tokio
    /// runtime; use [`AgentTool::invoke`] there.
    fn invoke_blocking(&self, input: Value) -> Result<Value, AppError> {
        block_on(self.invoke(input))?
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Drives `future` on a fresh current-thread runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, AppError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(AppError::Configuration(
            "blocking tool calls cannot run inside an async runtime; await the async variant instead"
                .to_string(),
        ));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

/// Deserialises a tool input, reporting schema violations as invalid input.
pub(crate) fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, AppError> {
    serde_json::from_value(input)
        .map_err(|e| AppError::InvalidInput(format!("{} received malformed input: {}", tool, e)))
}

/// Non-empty, trimmed view of an optional string argument.
pub(crate) fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
