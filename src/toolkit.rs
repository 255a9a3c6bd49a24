// src/toolkit.rs
//! Both tools wired to one shared client.

use crate::api::{NotionApi, NotionHttpClient};
use crate::config::{ClientSettings, SettingsOverrides};
use crate::error::AppError;
use crate::tools::{AgentTool, SearchTool, ToolDefinition, WriteTool};
use std::sync::Arc;

/// The search and write tools, sharing settings and a connection pool.
#[derive(Clone)]
pub struct Toolkit {
    pub settings: ClientSettings,
    pub client: Arc<dyn NotionApi>,
    pub search: SearchTool,
    pub write: WriteTool,
}

impl Toolkit {
    /// Builds the toolkit around a fresh HTTP client.
    pub fn from_settings(settings: ClientSettings) -> Result<Self, AppError> {
        let client = NotionHttpClient::new(&settings)?;
        Ok(Self::with_client(settings, Arc::new(client)))
    }

    /// Builds the toolkit around any [`NotionApi`] implementation.
    pub fn with_client(settings: ClientSettings, client: Arc<dyn NotionApi>) -> Self {
        let search = SearchTool::new(settings.clone(), Arc::clone(&client));
        let write = WriteTool::new(settings.clone(), Arc::clone(&client));
        Self {
            settings,
            client,
            search,
            write,
        }
    }

    /// Every tool, in registration order.
    pub fn tools(&self) -> Vec<&dyn AgentTool> {
        vec![&self.search, &self.write]
    }

    pub fn find(&self, name: &str) -> Option<&dyn AgentTool> {
        self.tools().into_iter().find(|tool| tool.name() == name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools().iter().map(|tool| tool.definition()).collect()
    }
}

/// Resolves settings from `overrides` and the environment, then builds a [`Toolkit`].
pub fn create_toolkit(overrides: &SettingsOverrides) -> Result<Toolkit, AppError> {
    let settings = ClientSettings::resolve(overrides, None, |key| std::env::var(key).ok())?;
    Toolkit::from_settings(settings)
}
