// src/config.rs
//! Client configuration: token, default parent page, timeout and retries.
//!
//! Settings come from explicit values, an existing [`ClientSettings`], or the
//! process environment, in that order of precedence.

use crate::constants::{
    DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, MIN_CLIENT_TIMEOUT_SECS,
    NOTION_API_MAX_RETRIES_ENV_VAR, NOTION_API_TIMEOUT_ENV_VAR, NOTION_API_TOKEN_ENV_VAR,
    NOTION_DEFAULT_PARENT_PAGE_ID_ENV_VAR,
};
use crate::error::AppError;
use crate::types::{ApiToken, ObjectId};
use std::time::Duration;

/// Validated configuration for accessing the Notion API.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub api_token: ApiToken,
    /// Fallback parent used when a create request names no parent.
    pub default_parent_page_id: Option<ObjectId>,
    /// Timeout applied to each HTTP request, in seconds.
    pub client_timeout_secs: f64,
    /// Retry attempts for transient API errors.
    pub max_retries: u32,
}

/// Explicit values that win over both base settings and the environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_token: Option<String>,
    pub default_parent_page_id: Option<String>,
}

impl SettingsOverrides {
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_default_parent_page_id(mut self, id: impl Into<String>) -> Self {
        self.default_parent_page_id = Some(id.into());
        self
    }
}

impl ClientSettings {
    /// Creates settings with default timeout and retry budget.
    pub fn new(api_token: impl Into<String>) -> Result<Self, AppError> {
        let api_token = ApiToken::new(api_token).map_err(|e| {
            AppError::MissingApiToken(format!(
                "Notion API token is required ({}). Provide it explicitly or set the {} environment variable.",
                e, NOTION_API_TOKEN_ENV_VAR
            ))
        })?;

        Ok(Self {
            api_token,
            default_parent_page_id: None,
            client_timeout_secs: DEFAULT_CLIENT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Sets the fallback parent page. An empty value clears it.
    pub fn with_default_parent_page_id(mut self, id: &str) -> Result<Self, AppError> {
        self.default_parent_page_id = if id.trim().is_empty() {
            None
        } else {
            Some(ObjectId::parse(id)?)
        };
        Ok(self)
    }

    pub fn with_timeout_secs(mut self, secs: f64) -> Result<Self, AppError> {
        if !secs.is_finite() || secs < MIN_CLIENT_TIMEOUT_SECS {
            return Err(AppError::Configuration(format!(
                "client timeout must be at least {} second(s), got {}",
                MIN_CLIENT_TIMEOUT_SECS, secs
            )));
        }
        self.client_timeout_secs = secs;
        Ok(self)
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// The request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.client_timeout_secs)
    }

    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(NOTION_API_TOKEN_ENV_VAR)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::MissingApiToken(format!(
                    "Missing Notion API token. Set the {} environment variable.",
                    NOTION_API_TOKEN_ENV_VAR
                ))
            })?;

        let mut settings = Self::new(token)?;

        if let Some(parent) = lookup(NOTION_DEFAULT_PARENT_PAGE_ID_ENV_VAR) {
            settings = settings.with_default_parent_page_id(&parent)?;
        }

        if let Some(raw) = lookup(NOTION_API_TIMEOUT_ENV_VAR) {
            let secs: f64 = raw.trim().parse().map_err(|_| {
                AppError::Configuration(format!("{} must be numeric.", NOTION_API_TIMEOUT_ENV_VAR))
            })?;
            settings = settings.with_timeout_secs(secs)?;
        }

        if let Some(raw) = lookup(NOTION_API_MAX_RETRIES_ENV_VAR) {
            let retries: u32 = raw.trim().parse().map_err(|_| {
                AppError::Configuration(format!(
                    "{} must be a non-negative integer.",
                    NOTION_API_MAX_RETRIES_ENV_VAR
                ))
            })?;
            settings = settings.with_max_retries(retries);
        }

        Ok(settings)
    }

    /// Resolves settings from explicit values, existing settings, or the environment.
    pub fn resolve<F>(
        overrides: &SettingsOverrides,
        base: Option<ClientSettings>,
        lookup: F,
    ) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match (base, &overrides.api_token) {
            (Some(base), _) => base,
            (None, Some(token)) => Self::new(token.as_str())?,
            (None, None) => Self::from_lookup(lookup)?,
        };

        if let Some(token) = &overrides.api_token {
            settings.api_token = Self::new(token.as_str())?.api_token;
        }
        if let Some(parent) = &overrides.default_parent_page_id {
            settings = settings.with_default_parent_page_id(parent)?;
        }

        log::debug!(
            "Resolved Notion settings (token {}, timeout {}s, retries {})",
            settings.api_token.redacted(),
            settings.client_timeout_secs,
            settings.max_retries
        );
        Ok(settings)
    }

    /// Returns the default parent page or a configuration error.
    pub fn require_parent(&self) -> Result<&ObjectId, AppError> {
        self.default_parent_page_id.as_ref().ok_or_else(|| {
            AppError::Configuration("A parent page or database ID is required but missing.".into())
        })
    }
}
