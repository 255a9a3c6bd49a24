// src/error.rs
//! Application error types.
//!
//! Configuration and input problems are reported as-is. Failures that happen
//! while talking to Notion are wrapped into [`AppError::ToolExecution`] by the
//! tools so the calling agent sees which operation failed and why.

use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded
    RateLimited,
    /// The requested object does not exist or is not shared with the integration
    ObjectNotFound,
    /// API token is invalid or expired
    Unauthorized,
    /// Token lacks the capability for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::ServiceUnavailable | Self::InternalError => true,
            Self::HttpStatus(status) => is_retryable_status(*status),
            _ => false,
        }
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// HTTP statuses Notion documents as transient.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Main error type for the library and the CLI.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MissingApiToken(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API error ({status}): {code} - {message}")]
    NotionApi {
        status: u16,
        code: NotionErrorCode,
        message: String,
        request_id: Option<String>,
    },

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{operation} failed: {message}")]
    ToolExecution { operation: String, message: String },

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether the error was raised before anything was sent to Notion.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiToken(_)
                | Self::Configuration(_)
                | Self::InvalidInput(_)
                | Self::Validation(_)
        )
    }

    /// The Notion error code, when the failure came back from the API.
    pub fn notion_code(&self) -> Option<&NotionErrorCode> {
        match self {
            Self::NotionApi { code, .. } | Self::NotionService { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The HTTP status, when the failure came back from the API.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::NotionApi { status, .. } => Some(*status),
            Self::NotionService { status, .. } => Some(status.as_u16()),
            Self::NetworkFailure(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts count as retryable here. The HTTP client still refuses to
    /// resend a timed-out POST or PATCH.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotionApi { status, code, .. } => {
                code.is_retryable() || is_retryable_status(*status)
            }
            Self::NotionService { code, .. } => code.is_retryable(),
            Self::NetworkFailure(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err
                        .status()
                        .map(|s| is_retryable_status(s.as_u16()))
                        .unwrap_or(false)
            }
            _ => false,
        }
    }
}

/// Wraps a failure from a Notion call into the error an agent sees.
///
/// Configuration and input errors pass through untouched. Everything else
/// becomes `"{operation} failed: {cause} (code X) [status N]"`.
pub fn tool_failure(operation: &str, error: AppError) -> AppError {
    if error.is_configuration() || matches!(error, AppError::ToolExecution { .. }) {
        return error;
    }

    let mut message = match &error {
        AppError::NotionApi { message, .. } | AppError::NotionService { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    };
    if let Some(code) = error.notion_code() {
        if !matches!(code, NotionErrorCode::HttpStatus(_)) {
            message.push_str(&format!(" (code {})", code));
        }
    }
    if let Some(status) = error.http_status() {
        message.push_str(&format!(" [status {}]", status));
    }

    AppError::ToolExecution {
        operation: operation.to_string(),
        message,
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
