// src/api/client.rs
//! HTTP client for the Notion API.
//!
//! A thin wrapper around reqwest that handles authentication, timeouts and
//! retries. Parsing lives in [`super::parser`].

use super::pagination::{fetch_all_pages, PaginatedResponse};
use super::parser::parse_api_response;
use super::retry::{retry_with_backoff, AttemptError, RetryPolicy};
use super::NotionApi;
use crate::config::ClientSettings;
use crate::constants::{NOTION_API_BASE_URL, NOTION_API_PAGE_SIZE, NOTION_API_VERSION};
use crate::error::AppError;
use crate::types::{ApiToken, ObjectId};
use reqwest::{header, Client, Method, Response};
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

/// Reqwest-backed [`NotionApi`] implementation.
///
/// Cloning is cheap: clones share one connection pool.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl NotionHttpClient {
    /// Creates a client configured from `settings`.
    pub fn new(settings: &ClientSettings) -> Result<Self, AppError> {
        Self::with_base_url(settings, NOTION_API_BASE_URL)
    }

    /// Creates a client talking to a different API root (proxies, test servers).
    pub fn with_base_url(settings: &ClientSettings, base_url: &str) -> Result<Self, AppError> {
        log::debug!(
            "Creating Notion client (token {}, timeout {:?}, retries {})",
            settings.api_token.redacted(),
            settings.timeout(),
            settings.max_retries
        );

        let client = Client::builder()
            .default_headers(Self::create_headers(&settings.api_token)?)
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(settings.max_retries),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(token: &ApiToken) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|e| AppError::Configuration(format!("Invalid API token format: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Resolves `path` against the API root.
    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        Url::parse(&format!("{}/{}", self.base_url, path)).map_err(|e| {
            AppError::Configuration(format!("Invalid Notion endpoint '{}': {}", path, e))
        })
    }

    /// Sends one request, retrying transient failures, and parses the reply.
    ///
    /// Timeouts are retried for idempotent methods only: a timed-out POST or
    /// PATCH may already have been applied.
    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, AppError> {
        let idempotent = method.is_idempotent();

        retry_with_backoff(&self.retry, || {
            let mut builder = self.client.request(method.clone(), url.clone());
            if let Some(body) = body {
                builder = builder.json(body);
            }
            let url = url.clone();
            let method = method.clone();
            async move {
                log::debug!("{} {}", method, url);
                let response = builder
                    .send()
                    .await
                    .map_err(|e| transport_failure(e.into(), idempotent))?;
                log::debug!("{} {} -> {}", method, url, response.status());
                let hint = retry_after(&response);
                let result = extract_response_text(response)
                    .await
                    .map_err(|e| transport_failure(e, idempotent))?;
                parse_api_response(result).map_err(|error| AttemptError::new(error, hint))
            }
        })
        .await
    }

    async fn get(&self, path: &str) -> Result<Value, AppError> {
        self.request(Method::GET, self.endpoint(path)?, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        self.request(Method::POST, self.endpoint(path)?, Some(body))
            .await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        self.request(Method::PATCH, self.endpoint(path)?, Some(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<Value, AppError> {
        self.request(Method::DELETE, self.endpoint(path)?, None).await
    }
}

/// Wraps a transport error, making a timeout final for non-idempotent requests.
fn transport_failure(error: AppError, idempotent: bool) -> AttemptError {
    let timed_out = matches!(&error, AppError::NetworkFailure(err) if err.is_timeout());
    let failure = AttemptError::from(error);
    if timed_out && !idempotent {
        failure.final_attempt()
    } else {
        failure
    }
}

#[async_trait::async_trait]
impl NotionApi for NotionHttpClient {
    async fn search(
        &self,
        query: &str,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Value, AppError> {
        let mut body = json!({ "query": query, "page_size": NOTION_API_PAGE_SIZE });
        if let Some(filter) = filter {
            body["filter"] = Value::Object(filter.clone());
        }
        self.post("search", &body).await
    }

    async fn retrieve_page(&self, page_id: &ObjectId) -> Result<Value, AppError> {
        self.get(&format!("pages/{}", page_id)).await
    }

    async fn query_database(
        &self,
        database_id: &ObjectId,
        filter: Option<&Map<String, Value>>,
    ) -> Result<Value, AppError> {
        let mut body = json!({ "page_size": NOTION_API_PAGE_SIZE });
        if let Some(filter) = filter {
            body["filter"] = Value::Object(filter.clone());
        }
        self.post(&format!("databases/{}/query", database_id), &body)
            .await
    }

    async fn create_page(&self, payload: &Value) -> Result<Value, AppError> {
        self.post("pages", payload).await
    }

    async fn update_page_properties(
        &self,
        page_id: &ObjectId,
        properties: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let body = json!({ "properties": properties });
        self.patch(&format!("pages/{}", page_id), &body).await
    }

    async fn append_block_children(
        &self,
        block_id: &ObjectId,
        children: &[Value],
    ) -> Result<Value, AppError> {
        let body = json!({ "children": children });
        self.patch(&format!("blocks/{}/children", block_id), &body)
            .await
    }

    async fn list_block_children(&self, block_id: &ObjectId) -> Result<Vec<Value>, AppError> {
        let base = self.endpoint(&format!("blocks/{}/children", block_id))?;
        fetch_all_pages(|page_size, cursor| {
            let mut url = base.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("page_size", &page_size.to_string());
                if let Some(cursor) = &cursor {
                    query.append_pair("start_cursor", cursor);
                }
            }
            async move {
                let value = self.request(Method::GET, url, None).await?;
                serde_json::from_value::<PaginatedResponse<Value>>(value)
                    .map_err(|e| AppError::MalformedResponse(e.to_string()))
            }
        })
        .await
    }

    async fn delete_block(&self, block_id: &ObjectId) -> Result<(), AppError> {
        self.delete(&format!("blocks/{}", block_id)).await?;
        Ok(())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}

/// The `Retry-After` delay of a response, when given in seconds.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
