// src/api/parser.rs
//! Turns raw HTTP responses into JSON values or typed API errors.

use super::client::ApiResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode};
use notion_client::objects::error::Error as NotionError;
use reqwest::StatusCode;
use serde_json::Value;

/// Parses any Notion API response body.
///
/// Successful responses yield their JSON document (an empty body yields
/// `Value::Null`). Error responses become [`AppError::NotionApi`] when Notion
/// sent its structured error object, or [`AppError::NotionService`] otherwise.
pub fn parse_api_response(result: ApiResponse<String>) -> Result<Value, AppError> {
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success(body: &str, url: &str) -> Result<Value, AppError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!("{} (body: {})", e, preview(body)))
    })
}

fn parse_error(body: &str, status: StatusCode, url: &str) -> AppError {
    if let Ok(notion_error) = serde_json::from_str::<NotionError>(body) {
        log::debug!(
            "Notion rejected request to {}: {} ({})",
            url,
            notion_error.code,
            status
        );
        return AppError::NotionApi {
            status: u16::try_from(notion_error.status).unwrap_or_else(|_| status.as_u16()),
            code: NotionErrorCode::from_api_response(&notion_error.code),
            message: notion_error.message,
            request_id: notion_error.request_id,
        };
    }

    AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}: {}", status, url, preview(body)),
        status,
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

/// Reads the `results` array of a list response, tolerating its absence.
pub fn results_of(response: &Value) -> Vec<Value> {
    response
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response(status: u16, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status: StatusCode::from_u16(status).unwrap(),
            url: "https://api.notion.com/v1/pages/x".to_string(),
        }
    }

    #[test]
    fn test_success_body_is_parsed() {
        let value = parse_api_response(response(200, r#"{"id": "abc", "object": "page"}"#)).unwrap();
        assert_eq!(value, json!({"id": "abc", "object": "page"}));
    }

    #[test]
    fn test_empty_success_body_is_null() {
        assert_eq!(parse_api_response(response(200, "")).unwrap(), Value::Null);
    }

    #[test]
    fn test_malformed_success_body() {
        let err = parse_api_response(response(200, "{not json")).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_structured_notion_error() {
        let body = r#"{
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page with ID: x.",
            "request_id": "req-1"
        }"#;
        match parse_api_response(response(404, body)).unwrap_err() {
            AppError::NotionApi {
                status,
                code,
                message,
                request_id,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, NotionErrorCode::ObjectNotFound);
                assert_eq!(message, "Could not find page with ID: x.");
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unstructured_error_falls_back_to_status() {
        let err = parse_api_response(response(502, "<html>bad gateway</html>")).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.http_status(), Some(502));
    }

    #[test]
    fn test_results_of_missing_array() {
        assert!(results_of(&json!({"object": "list"})).is_empty());
        assert_eq!(results_of(&json!({"results": [1, 2]})).len(), 2);
    }
}
