// src/api/pagination.rs
//! Cursor pagination over Notion list endpoints.

use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;
use serde::Deserialize;

/// One page of a Notion list response.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Collects every item of a cursor-paginated listing.
///
/// `fetch_page` receives the page size and the cursor handed back by the
/// previous page (`None` for the first). A cursor that does not advance is
/// reported as a malformed response rather than followed forever.
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, AppError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let requested = cursor.take();
        let page = fetch_page(NOTION_API_PAGE_SIZE as u32, requested.clone()).await?;
        items.extend(page.results);

        match page.next_cursor {
            Some(next) if page.has_more => {
                if requested.as_deref() == Some(next.as_str()) {
                    return Err(AppError::MalformedResponse(format!(
                        "pagination cursor '{}' repeated",
                        next
                    )));
                }
                log::debug!("Fetched {} item(s), continuing at cursor {}", items.len(), next);
                cursor = Some(next);
            }
            _ => return Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_follows_cursors_until_exhausted() {
        let seen = Mutex::new(Vec::new());
        let items = fetch_all_pages(
            |page_size, cursor| {
                seen.lock().unwrap().push((page_size, cursor.clone()));
                async move {
                    Ok(match cursor.as_deref() {
                        None => PaginatedResponse {
                            results: vec![1, 2],
                            next_cursor: Some("c1".to_string()),
                            has_more: true,
                        },
                        Some("c1") => PaginatedResponse {
                            results: vec![3],
                            next_cursor: None,
                            has_more: false,
                        },
                        Some(other) => panic!("unexpected cursor {other}"),
                    })
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(100, None), (100, Some("c1".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_stops_when_has_more_without_cursor() {
        let calls = Mutex::new(0);
        let items = fetch_all_pages(|_, _| {
            *calls.lock().unwrap() += 1;
            async {
                Ok(PaginatedResponse {
                    results: vec!["only"],
                    next_cursor: None,
                    has_more: true,
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["only"]);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeated_cursor_is_rejected() {
        let result = fetch_all_pages(|_, _| async {
            Ok(PaginatedResponse {
                results: vec!["x"],
                next_cursor: Some("again".to_string()),
                has_more: true,
            })
        })
        .await;

        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }
}
