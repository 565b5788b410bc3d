//! GitHub GraphQL transport
//!
//! - `client`: Blocking HTTP client that POSTs search requests
//! - `error`: `ApiError` and its coarse `ErrorKind`
//!
//! Response bodies are validated here, at the boundary: anything that is not
//! a well-formed `search` connection becomes an `ApiError` rather than a
//! partially filled value.

pub mod client;
pub mod error;

pub use client::{GitHubClient, Transport};
pub use error::{ApiError, ErrorKind};

use crate::model::SearchConnection;
use serde::Deserialize;
use serde_json::Value;

/// Retry hint used when the server does not send one
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: SearchConnection,
}

/// Parse and validate a search response body
///
/// # Errors
///
/// - `ApiError::RateLimited` if the server reports a `RATE_LIMITED` error
/// - `ApiError::GraphQl` if the response carries any other errors
/// - `ApiError::Malformed` if `data` is missing, does not match the schema,
///   or lists the same repository twice
pub fn parse_search_response(body: &str) -> Result<SearchConnection, ApiError> {
    let raw: RawResponse = serde_json::from_str(body)?;

    if let Some(errors) = raw.errors.filter(|errors| !errors.is_empty()) {
        if errors
            .iter()
            .any(|e| e.kind.as_deref() == Some("RATE_LIMITED"))
        {
            return Err(ApiError::RateLimited {
                retry_after: DEFAULT_RETRY_AFTER_SECS,
            });
        }
        return Err(ApiError::GraphQl(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    let data = raw
        .data
        .filter(|data| !data.is_null())
        .ok_or_else(|| ApiError::Malformed("response has no data".to_string()))?;
    let SearchData { search } = serde_json::from_value(data)?;

    if let Some(id) = search.duplicate_ids().first() {
        return Err(ApiError::Malformed(format!(
            "repository {id} appears more than once"
        )));
    }

    Ok(search)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(edges: &str) -> String {
        format!(
            r#"{{"data": {{"search": {{
                "repositoryCount": 2,
                "pageInfo": {{"startCursor": "c1", "endCursor": "c2", "hasNextPage": true, "hasPreviousPage": false}},
                "edges": [{edges}]
            }}}}}}"#
        )
    }

    fn edge(id: &str, cursor: &str) -> String {
        format!(
            r#"{{"cursor": "{cursor}", "node": {{"id": "{id}", "name": "n{id}", "forkCount": 1, "stargazerCount": 2, "updatedAt": "2024-01-01T00:00:00Z"}}}}"#
        )
    }

    #[test]
    fn test_parse_valid_response() {
        let text = body(&format!("{},{}", edge("A", "c1"), edge("B", "c2")));
        let connection = parse_search_response(&text).unwrap();
        assert_eq!(connection.repository_count, 2);
        assert_eq!(connection.edges.len(), 2);
        assert!(connection.page_info.has_next_page);
        assert_eq!(
            connection.page_info.end_cursor.as_ref().map(|c| c.as_str()),
            Some("c2")
        );
    }

    #[test]
    fn test_parse_empty_edges_is_ok() {
        let connection = parse_search_response(&body("")).unwrap();
        assert!(connection.is_empty());
    }

    #[test]
    fn test_graphql_errors_are_reported() {
        let text = r#"{"data": null, "errors": [{"message": "Parse error on \"}\""}]}"#;
        let err = parse_search_response(text).unwrap_err();
        assert!(matches!(err, ApiError::GraphQl(ref messages) if messages.len() == 1));
    }

    #[test]
    fn test_rate_limited_error() {
        let text = r#"{"errors": [{"type": "RATE_LIMITED", "message": "API rate limit exceeded"}]}"#;
        assert_eq!(
            parse_search_response(text),
            Err(ApiError::RateLimited {
                retry_after: DEFAULT_RETRY_AFTER_SECS
            })
        );
    }

    #[test]
    fn test_missing_data_is_malformed() {
        assert!(matches!(
            parse_search_response("{}"),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_schema_mismatch_is_malformed() {
        let text = r#"{"data": {"search": {"repositoryCount": "many"}}}"#;
        assert!(matches!(
            parse_search_response(text),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_are_malformed() {
        let text = body(&format!("{},{}", edge("A", "c1"), edge("A", "c2")));
        let err = parse_search_response(&text).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_not_json_is_malformed() {
        assert!(matches!(
            parse_search_response("<html>"),
            Err(ApiError::Malformed(_))
        ));
    }
}
