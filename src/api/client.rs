//! GitHub GraphQL client

use super::error::ApiError;
use super::{DEFAULT_RETRY_AFTER_SECS, parse_search_response};
use crate::config::ScoutConfig;
use crate::model::SearchConnection;
use crate::query::GraphQlRequest;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

/// Public GitHub GraphQL endpoint
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// User agent string for API requests
const USER_AGENT_VALUE: &str = concat!("reposcout/", env!("CARGO_PKG_VERSION"));

/// Anything that can execute a search request
///
/// Implemented by [`GitHubClient`] for real traffic and by in-memory fakes
/// in tests.
pub trait Transport: Send + Sync {
    /// Execute one request and return the validated page
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx status, GraphQL errors
    /// or a malformed body.
    fn execute(&self, request: &GraphQlRequest) -> Result<SearchConnection, ApiError>;
}

/// Blocking client for the GitHub GraphQL API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    endpoint: String,
}

impl GitHubClient {
    /// Create a client for `endpoint`
    ///
    /// The bearer token, when present, is attached to every request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the token is not a valid header value
    /// or the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| ApiError::Transport("token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client from configuration, reading the token from the environment
    ///
    /// # Errors
    ///
    /// Same as [`GitHubClient::new`].
    pub fn from_config(config: &ScoutConfig) -> Result<Self, ApiError> {
        let token = config.token();
        if token.is_none() {
            tracing::warn!(
                env = %config.token_env,
                "no API token found; GitHub requires one for GraphQL search"
            );
        }
        Self::new(
            config.endpoint.clone(),
            token.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn handle_response(response: Response) -> Result<SearchConnection, ApiError> {
        let status = response.status();

        if is_rate_limited(status, response.headers()) {
            let retry_after = retry_after_secs(response.headers());
            return Err(ApiError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text()?;
        parse_search_response(&body)
    }
}

impl Transport for GitHubClient {
    fn execute(&self, request: &GraphQlRequest) -> Result<SearchConnection, ApiError> {
        tracing::debug!(endpoint = %self.endpoint, "sending search request");

        let response = self.http.post(&self.endpoint).json(request).send()?;
        let result = Self::handle_response(response);

        match &result {
            Ok(connection) => tracing::debug!(
                edges = connection.edges.len(),
                total = connection.repository_count,
                "search request completed"
            ),
            Err(err) => tracing::warn!(error = %err, "search request failed"),
        }
        result
    }
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|remaining| remaining == "0")
}

fn retry_after_secs(headers: &HeaderMap) -> u64 {
    if let Some(secs) = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        return secs;
    }

    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .map_or(DEFAULT_RETRY_AFTER_SECS, |reset| {
            let now = chrono::Utc::now().timestamp();
            u64::try_from(reset.saturating_sub(now)).unwrap_or(0)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new(GITHUB_GRAPHQL_URL, None, Duration::from_secs(5));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().endpoint(), GITHUB_GRAPHQL_URL);
    }

    #[test]
    fn test_client_with_token() {
        let client = GitHubClient::new(GITHUB_GRAPHQL_URL, Some("ghp_abc"), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let client = GitHubClient::new(GITHUB_GRAPHQL_URL, Some("bad\ntoken"), Duration::from_secs(5));
        assert!(matches!(client, Err(ApiError::Transport(_))));
    }

    #[test]
    fn test_rate_limit_detection() {
        let mut headers = HeaderMap::new();
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS, &headers));
        assert!(!is_rate_limited(StatusCode::FORBIDDEN, &headers));

        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        assert!(is_rate_limited(StatusCode::FORBIDDEN, &headers));
        assert!(!is_rate_limited(StatusCode::OK, &headers));
    }

    #[test]
    fn test_retry_after_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("17"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("0"));
        assert_eq!(retry_after_secs(&headers), 17);
    }

    #[test]
    fn test_retry_after_defaults() {
        assert_eq!(retry_after_secs(&HeaderMap::new()), DEFAULT_RETRY_AFTER_SECS);
    }

    #[test]
    fn test_reset_in_the_past_means_no_wait() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1"));
        assert_eq!(retry_after_secs(&headers), 0);
    }
}
