//! API error types
//!
//! Everything that can go wrong between sending a search request and holding
//! a validated `SearchConnection`.
//!
//! # Error Types
//!
//! - **`Transport`**: Connection failures and timeouts
//! - **`Http`**: Non-2xx responses
//! - **`RateLimited`**: Quota exhausted, with a retry hint in seconds
//! - **`GraphQl`**: Well-formed response carrying an `errors` list
//! - **`Malformed`**: Body that does not match the result schema
//!
//! Callers that only care about the coarse category use [`ApiError::kind`].

use thiserror::Error;

/// Coarse error category shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or non-2xx status
    Transport,
    /// The server answered, but not with usable results
    GraphQl,
}

/// Errors raised by the search transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiError {
    /// Request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// API quota exhausted
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Response carried GraphQL errors
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// Response did not match the expected schema
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Coarse category of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::Http { .. } => ErrorKind::Transport,
            Self::RateLimited { .. } | Self::GraphQl(_) | Self::Malformed(_) => ErrorKind::GraphQl,
        }
    }

    /// Short message suitable for display
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Transport(_) => "Could not reach GitHub. Check your connection and retry.",
            Self::Http { status: 401, .. } => {
                "GitHub rejected the credentials. Check the configured token."
            }
            Self::Http { .. } => "GitHub returned an error. Please retry.",
            Self::RateLimited { .. } => "GitHub API rate limit reached. Please try again later.",
            Self::GraphQl(_) => "GitHub could not run this search.",
            Self::Malformed(_) => "GitHub returned an unexpected response.",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
