//! Query-construction error types
//!
//! These errors are raised while turning user intent into a `SearchQuery`,
//! before anything touches the network.
//!
//! # Error Types
//!
//! - **`InvalidPageSize`**: Page size outside the range the API accepts
//! - **`UnknownSortField`**: Sort column name that does not map to a field
//! - **`UnknownOrdering`**: Ordering strategy name that is not recognized

use thiserror::Error;

/// Errors produced while building search queries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Page size must be between 1 and the API maximum
    #[error("Invalid page size {0}: expected a value between 1 and {max}", max = super::MAX_PAGE_SIZE)]
    InvalidPageSize(u32),

    /// Sort field name was not recognized
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    /// Ordering strategy name was not recognized
    #[error("Unknown ordering strategy: {0}")]
    UnknownOrdering(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
