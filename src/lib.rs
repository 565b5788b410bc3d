//! Reposcout - GitHub repository search from the terminal
//!
//! This library keeps a paginated, sortable repository search consistent:
//! it builds well-formed page requests, tracks cursors across forward and
//! backward navigation, deduplicates identical requests and makes sure only
//! the response for the latest request is ever shown.
//!
//! The pieces, bottom up:
//!
//! - [`query`]: request arguments, canonical request keys, GraphQL documents
//! - [`api`]: HTTP transport and response validation
//! - [`session`]: term, sort, cursor and selection state
//! - [`cache`]: keyed response cache with in-flight deduplication
//! - [`projection`]: display ordering of a page
//! - [`app`]: host that wires the above to background fetch workers

use thiserror::Error;

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod projection;
pub mod query;
pub mod session;
pub mod worker;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Invalid search arguments
    #[error("Query error: {0}")]
    QueryError(#[from] query::QueryError),
    /// Search API error
    #[error("API error: {0}")]
    ApiError(#[from] api::ApiError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
