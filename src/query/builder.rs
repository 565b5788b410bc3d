//! GraphQL request construction
//!
//! Turns a `SearchQuery` into the document and variables POSTed to the
//! search endpoint. User data only ever travels in variables; the document
//! text is fixed apart from the optional `orderBy` argument.
//!
//! # Ordering
//!
//! GitHub's `search` field orders results through a `sort:` qualifier inside
//! the search text, which is what [`OrderingStrategy::Qualifier`] does. The
//! other strategies exist for endpoints that accept an `orderBy` argument and
//! for sorting each page locally.

use super::error::QueryError;
use super::types::{Pagination, SearchQuery, SortState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::str::FromStr;

/// Term searched when the user submits nothing
pub const DEFAULT_FALLBACK_TERM: &str = "react";

const REPOSITORY_FIELDS: &str = "repositoryCount
    pageInfo {
      startCursor
      endCursor
      hasNextPage
      hasPreviousPage
    }
    edges {
      cursor
      node {
        ... on Repository {
          id
          name
          description
          licenseInfo {
            name
          }
          forkCount
          stargazerCount
          primaryLanguage {
            name
          }
          updatedAt
          url
        }
      }
    }";

/// How result ordering reaches the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderingStrategy {
    /// Append a `sort:<field>-<direction>` qualifier to the search text
    #[default]
    Qualifier,
    /// Send an `orderBy` variable
    Argument,
    /// Send nothing and sort each page locally
    Client,
}

impl OrderingStrategy {
    /// Whether the server returns results already in the requested order
    #[must_use]
    pub const fn server_ordered(self) -> bool {
        !matches!(self, Self::Client)
    }
}

impl FromStr for OrderingStrategy {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qualifier" => Ok(Self::Qualifier),
            "argument" => Ok(Self::Argument),
            "client" => Ok(Self::Client),
            _ => Err(QueryError::UnknownOrdering(s.to_string())),
        }
    }
}

/// Request body for the GraphQL endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: Map<String, Value>,
}

/// Trim a raw term, substituting `fallback` when nothing is left
#[must_use]
pub fn normalize_term(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds search requests under a fixed ordering strategy
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    strategy: OrderingStrategy,
    fallback_term: String,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(strategy: OrderingStrategy) -> Self {
        Self {
            strategy,
            fallback_term: DEFAULT_FALLBACK_TERM.to_string(),
        }
    }

    /// Replace the term used when a query's term is blank
    #[must_use]
    pub fn with_fallback_term(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        if !term.trim().is_empty() {
            self.fallback_term = term;
        }
        self
    }

    #[must_use]
    pub const fn strategy(&self) -> OrderingStrategy {
        self.strategy
    }

    /// Build the request for one page
    #[must_use]
    pub fn build(&self, query: &SearchQuery) -> GraphQlRequest {
        let term = normalize_term(&query.term, &self.fallback_term);

        let mut variables = Map::new();
        variables.insert(
            "query".to_string(),
            Value::String(self.search_text(&term, query.order_by)),
        );

        match &query.pagination {
            Pagination::Forward { first, after } => {
                variables.insert("first".to_string(), json!(first));
                if let Some(cursor) = after {
                    variables.insert("after".to_string(), json!(cursor.as_str()));
                }
            }
            Pagination::Backward { last, before } => {
                variables.insert("last".to_string(), json!(last));
                if let Some(cursor) = before {
                    variables.insert("before".to_string(), json!(cursor.as_str()));
                }
            }
        }

        if self.strategy == OrderingStrategy::Argument {
            variables.insert(
                "orderBy".to_string(),
                json!({
                    "field": query.order_by.field.as_graphql(),
                    "direction": query.order_by.direction.as_graphql(),
                }),
            );
        }

        GraphQlRequest {
            query: self.document(),
            variables,
        }
    }

    fn search_text(&self, term: &str, sort: SortState) -> String {
        if self.strategy != OrderingStrategy::Qualifier {
            return term.to_string();
        }

        // A user-typed sort qualifier would fight with ours
        let mut words: Vec<&str> = term
            .split_whitespace()
            .filter(|word| !word.to_ascii_lowercase().starts_with("sort:"))
            .collect();
        if words.is_empty() {
            words.push(self.fallback_term.as_str());
        }

        format!(
            "{} sort:{}-{}",
            words.join(" "),
            sort.field.qualifier(),
            sort.direction.qualifier()
        )
    }

    fn document(&self) -> String {
        let (order_param, order_arg) = if self.strategy == OrderingStrategy::Argument {
            (", $orderBy: RepositoryOrder", ", orderBy: $orderBy")
        } else {
            ("", "")
        };

        format!(
            "query SearchRepositories($query: String!, $first: Int, $after: String, \
             $last: Int, $before: String{order_param}) {{
  search(query: $query, type: REPOSITORY, first: $first, after: $after, \
             last: $last, before: $before{order_arg}) {{
    {REPOSITORY_FIELDS}
  }}
}}"
        )
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(OrderingStrategy::default())
    }
}
