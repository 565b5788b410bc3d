//! Typed search results
//!
//! Mirrors the `search` connection returned by the GraphQL endpoint. Counts
//! are unsigned, so a negative count fails deserialization at the transport
//! boundary instead of leaking into display code.

use crate::query::Cursor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node id of a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(String);

impl RepositoryId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{ name }` objects such as license and language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// One repository in a result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub id: RepositoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fork_count: u64,
    pub stargazer_count: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(default, rename = "licenseInfo")]
    pub license: Option<NamedRef>,
    #[serde(default)]
    pub primary_language: Option<NamedRef>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RepositoryNode {
    #[must_use]
    pub fn language_name(&self) -> Option<&str> {
        self.primary_language.as_ref().map(|l| l.name.as_str())
    }

    #[must_use]
    pub fn license_name(&self) -> Option<&str> {
        self.license.as_ref().map(|l| l.name.as_str())
    }
}

/// Cursor + node pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub cursor: Cursor,
    pub node: RepositoryNode,
}

/// Page boundaries reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub start_cursor: Option<Cursor>,
    #[serde(default)]
    pub end_cursor: Option<Cursor>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// One page of the `search` connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    pub repository_count: u64,
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl SearchConnection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Ids that appear more than once on this page
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<&RepositoryId> {
        let mut seen = std::collections::HashSet::new();
        self.edges
            .iter()
            .map(|edge| &edge.node.id)
            .filter(|id| !seen.insert(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE_JSON: &str = r#"{
        "id": "R_1",
        "name": "react",
        "description": "A library",
        "licenseInfo": { "name": "MIT License" },
        "forkCount": 45000,
        "stargazerCount": 220000,
        "primaryLanguage": { "name": "JavaScript" },
        "updatedAt": "2024-05-01T12:00:00Z",
        "url": "https://github.com/facebook/react"
    }"#;

    #[test]
    fn test_node_deserializes_camel_case() {
        let node: RepositoryNode = serde_json::from_str(NODE_JSON).unwrap();
        assert_eq!(node.id.as_str(), "R_1");
        assert_eq!(node.stargazer_count, 220_000);
        assert_eq!(node.fork_count, 45_000);
        assert_eq!(node.language_name(), Some("JavaScript"));
        assert_eq!(node.license_name(), Some("MIT License"));
    }

    #[test]
    fn test_optional_fields_may_be_null_or_missing() {
        let json = r#"{
            "id": "R_2",
            "name": "bare",
            "description": null,
            "licenseInfo": null,
            "forkCount": 0,
            "stargazerCount": 0,
            "updatedAt": "2020-01-01T00:00:00Z"
        }"#;
        let node: RepositoryNode = serde_json::from_str(json).unwrap();
        assert!(node.description.is_none());
        assert!(node.license.is_none());
        assert!(node.primary_language.is_none());
        assert!(node.url.is_none());
    }

    #[test]
    fn test_negative_count_is_rejected() {
        let json = NODE_JSON.replace("45000", "-1");
        assert!(serde_json::from_str::<RepositoryNode>(&json).is_err());
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let json = NODE_JSON.replace("2024-05-01T12:00:00Z", "yesterday");
        assert!(serde_json::from_str::<RepositoryNode>(&json).is_err());
    }

    #[test]
    fn test_page_info_null_cursors() {
        let json = r#"{"startCursor": null, "endCursor": null, "hasNextPage": false, "hasPreviousPage": false}"#;
        let info: PageInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info, PageInfo::default());
    }

    #[test]
    fn test_duplicate_ids() {
        let node: RepositoryNode = serde_json::from_str(NODE_JSON).unwrap();
        let connection = SearchConnection {
            repository_count: 2,
            page_info: PageInfo::default(),
            edges: vec![
                Edge {
                    cursor: Cursor::new("a"),
                    node: node.clone(),
                },
                Edge {
                    cursor: Cursor::new("b"),
                    node,
                },
            ],
        };
        assert_eq!(connection.duplicate_ids().len(), 1);
    }
}
