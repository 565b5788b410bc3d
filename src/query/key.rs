//! Canonical request identity
//!
//! A `RequestKey` is the cache and dedup identity of a `SearchQuery`. Fields
//! are written in a fixed order and absent pagination arguments are simply
//! left out, so two logically identical queries always produce the same key.

use super::types::SearchQuery;
use serde_json::Value;
use std::fmt;

/// Canonical serialization of a query's arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    /// Derive the key for a query
    #[must_use]
    pub fn from_query(query: &SearchQuery) -> Self {
        // Strings go through JSON quoting so separators inside a term or
        // cursor cannot collide with the key's own structure.
        let mut parts = vec![
            format!("term={}", Value::from(query.term.as_str())),
            format!("sort={}", query.order_by),
        ];

        let pagination = &query.pagination;
        if let Some(first) = pagination.first() {
            parts.push(format!("first={first}"));
        }
        if let Some(after) = pagination.after() {
            parts.push(format!("after={}", Value::from(after.as_str())));
        }
        if let Some(last) = pagination.last() {
            parts.push(format!("last={last}"));
        }
        if let Some(before) = pagination.before() {
            parts.push(format!("before={}", Value::from(before.as_str())));
        }

        Self(parts.join("&"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&SearchQuery> for RequestKey {
    fn from(query: &SearchQuery) -> Self {
        Self::from_query(query)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Cursor, Pagination, SortDirection, SortField, SortState};

    fn query(term: &str, pagination: Pagination, sort: SortState) -> SearchQuery {
        SearchQuery::new(term, pagination, sort)
    }

    #[test]
    fn test_identical_queries_share_a_key() {
        let a = query(
            "react",
            Pagination::Forward {
                first: 10,
                after: Some(Cursor::new("c10")),
            },
            SortState::default(),
        );
        let b = a.clone();
        assert_eq!(RequestKey::from_query(&a), RequestKey::from_query(&b));
    }

    #[test]
    fn test_key_layout() {
        let q = query(
            "react",
            Pagination::Forward {
                first: 10,
                after: Some(Cursor::new("c10")),
            },
            SortState::default(),
        );
        assert_eq!(
            RequestKey::from(&q).as_str(),
            "term=\"react\"&sort=STARS:DESC&first=10&after=\"c10\""
        );
    }

    #[test]
    fn test_absent_cursor_is_omitted() {
        let q = query("vue", Pagination::first_page(10).unwrap(), SortState::default());
        let key = RequestKey::from_query(&q);
        assert!(!key.as_str().contains("after"));
        assert!(!key.as_str().contains("before"));
    }

    #[test]
    fn test_sort_and_direction_change_the_key() {
        let base = query("rust", Pagination::first_page(10).unwrap(), SortState::default());
        let mut forks = base.clone();
        forks.order_by = SortState::new(SortField::Forks, SortDirection::Desc);
        let mut asc = base.clone();
        asc.order_by = SortState::new(SortField::Stars, SortDirection::Asc);

        let k = RequestKey::from_query(&base);
        assert_ne!(k, RequestKey::from_query(&forks));
        assert_ne!(k, RequestKey::from_query(&asc));
    }

    #[test]
    fn test_separator_inside_term_does_not_collide() {
        let tricky = query(
            "a&sort=FORKS:ASC",
            Pagination::first_page(10).unwrap(),
            SortState::default(),
        );
        let plain = query("a", Pagination::first_page(10).unwrap(), SortState::default());
        assert_ne!(RequestKey::from_query(&tricky), RequestKey::from_query(&plain));
    }

    #[test]
    fn test_forward_and_backward_keys_differ() {
        let cursor = Cursor::new("c");
        let forward = query(
            "go",
            Pagination::Forward {
                first: 10,
                after: Some(cursor.clone()),
            },
            SortState::default(),
        );
        let backward = query(
            "go",
            Pagination::Backward {
                last: 10,
                before: Some(cursor),
            },
            SortState::default(),
        );
        assert_ne!(RequestKey::from_query(&forward), RequestKey::from_query(&backward));
    }
}
