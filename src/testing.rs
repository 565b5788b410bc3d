//! Testing utilities for reposcout
//!
//! Fixture builders for result pages and a scripted in-memory transport.
//!
//! Only available when compiled with `cfg(test)`.

use crate::api::{ApiError, Transport};
use crate::model::{Edge, PageInfo, RepositoryId, RepositoryNode, SearchConnection};
use crate::query::{Cursor, GraphQlRequest};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Build a repository node
///
/// # Panics
/// Panics if `updated_at` is not RFC 3339.
pub fn node(id: &str, stars: u64, forks: u64, updated_at: &str) -> RepositoryNode {
    RepositoryNode {
        id: RepositoryId::new(id),
        name: format!("repo-{}", id.to_lowercase()),
        description: Some(format!("Description of {id}")),
        fork_count: forks,
        stargazer_count: stars,
        updated_at: DateTime::parse_from_rfc3339(updated_at)
            .expect("valid RFC 3339 timestamp")
            .with_timezone(&Utc),
        license: None,
        primary_language: None,
        url: Some(format!("https://github.com/example/{id}")),
    }
}

/// Build page info from optional cursor strings
pub fn page_info(start: Option<&str>, end: Option<&str>, next: bool, prev: bool) -> PageInfo {
    PageInfo {
        start_cursor: start.map(Cursor::new),
        end_cursor: end.map(Cursor::new),
        has_next_page: next,
        has_previous_page: prev,
    }
}

/// Build a page from `(id, stars, forks)` triples
///
/// Each edge's cursor is `cursor-<id>`; the page boundaries are the first
/// and last edge cursors.
pub fn connection(rows: &[(&str, u64, u64)], next: bool, prev: bool) -> SearchConnection {
    let edges: Vec<Edge> = rows
        .iter()
        .map(|(id, stars, forks)| Edge {
            cursor: Cursor::new(format!("cursor-{id}")),
            node: node(id, *stars, *forks, "2024-01-01T00:00:00Z"),
        })
        .collect();

    SearchConnection {
        repository_count: edges.len() as u64,
        page_info: PageInfo {
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
            has_next_page: next,
            has_previous_page: prev,
        },
        edges,
    }
}

/// Transport that replays queued results and records requests
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<SearchConnection, ApiError>>>,
    requests: Mutex<Vec<GraphQlRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next result
    pub fn push(&self, result: Result<SearchConnection, ApiError>) {
        self.responses.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GraphQlRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &GraphQlRequest) -> Result<SearchConnection, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
    }
}
