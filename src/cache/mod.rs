//! Request cache with in-flight deduplication
//!
//! Successful pages are kept in a bounded `moka` cache with a time-to-live;
//! results are snapshot reads, so a slightly stale page is acceptable.
//! Concurrent `resolve` calls for the same key share one fetch: `moka`
//! coalesces initializers per key, and every waiting caller receives the
//! same outcome.
//!
//! Errors are reported and remembered for [`RequestCache::status`], but are
//! not cached. The next `resolve` for a failed key fetches again.

use crate::api::ApiError;
use crate::model::SearchConnection;
use crate::query::RequestKey;
use moka::sync::Cache;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Default number of pages kept
pub const DEFAULT_CAPACITY: u64 = 256;

/// Default page lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Lifecycle of one request key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// Never requested, or evicted
    Idle,
    /// A fetch is outstanding
    Loading,
    Success(Arc<SearchConnection>),
    Error(Arc<ApiError>),
}

impl QueryState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn data(&self) -> Option<&SearchConnection> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Tracker {
    /// Callers currently inside `resolve`, per key
    in_flight: HashMap<RequestKey, usize>,
    /// Last failure per key, cleared on success
    failures: HashMap<RequestKey, Arc<ApiError>>,
}

/// Keyed response cache shared between the session owner and fetch workers
pub struct RequestCache {
    entries: Cache<RequestKey, Arc<SearchConnection>>,
    tracker: Mutex<Tracker>,
}

impl RequestCache {
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            tracker: Mutex::new(Tracker::default()),
        }
    }

    /// Return the page for `key`, fetching it if needed
    ///
    /// `fetcher` runs at most once across all concurrent callers for the
    /// same key, and not at all on a cache hit.
    pub fn resolve<F>(&self, key: &RequestKey, fetcher: F) -> QueryState
    where
        F: FnOnce() -> Result<SearchConnection, ApiError>,
    {
        if let Some(hit) = self.entries.get(key) {
            tracing::trace!(key = %key, "cache hit");
            return QueryState::Success(hit);
        }

        *self.lock().in_flight.entry(key.clone()).or_insert(0) += 1;

        let result = self.entries.try_get_with(key.clone(), || {
            tracing::debug!(key = %key, "cache miss, fetching");
            fetcher().map(Arc::new)
        });

        let mut tracker = self.lock();
        if let Some(count) = tracker.in_flight.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                tracker.in_flight.remove(key);
            }
        }

        match result {
            Ok(data) => {
                tracker.failures.remove(key);
                QueryState::Success(data)
            }
            Err(err) => {
                tracker.failures.insert(key.clone(), Arc::clone(&err));
                QueryState::Error(err)
            }
        }
    }

    /// Current state of `key` without fetching
    #[must_use]
    pub fn status(&self, key: &RequestKey) -> QueryState {
        if let Some(hit) = self.entries.get(key) {
            return QueryState::Success(hit);
        }
        let tracker = self.lock();
        if tracker.in_flight.contains_key(key) {
            QueryState::Loading
        } else if let Some(err) = tracker.failures.get(key) {
            QueryState::Error(Arc::clone(err))
        } else {
            QueryState::Idle
        }
    }

    /// Drop the cached page and any remembered failure for `key`
    pub fn invalidate(&self, key: &RequestKey) {
        self.entries.invalidate(key);
        self.lock().failures.remove(key);
    }

    /// Drop everything
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.lock().failures.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
