//! Search host
//!
//! [`SearchApp`] owns the session and is the only thing that mutates it.
//! Intents update the session synchronously and dispatch the resulting
//! request to the fetch workers; outcomes are applied when polled.
//!
//! An outcome is applied only if its key is still the session's current
//! request key. Anything else is a response to a superseded request and is
//! dropped on arrival, however late or early it shows up.

use crate::ScoutError;
use crate::api::{ApiError, GitHubClient, Transport};
use crate::cache::{QueryState, RequestCache};
use crate::config::ScoutConfig;
use crate::model::{RepositoryId, RepositoryNode, SearchConnection};
use crate::projection::{Projection, ResultProjector};
use crate::query::{QueryBuilder, RequestKey, SortField, SortState};
use crate::session::SearchSession;
use crate::worker::{FetchJob, FetchOutcome, FetchWorker};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fetch threads started by [`SearchApp::from_config`]
pub const DEFAULT_FETCH_THREADS: usize = 2;

/// What the front-end should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Nothing requested yet
    Idle,
    /// The current request has not settled
    Loading,
    /// The current request succeeded (possibly with zero rows)
    Ready(Projection),
    /// The current request failed; the session is unchanged
    Failed {
        message: String,
        error: Arc<ApiError>,
    },
}

impl View {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn projection(&self) -> Option<&Projection> {
        match self {
            Self::Ready(projection) => Some(projection),
            _ => None,
        }
    }
}

/// Session host wiring query building, caching, fetching and projection
pub struct SearchApp {
    session: SearchSession,
    builder: QueryBuilder,
    projector: ResultProjector,
    cache: Arc<RequestCache>,
    worker: FetchWorker,
    view: View,
    /// Key whose outcome `view` currently shows
    settled: Option<RequestKey>,
    /// Key still awaiting its outcome while `view` is loading
    dispatched: Option<RequestKey>,
    /// Outcomes dropped because their request was superseded
    discarded: u64,
}

impl SearchApp {
    /// Wire an app from its parts
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the fetch threads cannot be spawned.
    pub fn new(
        session: SearchSession,
        builder: QueryBuilder,
        transport: Arc<dyn Transport>,
        cache: Arc<RequestCache>,
        fetch_threads: usize,
    ) -> std::io::Result<Self> {
        let worker = FetchWorker::spawn(transport, Arc::clone(&cache), fetch_threads)?;
        Ok(Self {
            projector: ResultProjector::new(builder.strategy()),
            session,
            builder,
            cache,
            worker,
            view: View::Idle,
            settled: None,
            dispatched: None,
            discarded: 0,
        })
    }

    /// Build the app against GitHub from configuration
    ///
    /// # Errors
    ///
    /// Returns `ScoutError` if the session settings are invalid, the HTTP
    /// client cannot be built, or the fetch threads cannot be spawned.
    pub fn from_config(
        config: &ScoutConfig,
        term: Option<&str>,
        sort: SortState,
    ) -> Result<Self, ScoutError> {
        let mut session = SearchSession::builder()
            .fallback_term(config.fallback_term.clone())
            .page_size(config.page_size)
            .sort(sort);
        if let Some(term) = term {
            session = session.term(term);
        }
        let session = session.build()?;

        let builder =
            QueryBuilder::new(config.ordering).with_fallback_term(config.fallback_term.clone());
        let transport: Arc<dyn Transport> = Arc::new(GitHubClient::from_config(config)?);
        let cache = Arc::new(RequestCache::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        ));

        Ok(Self::new(session, builder, transport, cache, DEFAULT_FETCH_THREADS)?)
    }

    /// Commit a search term and fetch its first page
    ///
    /// Returns `false` if the term was already committed.
    pub fn submit(&mut self, term: &str) -> bool {
        let changed = self.session.submit(term);
        if changed {
            self.refresh();
        }
        changed
    }

    /// Toggle sort on `field` and fetch the first page
    pub fn sort(&mut self, field: SortField) -> SortState {
        let sort = self.session.sort(field);
        self.refresh();
        sort
    }

    pub fn next_page(&mut self) -> bool {
        self.catch_up();
        let moved = self.session.next_page();
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        self.catch_up();
        let moved = self.session.prev_page();
        if moved {
            self.refresh();
        }
        moved
    }

    /// Select the repository at a 1-based row of the current page
    pub fn select_row(&mut self, row: usize) -> Option<&RepositoryNode> {
        self.catch_up();
        let id = self.view.projection()?.row(row)?.id.clone();
        self.session.select(id);
        self.selected_repository()
    }

    pub fn select(&mut self, id: RepositoryId) {
        self.session.select(id);
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// Selected repository, if it is on the displayed page
    #[must_use]
    pub fn selected_repository(&self) -> Option<&RepositoryNode> {
        let id = self.session.selected()?;
        self.view.projection()?.find(id)
    }

    /// Make sure the current request is fetched or shown
    ///
    /// Does nothing if the current key is already displayed or still
    /// loading. A page already in the cache is shown without a round trip.
    pub fn refresh(&mut self) {
        let key = self.session.request_key();
        if self.settled.as_ref() == Some(&key) {
            return;
        }

        if let QueryState::Success(data) = self.cache.status(&key) {
            tracing::trace!(key = %key, "showing cached page");
            self.show_page(key, &data);
            return;
        }

        if self.view.is_loading() && self.dispatched.as_ref() == Some(&key) {
            return;
        }

        self.dispatch(key);
    }

    /// Fetch the current request again, bypassing any cached page
    pub fn retry(&mut self) {
        let key = self.session.request_key();
        self.cache.invalidate(&key);
        self.dispatch(key);
    }

    /// Apply every outcome that has already arrived
    pub fn poll(&mut self) -> &View {
        while let Some(outcome) = self.worker.try_recv() {
            self.handle_outcome(outcome);
        }
        &self.view
    }

    /// Apply outcomes until the current request settles or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> &View {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.view.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.worker.recv_timeout(remaining) {
                Some(outcome) => self.handle_outcome(outcome),
                None => break,
            }
        }
        &self.view
    }

    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    #[must_use]
    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Number of outcomes dropped for superseded requests
    #[must_use]
    pub const fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Apply whatever has arrived for the current request
    ///
    /// The page may already be in the cache before its outcome reaches the
    /// channel, so a loading view also checks the cache.
    fn catch_up(&mut self) {
        self.poll();
        if !self.view.is_loading() {
            return;
        }
        let key = self.session.request_key();
        if let QueryState::Success(data) = self.cache.status(&key) {
            self.show_page(key, &data);
        }
    }

    fn dispatch(&mut self, key: RequestKey) {
        let request = self.builder.build(&self.session.current_request_args());
        tracing::debug!(key = %key, "dispatching request");

        self.view = View::Loading;
        self.settled = None;
        if self.worker.submit(FetchJob {
            key: key.clone(),
            request,
        }) {
            self.dispatched = Some(key);
        } else {
            let error = Arc::new(ApiError::Transport("fetch workers stopped".to_string()));
            self.show_error(key, error);
        }
    }

    fn handle_outcome(&mut self, outcome: FetchOutcome) {
        let current = self.session.request_key();
        if outcome.key != current {
            tracing::debug!(key = %outcome.key, "discarding response for superseded request");
            self.discarded += 1;
            return;
        }
        tracing::debug!(key = %outcome.key, "response arrived");

        match outcome.state {
            QueryState::Success(data) => self.show_page(outcome.key, &data),
            QueryState::Error(error) => self.show_error(outcome.key, error),
            QueryState::Idle | QueryState::Loading => {}
        }
    }

    fn show_page(&mut self, key: RequestKey, data: &SearchConnection) {
        self.session.apply_page(&key, data.page_info.clone());
        let projection = self.projector.project(data, self.session.sort_state());
        self.view = View::Ready(projection);
        self.finish(key);
    }

    fn show_error(&mut self, key: RequestKey, error: Arc<ApiError>) {
        tracing::warn!(key = %key, error = %error, "search request failed");
        self.view = View::Failed {
            message: error.user_message().to_string(),
            error,
        };
        self.finish(key);
    }

    fn finish(&mut self, key: RequestKey) {
        // Whatever was in flight no longer matches the shown key
        self.dispatched = None;
        self.settled = Some(key);
    }
}
