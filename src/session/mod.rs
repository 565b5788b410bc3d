//! Search session state
//!
//! The session owns everything the user has committed to: the search term,
//! the sort order, the pagination cursor and the selected row. It is the only
//! producer of `SearchQuery` values.
//!
//! ```no_run
//! use reposcout::query::SortField;
//! use reposcout::session::SearchSession;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = SearchSession::builder()
//!     .term("react")
//!     .page_size(10)
//!     .build()?;
//!
//! session.sort(SortField::Forks);
//! let args = session.current_request_args();
//! # Ok(())
//! # }
//! ```
//!
//! # State rules
//!
//! - Committing a new term or sort order resets the cursor to `Initial`,
//!   clears the selection and forgets the last `PageInfo`
//! - Paging uses only the `PageInfo` applied for the current request key
//! - Paging forgets that `PageInfo` until the next page arrives, so repeated
//!   clicks before a response cannot replay a stale cursor

pub mod cursor;
pub mod sort;

pub use cursor::{CursorController, CursorDirection, CursorState};
pub use sort::{FIRST_CLICK_DIRECTION, toggle};

use crate::model::{PageInfo, RepositoryId};
use crate::query::{
    DEFAULT_FALLBACK_TERM, DEFAULT_PAGE_SIZE, QueryError, RequestKey, SearchQuery, SortField,
    SortState, normalize_term, validate_page_size,
};

/// Snapshot of the session for display and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub committed_term: String,
    pub sort: SortState,
    pub cursor: CursorState,
    pub selected_id: Option<RepositoryId>,
    pub page_number: u32,
}

/// Stateful search session
///
/// Use `SearchSession::builder()` to construct.
#[derive(Debug, Clone)]
pub struct SearchSession {
    committed_term: String,
    fallback_term: String,
    page_size: u32,
    sort: SortState,
    cursor: CursorController,
    selected: Option<RepositoryId>,
    page_info: Option<PageInfo>,
    page_number: u32,
}

impl SearchSession {
    /// Create a new builder for constructing a `SearchSession`
    #[must_use]
    pub fn builder() -> SearchSessionBuilder {
        SearchSessionBuilder::new()
    }

    /// Commit a new search term
    ///
    /// The term is trimmed and a blank term becomes the fallback term.
    /// Returns `false` without touching any state when the normalized term
    /// is already committed.
    pub fn submit(&mut self, raw_term: &str) -> bool {
        let term = normalize_term(raw_term, &self.fallback_term);
        if term == self.committed_term {
            return false;
        }

        tracing::debug!(term = %term, "committing search term");
        self.committed_term = term;
        self.cursor.on_new_search();
        self.restart_result_set();
        true
    }

    /// Sort by `field`, flipping direction if it is already active
    pub fn sort(&mut self, field: SortField) -> SortState {
        self.sort = toggle(self.sort, field);
        tracing::debug!(sort = %self.sort, "sort changed");
        self.cursor.on_sort_change();
        self.restart_result_set();
        self.sort
    }

    /// Advance to the next page
    ///
    /// No-op returning `false` unless the current page reported
    /// `hasNextPage`.
    pub fn next_page(&mut self) -> bool {
        let Some(info) = &self.page_info else {
            return false;
        };
        if !self.cursor.on_next_page(info) {
            return false;
        }
        self.page_info = None;
        self.page_number = self.page_number.saturating_add(1);
        true
    }

    /// Go back to the previous page
    ///
    /// No-op returning `false` unless the current page reported
    /// `hasPreviousPage`.
    pub fn prev_page(&mut self) -> bool {
        let Some(info) = &self.page_info else {
            return false;
        };
        if !self.cursor.on_prev_page(info) {
            return false;
        }
        self.page_info = None;
        self.page_number = self.page_number.saturating_sub(1).max(1);
        true
    }

    pub fn select(&mut self, id: RepositoryId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Arguments for the request the session currently wants
    #[must_use]
    pub fn current_request_args(&self) -> SearchQuery {
        SearchQuery::new(
            self.committed_term.clone(),
            self.cursor.pagination(self.page_size),
            self.sort,
        )
    }

    /// Canonical key of [`Self::current_request_args`]
    #[must_use]
    pub fn request_key(&self) -> RequestKey {
        RequestKey::from_query(&self.current_request_args())
    }

    /// Record the `PageInfo` of a page that arrived for `key`
    ///
    /// Ignored (returns `false`) when `key` is no longer the current request.
    pub fn apply_page(&mut self, key: &RequestKey, page_info: PageInfo) -> bool {
        if *key != self.request_key() {
            tracing::debug!(key = %key, "ignoring page info for superseded request");
            return false;
        }
        self.page_info = Some(page_info);
        true
    }

    #[must_use]
    pub fn committed_term(&self) -> &str {
        &self.committed_term
    }

    #[must_use]
    pub const fn sort_state(&self) -> SortState {
        self.sort
    }

    #[must_use]
    pub const fn cursor(&self) -> &CursorState {
        self.cursor.state()
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&RepositoryId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn page_info(&self) -> Option<&PageInfo> {
        self.page_info.as_ref()
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// 1-based position of the current page
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.page_info.as_ref().is_some_and(|i| i.has_next_page)
    }

    #[must_use]
    pub fn can_go_prev(&self) -> bool {
        self.page_info.as_ref().is_some_and(|i| i.has_previous_page)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState {
            committed_term: self.committed_term.clone(),
            sort: self.sort,
            cursor: self.cursor.state().clone(),
            selected_id: self.selected.clone(),
            page_number: self.page_number,
        }
    }

    fn restart_result_set(&mut self) {
        self.selected = None;
        self.page_info = None;
        self.page_number = 1;
    }
}

/// Builder for `SearchSession`
pub struct SearchSessionBuilder {
    term: Option<String>,
    fallback_term: String,
    page_size: u32,
    sort: SortState,
}

impl SearchSessionBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: None,
            fallback_term: DEFAULT_FALLBACK_TERM.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortState::default(),
        }
    }

    /// Initial search term (defaults to the fallback term)
    #[must_use]
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Term used whenever a blank term is submitted
    #[must_use]
    pub fn fallback_term(mut self, term: impl Into<String>) -> Self {
        self.fallback_term = term.into();
        self
    }

    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    /// Build the `SearchSession`
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPageSize` if the page size is out of range.
    pub fn build(self) -> Result<SearchSession, QueryError> {
        let page_size = validate_page_size(self.page_size)?;
        let fallback_term = normalize_term(&self.fallback_term, DEFAULT_FALLBACK_TERM);
        let committed_term = normalize_term(self.term.as_deref().unwrap_or(""), &fallback_term);

        Ok(SearchSession {
            committed_term,
            fallback_term,
            page_size,
            sort: self.sort,
            cursor: CursorController::new(),
            selected: None,
            page_info: None,
            page_number: 1,
        })
    }
}

impl Default for SearchSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
