//! Pagination cursor state machine
//!
//! ```text
//!            on_new_search / on_sort_change
//!     ┌──────────────────────────────────────────┐
//!     ↓                                          │
//!  Initial ──on_next_page──→ Forward { after } ──┤
//!     │                        ↑    │            │
//!     │               next_page│    │prev_page   │
//!     │                        │    ↓            │
//!     └──on_prev_page──→ Backward { before } ────┘
//! ```
//!
//! Cursors only ever come from the `PageInfo` of the page currently on
//! screen. Navigation is refused when the server says there is nothing in
//! that direction, or when it did not send the boundary cursor.

use crate::model::PageInfo;
use crate::query::{Cursor, Pagination};

/// Which way the last navigation went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    Initial,
    Forward,
    Backward,
}

/// Position within a result set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CursorState {
    /// First page, no cursor
    #[default]
    Initial,
    /// Page after `after`
    Forward { after: Cursor },
    /// Page before `before`
    Backward { before: Cursor },
}

impl CursorState {
    #[must_use]
    pub const fn direction(&self) -> CursorDirection {
        match self {
            Self::Initial => CursorDirection::Initial,
            Self::Forward { .. } => CursorDirection::Forward,
            Self::Backward { .. } => CursorDirection::Backward,
        }
    }

    #[must_use]
    pub const fn after(&self) -> Option<&Cursor> {
        match self {
            Self::Forward { after } => Some(after),
            _ => None,
        }
    }

    #[must_use]
    pub const fn before(&self) -> Option<&Cursor> {
        match self {
            Self::Backward { before } => Some(before),
            _ => None,
        }
    }
}

/// Holds the cursor of the current result set
#[derive(Debug, Clone, Default)]
pub struct CursorController {
    state: CursorState,
}

impl CursorController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &CursorState {
        &self.state
    }

    /// A different term was committed
    pub fn on_new_search(&mut self) {
        self.reset();
    }

    /// The ordering changed; old cursors point into a different sequence
    pub fn on_sort_change(&mut self) {
        self.reset();
    }

    /// Move past the end of `page_info`'s page
    ///
    /// Returns `false` and leaves state untouched when there is no next page.
    pub fn on_next_page(&mut self, page_info: &PageInfo) -> bool {
        match (&page_info.end_cursor, page_info.has_next_page) {
            (Some(end), true) => {
                self.state = CursorState::Forward { after: end.clone() };
                true
            }
            _ => false,
        }
    }

    /// Move before the start of `page_info`'s page
    ///
    /// Returns `false` and leaves state untouched when there is no previous page.
    pub fn on_prev_page(&mut self, page_info: &PageInfo) -> bool {
        match (&page_info.start_cursor, page_info.has_previous_page) {
            (Some(start), true) => {
                self.state = CursorState::Backward {
                    before: start.clone(),
                };
                true
            }
            _ => false,
        }
    }

    /// Pagination arguments for the next request
    #[must_use]
    pub fn pagination(&self, page_size: u32) -> Pagination {
        match &self.state {
            CursorState::Initial => Pagination::Forward {
                first: page_size,
                after: None,
            },
            CursorState::Forward { after } => Pagination::Forward {
                first: page_size,
                after: Some(after.clone()),
            },
            CursorState::Backward { before } => Pagination::Backward {
                last: page_size,
                before: Some(before.clone()),
            },
        }
    }

    fn reset(&mut self) {
        self.state = CursorState::Initial;
    }
}
