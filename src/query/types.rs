//! Query value types
//!
//! Everything needed to describe one page request against the repository
//! search: the search term, the sort order and the pagination direction.
//!
//! Pagination is an enum rather than four optional fields, so a query can
//! never carry forward and backward arguments at the same time.

use super::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest page the search API will return
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when nothing else is configured
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Column a result set can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
    /// Number of stargazers
    #[default]
    Stars,
    /// Number of forks
    Forks,
    /// Last update timestamp
    UpdatedAt,
}

impl SortField {
    /// All sortable fields, in display order
    pub const ALL: [Self; 3] = [Self::Stars, Self::Forks, Self::UpdatedAt];

    /// Enum value used by the GraphQL `orderBy` argument
    #[must_use]
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::Stars => "STARS",
            Self::Forks => "FORKS",
            Self::UpdatedAt => "UPDATED_AT",
        }
    }

    /// Name used by the `sort:` search qualifier
    #[must_use]
    pub const fn qualifier(self) -> &'static str {
        match self {
            Self::Stars => "stars",
            Self::Forks => "forks",
            Self::UpdatedAt => "updated",
        }
    }

    /// Human readable column label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stars => "Stars",
            Self::Forks => "Forks",
            Self::UpdatedAt => "Updated",
        }
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "stars" | "star" | "stargazers" => Ok(Self::Stars),
            "forks" | "fork" => Ok(Self::Forks),
            "updated" | "updated_at" | "updatedat" => Ok(Self::UpdatedAt),
            _ => Err(QueryError::UnknownSortField(s.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_graphql())
    }
}

/// Ordering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl SortDirection {
    /// The opposite direction
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Enum value used by the GraphQL `orderBy` argument
    #[must_use]
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Suffix used by the `sort:` search qualifier
    #[must_use]
    pub const fn qualifier(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_graphql())
    }
}

/// Current ordering of a result set
///
/// Always defined; defaults to most-starred first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortField::Stars, SortDirection::Desc)
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

/// Opaque pagination cursor issued by the server
///
/// Never inspected or constructed from anything but a server response;
/// it is passed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pagination arguments of one request
///
/// `Forward` maps to `first`/`after`, `Backward` to `last`/`before`.
/// The first page of a result set is `Forward` without a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pagination {
    Forward { first: u32, after: Option<Cursor> },
    Backward { last: u32, before: Option<Cursor> },
}

impl Pagination {
    /// First page of a result set
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPageSize` if `page_size` is zero or above
    /// [`MAX_PAGE_SIZE`].
    pub fn first_page(page_size: u32) -> Result<Self, QueryError> {
        Ok(Self::Forward {
            first: validate_page_size(page_size)?,
            after: None,
        })
    }

    #[must_use]
    pub const fn first(&self) -> Option<u32> {
        match self {
            Self::Forward { first, .. } => Some(*first),
            Self::Backward { .. } => None,
        }
    }

    #[must_use]
    pub const fn after(&self) -> Option<&Cursor> {
        match self {
            Self::Forward { after, .. } => after.as_ref(),
            Self::Backward { .. } => None,
        }
    }

    #[must_use]
    pub const fn last(&self) -> Option<u32> {
        match self {
            Self::Backward { last, .. } => Some(*last),
            Self::Forward { .. } => None,
        }
    }

    #[must_use]
    pub const fn before(&self) -> Option<&Cursor> {
        match self {
            Self::Backward { before, .. } => before.as_ref(),
            Self::Forward { .. } => None,
        }
    }

    /// Number of items requested, whichever direction
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        match self {
            Self::Forward { first, .. } => *first,
            Self::Backward { last, .. } => *last,
        }
    }
}

/// Validate a page size against the API limits
///
/// # Errors
///
/// Returns `QueryError::InvalidPageSize` when out of range.
pub fn validate_page_size(page_size: u32) -> Result<u32, QueryError> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        Err(QueryError::InvalidPageSize(page_size))
    } else {
        Ok(page_size)
    }
}

/// A fully specified page request
///
/// Produced only by `SearchSession::current_request_args`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub term: String,
    pub pagination: Pagination,
    pub order_by: SortState,
}

impl SearchQuery {
    #[must_use]
    pub fn new(term: impl Into<String>, pagination: Pagination, order_by: SortState) -> Self {
        Self {
            term: term.into(),
            pagination,
            order_by,
        }
    }
}
