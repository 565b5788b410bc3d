//! Search query model and request construction
//!
//! - `types`: Sort state, cursors, pagination and the `SearchQuery` value
//! - `builder`: Turns a `SearchQuery` into a GraphQL request
//! - `key`: Canonical `RequestKey` used for caching and dedup
//! - `error`: Query-construction errors

pub mod builder;
pub mod error;
pub mod key;
pub mod types;

pub use builder::{
    DEFAULT_FALLBACK_TERM, GraphQlRequest, OrderingStrategy, QueryBuilder, normalize_term,
};
pub use error::QueryError;
pub use key::RequestKey;
pub use types::{
    Cursor, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination, SearchQuery, SortDirection, SortField,
    SortState, validate_page_size,
};
