//! Display ordering of result pages
//!
//! When the server already ordered a page, its order is the contract and
//! edges pass through untouched. Otherwise the page is sorted locally with a
//! stable sort, so repositories with equal keys keep their response order.

use crate::model::{PageInfo, RepositoryId, RepositoryNode, SearchConnection};
use crate::query::{OrderingStrategy, SortDirection, SortField, SortState};
use std::cmp::Ordering;

/// Ordered page ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub items: Vec<RepositoryNode>,
    pub total_count: u64,
    pub page_info: PageInfo,
    pub sort: SortState,
    /// Whether `items` were reordered locally
    pub client_sorted: bool,
}

impl Projection {
    /// Zero results is a display state, not an error
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages for `page_size`, at least 1
    #[must_use]
    pub fn page_count(&self, page_size: u32) -> u64 {
        self.total_count
            .div_ceil(u64::from(page_size.max(1)))
            .max(1)
    }

    #[must_use]
    pub fn find(&self, id: &RepositoryId) -> Option<&RepositoryNode> {
        self.items.iter().find(|node| &node.id == id)
    }

    /// Node at a 1-based row number
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&RepositoryNode> {
        row.checked_sub(1).and_then(|index| self.items.get(index))
    }
}

/// Derives display order from raw pages
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultProjector {
    strategy: OrderingStrategy,
}

impl ResultProjector {
    #[must_use]
    pub const fn new(strategy: OrderingStrategy) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub fn project(&self, connection: &SearchConnection, sort: SortState) -> Projection {
        let mut items: Vec<RepositoryNode> =
            connection.edges.iter().map(|edge| edge.node.clone()).collect();

        let client_sorted = !self.strategy.server_ordered();
        if client_sorted {
            sort_nodes(&mut items, sort);
        }

        Projection {
            items,
            total_count: connection.repository_count,
            page_info: connection.page_info.clone(),
            sort,
            client_sorted,
        }
    }
}

/// Stable in-place sort by the field and direction of `sort`
pub fn sort_nodes(nodes: &mut [RepositoryNode], sort: SortState) {
    // slice::sort_by is stable; reversing the comparator instead of the
    // result keeps ties in input order for descending sorts too.
    nodes.sort_by(|a, b| match sort.direction {
        SortDirection::Asc => compare_by(sort.field, a, b),
        SortDirection::Desc => compare_by(sort.field, b, a),
    });
}

fn compare_by(field: SortField, a: &RepositoryNode, b: &RepositoryNode) -> Ordering {
    match field {
        SortField::Stars => a.stargazer_count.cmp(&b.stargazer_count),
        SortField::Forks => a.fork_count.cmp(&b.fork_count),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}
