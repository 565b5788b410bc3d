//! Column sort toggling
//!
//! Clicking the active column flips its direction; clicking another column
//! switches to it in ascending order.

use crate::query::{SortDirection, SortField, SortState};

/// Direction a column starts in when first selected
pub const FIRST_CLICK_DIRECTION: SortDirection = SortDirection::Asc;

/// Next sort state after the user asks to sort by `requested`
#[must_use]
pub fn toggle(current: SortState, requested: SortField) -> SortState {
    if current.field == requested {
        SortState::new(current.field, current.direction.flipped())
    } else {
        SortState::new(requested, FIRST_CLICK_DIRECTION)
    }
}
