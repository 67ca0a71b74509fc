//! Error types for the cell layout

use thiserror::Error;

use super::types::{CellAndSpan, ItemId};

/// Errors raised by explicit queries and item bookkeeping.
///
/// Failing to find room for a drop is not an error; the solver reports it
/// through `ItemConfiguration::is_solution` and `Option` results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A cell query outside the grid
    #[error("cell ({x}, {y}) exceeds the bounds of a {count_x}x{count_y} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        count_x: i32,
        count_y: i32,
    },

    /// A span of zero or fewer cells
    #[error("invalid span {span_x}x{span_y} for item {id}")]
    InvalidSpan { id: ItemId, span_x: i32, span_y: i32 },

    /// An item placed partly outside the grid
    #[error("item {id} at {placement} does not fit a {count_x}x{count_y} grid")]
    OutsideGrid {
        id: ItemId,
        placement: CellAndSpan,
        count_x: i32,
        count_y: i32,
    },

    /// An item id that is already on the grid
    #[error("item {0} is already on this grid")]
    DuplicateItem(ItemId),

    /// An item id that is not on the grid
    #[error("item {0} is not on this grid")]
    UnknownItem(ItemId),

    /// An item whose cells are already taken
    #[error("item {id} at {placement} overlaps an occupied cell")]
    Overlap { id: ItemId, placement: CellAndSpan },
}

impl LayoutError {
    /// Create an out of bounds error
    pub fn out_of_bounds(x: i32, y: i32, count_x: i32, count_y: i32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            count_x,
            count_y,
        }
    }

    /// The item this error is about, if any
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::InvalidSpan { id, .. } => Some(*id),
            Self::OutsideGrid { id, .. } => Some(*id),
            Self::DuplicateItem(id) | Self::UnknownItem(id) => Some(*id),
            Self::Overlap { id, .. } => Some(*id),
            Self::OutOfBounds { .. } => None,
        }
    }
}
