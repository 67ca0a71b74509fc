//! Plain-text projection of a grid
//!
//! Each cell prints as the label of the item displayed over it, or `.` when
//! empty. Labels are the item id in base 36; items that can never be
//! displaced print upper-case.

use crate::layout::{CellAndSpan, CellLayout, ItemId};

/// Character used for an item's cells
pub fn item_label(id: ItemId, can_reorder: bool) -> char {
    let label = std::char::from_digit((id.0 % 36) as u32, 36).unwrap_or('?');
    if can_reorder {
        label
    } else {
        label.to_ascii_uppercase()
    }
}

/// Render every item at its displayed placement
pub fn render_grid(layout: &CellLayout) -> String {
    render_grid_with_overlay(layout, None)
}

/// Render the grid with an extra item drawn on top, e.g. one being dragged in
pub fn render_grid_with_overlay(
    layout: &CellLayout,
    overlay: Option<(ItemId, CellAndSpan)>,
) -> String {
    let width = layout.count_x().max(0) as usize;
    let height = layout.count_y().max(0) as usize;
    let mut cells = vec![vec!['.'; width]; height];

    let mut paint = |placement: CellAndSpan, label: char| {
        for y in placement.y..placement.y + placement.span_y {
            for x in placement.x..placement.x + placement.span_x {
                if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                    cells[y as usize][x as usize] = label;
                }
            }
        }
    };

    for item in layout.items() {
        paint(item.displayed(), item_label(item.id(), item.can_reorder()));
    }
    if let Some((id, placement)) = overlay {
        paint(placement, item_label(id, true));
    }

    cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
