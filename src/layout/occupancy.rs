//! Boolean occupancy matrix of a grid

use super::error::LayoutError;
use super::types::{CellPos, CellRect};

/// Records which cells of a `count_x` x `count_y` grid are taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    count_x: i32,
    count_y: i32,
    /// Column-major: index is `x * count_y + y`
    cells: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(count_x: i32, count_y: i32) -> Self {
        let count_x = count_x.max(0);
        let count_y = count_y.max(0);
        Self {
            count_x,
            count_y,
            cells: vec![false; (count_x * count_y) as usize],
        }
    }

    pub fn count_x(&self) -> i32 {
        self.count_x
    }

    pub fn count_y(&self) -> i32 {
        self.count_y
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.count_x || y >= self.count_y {
            None
        } else {
            Some((x * self.count_y + y) as usize)
        }
    }

    /// Set every cell of `[x, x + span_x) x [y, y + span_y)` to `value`.
    ///
    /// The rectangle is clamped to the grid; a negative origin is a no-op.
    pub fn mark(&mut self, x: i32, y: i32, span_x: i32, span_y: i32, value: bool) {
        if x < 0 || y < 0 {
            return;
        }
        for cx in x..(x + span_x).min(self.count_x) {
            for cy in y..(y + span_y).min(self.count_y) {
                let i = (cx * self.count_y + cy) as usize;
                self.cells[i] = value;
            }
        }
    }

    pub fn mark_rect(&mut self, rect: &CellRect, value: bool) {
        self.mark(rect.left, rect.top, rect.width(), rect.height(), value);
    }

    /// Whether a cell is taken. Cells outside the grid are an error.
    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool, LayoutError> {
        self.index(x, y)
            .map(|i| self.cells[i])
            .ok_or_else(|| LayoutError::out_of_bounds(x, y, self.count_x, self.count_y))
    }

    /// Whether a cell is taken; cells outside the grid read as vacant
    pub(crate) fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Whether the whole region lies inside the grid and is free
    pub fn is_region_vacant(&self, x: i32, y: i32, span_x: i32, span_y: i32) -> bool {
        if x < 0 || y < 0 || x + span_x > self.count_x || y + span_y > self.count_y {
            return false;
        }
        (x..x + span_x).all(|cx| (y..y + span_y).all(|cy| !self.get(cx, cy)))
    }

    /// First top-left cell, scanning row by row from (0, 0), where the span fits
    pub fn find_first_vacant(&self, span_x: i32, span_y: i32) -> Option<CellPos> {
        if span_x < 1 || span_y < 1 {
            return None;
        }
        for y in 0..=(self.count_y - span_y) {
            for x in 0..=(self.count_x - span_x) {
                if self.is_region_vacant(x, y, span_x, span_y) {
                    return Some(CellPos::new(x, y));
                }
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    /// Overwrite this grid with the contents of another of the same size
    pub fn copy_from(&mut self, other: &OccupancyGrid) {
        debug_assert_eq!(
            (self.count_x, self.count_y),
            (other.count_x, other.count_y)
        );
        self.cells.copy_from_slice(&other.cells);
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}
