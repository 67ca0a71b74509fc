//! Projection between cell coordinates and the host's pixel space
//!
//! The solver works in cells; the drag controller reports pixels. These
//! conversions are the only place the two meet.

use super::types::{CellSpan, PixelPoint, PixelRect};

/// Pixel metrics of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    pub count_x: i32,
    pub count_y: i32,
    pub cell_width: i32,
    pub cell_height: i32,
    pub width_gap: i32,
    pub height_gap: i32,
    pub padding_left: i32,
    pub padding_top: i32,
}

impl CellMetrics {
    /// Upper-left pixel of a cell
    pub fn cell_to_point(&self, cell_x: i32, cell_y: i32) -> PixelPoint {
        PixelPoint::new(
            self.padding_left + cell_x * (self.cell_width + self.width_gap),
            self.padding_top + cell_y * (self.cell_height + self.height_gap),
        )
    }

    /// Center pixel of a single cell
    pub fn cell_to_center_point(&self, cell_x: i32, cell_y: i32) -> PixelPoint {
        self.region_to_center_point(cell_x, cell_y, 1, 1)
    }

    /// Center pixel of a region of cells
    pub fn region_to_center_point(
        &self,
        cell_x: i32,
        cell_y: i32,
        span_x: i32,
        span_y: i32,
    ) -> PixelPoint {
        let origin = self.cell_to_point(cell_x, cell_y);
        PixelPoint::new(
            origin.x + (span_x * self.cell_width + (span_x - 1) * self.width_gap) / 2,
            origin.y + (span_y * self.cell_height + (span_y - 1) * self.height_gap) / 2,
        )
    }

    /// Pixel bounds of a region of cells
    pub fn region_to_rect(&self, cell_x: i32, cell_y: i32, span_x: i32, span_y: i32) -> PixelRect {
        let origin = self.cell_to_point(cell_x, cell_y);
        let size = self.cell_spans_to_size(span_x, span_y);
        PixelRect::new(origin.x, origin.y, origin.x + size.0, origin.y + size.1)
    }

    /// Pixel size of a span, gaps included
    pub fn cell_spans_to_size(&self, span_x: i32, span_y: i32) -> (i32, i32) {
        (
            span_x * self.cell_width + (span_x - 1) * self.width_gap,
            span_y * self.cell_height + (span_y - 1) * self.height_gap,
        )
    }

    /// Span needed to always fit a pixel size, rounding up against the smaller cell side
    pub fn rect_to_cell(&self, width: i32, height: i32) -> CellSpan {
        let smaller = self.cell_width.min(self.cell_height).max(1) as f32;
        CellSpan::new(
            (width as f32 / smaller).ceil() as i32,
            (height as f32 / smaller).ceil() as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::GridConfig;

    fn metrics() -> CellMetrics {
        CellMetrics {
            count_x: 4,
            count_y: 5,
            cell_width: 80,
            cell_height: 100,
            width_gap: 10,
            height_gap: 20,
            padding_left: 5,
            padding_top: 8,
        }
    }

    #[test]
    fn test_region_center() {
        let m = metrics();
        assert_eq!(m.cell_to_center_point(0, 0), PixelPoint::new(45, 58));
        // 2x1 region at (1, 2): origin (95, 248), size (170, 100)
        assert_eq!(m.region_to_center_point(1, 2, 2, 1), PixelPoint::new(180, 298));
    }

    #[test]
    fn test_region_rect() {
        let r = metrics().region_to_rect(1, 1, 2, 2);
        assert_eq!(r, PixelRect::new(95, 128, 265, 348));
    }

    #[test]
    fn test_rect_to_cell_rounds_up() {
        let m = metrics();
        assert_eq!(m.rect_to_cell(80, 80), CellSpan::new(1, 1));
        assert_eq!(m.rect_to_cell(81, 250), CellSpan::new(2, 4));
    }

    #[test]
    fn test_zero_sized_cells() {
        let m = GridConfig::new()
            .with_grid_size(3, 2)
            .with_cell_size(0, 0)
            .metrics();
        assert_eq!(m.rect_to_cell(50, 50), CellSpan::new(50, 50));
        assert_eq!(m.region_to_center_point(2, 1, 1, 1), PixelPoint::new(0, 0));
    }
}
