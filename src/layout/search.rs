//! Spatial search over an occupancy grid
//!
//! Two families live here. [`AreaSearch`] answers pixel-space questions from
//! the drag controller ("which cell is nearest to the finger?"). The free
//! functions at the bottom work purely in cell space and are what the
//! displacement solver uses to relocate blocks of items.

use super::direction::{compute_direction_vector, Direction};
use super::geometry::CellMetrics;
use super::occupancy::OccupancyGrid;
use super::types::{CellPos, CellRect, CellSpan, PixelPoint};

/// Best region found by a nearest-area search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaMatch {
    /// Top-left cell of the region
    pub cell: CellPos,
    /// Size of the region; may be smaller than requested when shrinking is allowed
    pub span: CellSpan,
}

/// Pixel-space nearest-area queries against one occupancy grid
#[derive(Debug, Clone, Copy)]
pub struct AreaSearch<'a> {
    grid: &'a OccupancyGrid,
    metrics: &'a CellMetrics,
    ignore: Option<CellRect>,
}

impl<'a> AreaSearch<'a> {
    pub fn new(grid: &'a OccupancyGrid, metrics: &'a CellMetrics) -> Self {
        Self {
            grid,
            metrics,
            ignore: None,
        }
    }

    /// Treat the cells of `rect` as vacant, e.g. the footprint of the item being dragged
    pub fn ignoring(mut self, rect: Option<CellRect>) -> Self {
        self.ignore = rect;
        self
    }

    fn blocked(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y) && !self.ignore.is_some_and(|r| r.contains_cell(x, y))
    }

    /// Find the region nearest to a pixel point.
    ///
    /// `pixel` is the center of the item; it is shifted to the top-left cell
    /// convention before scoring so spans larger than one cell search
    /// correctly. Candidates are scored by pixel distance from that point to
    /// the center of their top-left cell.
    ///
    /// With `ignore_occupied` any top-left cell is a candidate. Otherwise a
    /// candidate must have `min_span` vacant cells, and is then grown
    /// alternately in x and y toward `span`. A grown region that lies inside
    /// an earlier candidate is dominated and skipped; one that contains the
    /// current best replaces it regardless of distance.
    pub fn nearest_area(
        &self,
        pixel: PixelPoint,
        min_span: CellSpan,
        span: CellSpan,
        ignore_occupied: bool,
    ) -> Option<AreaMatch> {
        if !min_span.is_valid() || !span.is_valid() || span.x < min_span.x || span.y < min_span.y
        {
            return None;
        }

        let m = self.metrics;
        let pixel_x =
            (pixel.x as f32 - (m.cell_width + m.width_gap) as f32 * (span.x - 1) as f32 / 2.0)
                as i32;
        let pixel_y =
            (pixel.y as f32 - (m.cell_height + m.height_gap) as f32 * (span.y - 1) as f32 / 2.0)
                as i32;

        let count_x = self.grid.count_x();
        let count_y = self.grid.count_y();

        let mut best: Option<AreaMatch> = None;
        let mut best_distance = f64::MAX;
        let mut best_rect = CellRect::new(-1, -1, -1, -1);
        let mut valid_regions: Vec<CellRect> = Vec::new();

        for y in 0..count_y - (min_span.y - 1) {
            'inner: for x in 0..count_x - (min_span.x - 1) {
                let (region, found_span) = if ignore_occupied {
                    // Degenerate rect: never dominates and is never dominated
                    (CellRect::new(x, y, x - 1, y - 1), span)
                } else {
                    for i in 0..min_span.x {
                        for j in 0..min_span.y {
                            if self.blocked(x + i, y + j) {
                                continue 'inner;
                            }
                        }
                    }
                    let grown = self.grow_region(x, y, min_span, span);
                    (CellRect::from_cells(x, y, grown.x, grown.y), grown)
                };

                let center = m.cell_to_center_point(x, y);
                let contained = valid_regions.iter().any(|r| r.contains(&region));
                valid_regions.push(region);

                let distance = (((center.x - pixel_x) as f64).powi(2)
                    + ((center.y - pixel_y) as f64).powi(2))
                .sqrt();

                if (distance <= best_distance && !contained) || region.contains(&best_rect) {
                    best_distance = distance;
                    best_rect = region;
                    best = Some(AreaMatch {
                        cell: CellPos::new(x, y),
                        span: found_span,
                    });
                }
            }
        }

        best
    }

    /// Grow a vacant `min_span` region at (x, y) toward `span`, alternating axes
    fn grow_region(&self, x: i32, y: i32, min_span: CellSpan, span: CellSpan) -> CellSpan {
        let count_x = self.grid.count_x();
        let count_y = self.grid.count_y();
        let mut x_size = min_span.x;
        let mut y_size = min_span.y;

        let mut inc_x = true;
        let mut hit_max_x = x_size >= span.x;
        let mut hit_max_y = y_size >= span.y;
        while !(hit_max_x && hit_max_y) {
            if inc_x && !hit_max_x {
                for j in 0..y_size {
                    if x + x_size > count_x - 1 || self.blocked(x + x_size, y + j) {
                        hit_max_x = true;
                    }
                }
                if !hit_max_x {
                    x_size += 1;
                }
            } else if !hit_max_y {
                for i in 0..x_size {
                    if y + y_size > count_y - 1 || self.blocked(x + i, y + y_size) {
                        hit_max_y = true;
                    }
                }
                if !hit_max_y {
                    y_size += 1;
                }
            }
            hit_max_x |= x_size >= span.x;
            hit_max_y |= y_size >= span.y;
            inc_x = !inc_x;
        }
        CellSpan::new(x_size, y_size)
    }

    /// Nearest fully vacant region of exactly `span`
    pub fn nearest_vacant_area(&self, pixel: PixelPoint, span: CellSpan) -> Option<CellPos> {
        self.nearest_area(pixel, span, span, false).map(|m| m.cell)
    }

    /// Nearest vacant region of at least `min_span`, as large as possible up to `span`
    pub fn nearest_vacant_area_shrinking(
        &self,
        pixel: PixelPoint,
        min_span: CellSpan,
        span: CellSpan,
    ) -> Option<AreaMatch> {
        self.nearest_area(pixel, min_span, span, false)
    }

    /// Nearest top-left cell for `span`, occupied or not
    pub fn nearest_area_ignore_occupied(
        &self,
        pixel: PixelPoint,
        span: CellSpan,
    ) -> Option<CellPos> {
        self.nearest_area(pixel, span, span, true).map(|m| m.cell)
    }

    /// First vacant region of `span`, scanning row by row.
    ///
    /// When `intersect` is given, regions covering that cell are preferred;
    /// if none is vacant the scan is repeated without the requirement.
    pub fn cell_for_span_that_intersects(
        &self,
        span: CellSpan,
        intersect: Option<CellPos>,
    ) -> Option<CellPos> {
        if !span.is_valid() {
            return None;
        }
        let count_x = self.grid.count_x();
        let count_y = self.grid.count_y();
        let mut intersect = intersect;
        let mut found = None;

        loop {
            let mut start_x = 0;
            let mut end_x = count_x - (span.x - 1);
            let mut start_y = 0;
            let mut end_y = count_y - (span.y - 1);
            if let Some(cell) = intersect {
                start_x = start_x.max(cell.x - (span.x - 1));
                end_x = end_x.min(cell.x + (span.x - 1) + i32::from(span.x == 1));
                start_y = start_y.max(cell.y - (span.y - 1));
                end_y = end_y.min(cell.y + (span.y - 1) + i32::from(span.y == 1));
            }

            let mut y = start_y;
            while y < end_y && found.is_none() {
                let mut x = start_x;
                'inner: while x < end_x {
                    for i in 0..span.x {
                        for j in 0..span.y {
                            if self.blocked(x + i, y + j) {
                                // Skip past the column that blocked us
                                x += i + 1;
                                continue 'inner;
                            }
                        }
                    }
                    found = Some(CellPos::new(x, y));
                    break;
                }
                y += 1;
            }

            if intersect.is_none() || found.is_some() {
                break;
            }
            intersect = None;
        }
        found
    }

    /// First vacant region of `span`
    pub fn cell_for_span(&self, span: CellSpan) -> Option<CellPos> {
        self.cell_for_span_that_intersects(span, None)
    }
}

/// Whether the region at (x, y) collides with the grid. With a `block` mask,
/// only cells the moving block actually fills count, so interlocking shapes
/// may slide past each other.
fn collides(
    grid: &OccupancyGrid,
    x: i32,
    y: i32,
    span: CellSpan,
    block: Option<&OccupancyGrid>,
) -> bool {
    (0..span.x).any(|i| {
        (0..span.y).any(|j| grid.get(x + i, y + j) && block.map_or(true, |b| b.get(i, j)))
    })
}

/// Nearest free position for a region of `span` currently at `origin`.
///
/// Distance is measured in cells. Equally distant candidates are ranked by
/// how well their offset agrees with `direction`.
pub fn nearest_cell_area(
    grid: &OccupancyGrid,
    origin: CellPos,
    span: CellSpan,
    direction: Direction,
    block: Option<&OccupancyGrid>,
) -> Option<CellPos> {
    let mut best = None;
    let mut best_distance = f32::MAX;
    let mut best_score = i32::MIN;

    for y in 0..grid.count_y() - (span.y - 1) {
        for x in 0..grid.count_x() - (span.x - 1) {
            if collides(grid, x, y, span, block) {
                continue;
            }
            let dx = x - origin.x;
            let dy = y - origin.y;
            let distance = ((dx * dx + dy * dy) as f64).sqrt() as f32;
            let score = direction.dot(&compute_direction_vector(dx as f32, dy as f32));

            if distance < best_distance || (distance == best_distance && score > best_score) {
                best_distance = distance;
                best_score = score;
                best = Some(CellPos::new(x, y));
            }
        }
    }
    best
}

/// Nearest free position reached by marching from `origin` along an axis-aligned `direction`.
///
/// Diagonal or zero directions never match.
pub fn nearest_area_in_direction(
    grid: &OccupancyGrid,
    origin: CellPos,
    span: CellSpan,
    direction: Direction,
    block: Option<&OccupancyGrid>,
) -> Option<CellPos> {
    if !direction.is_axis_aligned() {
        return None;
    }

    let mut x = origin.x + direction.dx;
    let mut y = origin.y + direction.dy;
    while x >= 0 && x + span.x <= grid.count_x() && y >= 0 && y + span.y <= grid.count_y() {
        if !collides(grid, x, y, span, block) {
            return Some(CellPos::new(x, y));
        }
        x += direction.dx;
        y += direction.dy;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(count_x: i32, count_y: i32) -> CellMetrics {
        CellMetrics {
            count_x,
            count_y,
            cell_width: 100,
            cell_height: 100,
            width_gap: 0,
            height_gap: 0,
            padding_left: 0,
            padding_top: 0,
        }
    }

    #[test]
    fn test_nearest_vacant_area_skips_occupied() {
        let m = metrics(4, 4);
        let mut grid = OccupancyGrid::new(4, 4);
        grid.mark(1, 1, 1, 1, true);
        let search = AreaSearch::new(&grid, &m);

        // Finger over (1, 1), which is taken
        let cell = search
            .nearest_vacant_area(PixelPoint::new(150, 150), CellSpan::unit())
            .unwrap();
        assert_ne!(cell, CellPos::new(1, 1));
        let center = m.cell_to_center_point(cell.x, cell.y);
        assert_eq!(
            ((center.x - 150).abs() + (center.y - 150).abs()),
            100,
            "expected an orthogonal neighbor, got {:?}",
            cell
        );
    }

    #[test]
    fn test_center_convention_for_large_spans() {
        let m = metrics(4, 4);
        let grid = OccupancyGrid::new(4, 4);
        let search = AreaSearch::new(&grid, &m);
        // Center of the 2x2 region starting at (2, 2)
        let cell = search
            .nearest_vacant_area(PixelPoint::new(300, 300), CellSpan::new(2, 2))
            .unwrap();
        assert_eq!(cell, CellPos::new(2, 2));
    }

    #[test]
    fn test_ignore_occupied_returns_nearest_cell() {
        let m = metrics(4, 4);
        let mut grid = OccupancyGrid::new(4, 4);
        grid.mark(0, 0, 4, 4, true);
        let search = AreaSearch::new(&grid, &m);
        assert_eq!(
            search.nearest_area_ignore_occupied(PixelPoint::new(250, 50), CellSpan::unit()),
            Some(CellPos::new(2, 0))
        );
        assert_eq!(
            search.nearest_vacant_area(PixelPoint::new(250, 50), CellSpan::unit()),
            None
        );
    }

    #[test]
    fn test_shrinking_search_grows_to_fit() {
        let m = metrics(4, 4);
        let mut grid = OccupancyGrid::new(4, 4);
        // Leave a 2x4 free column pair on the right
        grid.mark(0, 0, 2, 4, true);
        let search = AreaSearch::new(&grid, &m);
        let found = search
            .nearest_vacant_area_shrinking(
                PixelPoint::new(300, 200),
                CellSpan::new(1, 1),
                CellSpan::new(3, 3),
            )
            .unwrap();
        assert_eq!(found.span, CellSpan::new(2, 3));
        assert_eq!(found.cell.x, 2);
    }

    #[test]
    fn test_invalid_spans_find_nothing() {
        let m = metrics(4, 4);
        let grid = OccupancyGrid::new(4, 4);
        let search = AreaSearch::new(&grid, &m);
        let p = PixelPoint::new(0, 0);
        assert!(search.nearest_area(p, CellSpan::new(0, 1), CellSpan::unit(), false).is_none());
        assert!(search
            .nearest_area(p, CellSpan::new(2, 2), CellSpan::unit(), false)
            .is_none());
        assert!(search.nearest_vacant_area(p, CellSpan::new(5, 1)).is_none());
    }

    #[test]
    fn test_ignoring_rect_frees_cells() {
        let m = metrics(2, 1);
        let mut grid = OccupancyGrid::new(2, 1);
        grid.mark(0, 0, 2, 1, true);
        let search = AreaSearch::new(&grid, &m).ignoring(Some(CellRect::from_cells(1, 0, 1, 1)));
        assert_eq!(search.cell_for_span(CellSpan::unit()), Some(CellPos::new(1, 0)));
    }

    #[test]
    fn test_cell_for_span_prefers_intersection() {
        let m = metrics(4, 4);
        let grid = OccupancyGrid::new(4, 4);
        let search = AreaSearch::new(&grid, &m);
        assert_eq!(
            search.cell_for_span_that_intersects(CellSpan::new(2, 1), Some(CellPos::new(3, 2))),
            Some(CellPos::new(2, 2))
        );
        assert_eq!(search.cell_for_span(CellSpan::new(2, 1)), Some(CellPos::new(0, 0)));
    }

    #[test]
    fn test_cell_for_span_falls_back_when_intersection_is_full() {
        let m = metrics(4, 4);
        let mut grid = OccupancyGrid::new(4, 4);
        grid.mark(0, 2, 4, 1, true);
        let search = AreaSearch::new(&grid, &m);
        assert_eq!(
            search.cell_for_span_that_intersects(CellSpan::unit(), Some(CellPos::new(1, 2))),
            Some(CellPos::new(0, 0))
        );
    }

    #[test]
    fn test_nearest_cell_area_breaks_ties_by_direction() {
        let mut grid = OccupancyGrid::new(3, 3);
        grid.mark(1, 1, 1, 1, true);
        // Cells left, right, above and below (1, 1) are all at distance 1
        let down = nearest_cell_area(&grid, CellPos::new(1, 1), CellSpan::unit(), Direction::DOWN, None);
        assert_eq!(down, Some(CellPos::new(1, 2)));
        let left = nearest_cell_area(&grid, CellPos::new(1, 1), CellSpan::unit(), Direction::LEFT, None);
        assert_eq!(left, Some(CellPos::new(0, 1)));
    }

    #[test]
    fn test_block_mask_allows_interlocking() {
        // An L-shaped block whose empty corner can sit on an occupied cell
        let mut grid = OccupancyGrid::new(3, 3);
        grid.mark(2, 2, 1, 1, true);
        let mut block = OccupancyGrid::new(2, 2);
        block.mark(0, 0, 2, 1, true);
        block.mark(0, 1, 1, 1, true);
        assert!(!collides(&grid, 1, 1, CellSpan::new(2, 2), Some(&block)));
        assert!(collides(&grid, 1, 1, CellSpan::new(2, 2), None));
    }

    #[test]
    fn test_nearest_area_in_direction() {
        let mut grid = OccupancyGrid::new(1, 4);
        grid.mark(0, 2, 1, 1, true);
        assert_eq!(
            nearest_area_in_direction(&grid, CellPos::new(0, 0), CellSpan::unit(), Direction::DOWN, None),
            Some(CellPos::new(0, 1))
        );
        assert_eq!(
            nearest_area_in_direction(&grid, CellPos::new(0, 1), CellSpan::new(1, 2), Direction::DOWN, None),
            None
        );
        assert_eq!(
            nearest_area_in_direction(&grid, CellPos::new(0, 0), CellSpan::unit(), Direction::new(1, 1), None),
            None
        );
    }
}
