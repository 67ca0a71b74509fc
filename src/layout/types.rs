//! Core types for the cell layout

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::CellMetrics;

/// Stable identifier of an item placed on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a footprint, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSpan {
    pub x: i32,
    pub y: i32,
}

impl CellSpan {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The 1x1 footprint of icons and folders
    pub fn unit() -> Self {
        Self::new(1, 1)
    }

    pub fn area(&self) -> i32 {
        self.x * self.y
    }

    /// Both components are at least one cell
    pub fn is_valid(&self) -> bool {
        self.x >= 1 && self.y >= 1
    }
}

/// A half-open rectangle of cells: `[left, right) x [top, bottom)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CellRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering `span` cells starting at `(x, y)`
    pub fn from_cells(x: i32, y: i32, span_x: i32, span_y: i32) -> Self {
        Self::new(x, y, x + span_x, y + span_y)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Check if this rectangle shares at least one cell with another
    pub fn intersects(&self, other: &CellRect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Check if `other` lies entirely inside this rectangle.
    ///
    /// An empty rectangle contains nothing.
    pub fn contains(&self, other: &CellRect) -> bool {
        !self.is_empty()
            && self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Grow this rectangle to also cover `other`. Empty rectangles are ignored.
    pub fn union(&mut self, other: &CellRect) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
    }

    /// Translate by a cell delta
    pub fn offset(&mut self, dx: i32, dy: i32) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    pub fn origin(&self) -> CellPos {
        CellPos::new(self.left, self.top)
    }

    pub fn span(&self) -> CellSpan {
        CellSpan::new(self.width(), self.height())
    }
}

/// Snapshot of an item's placement inside a proposed configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAndSpan {
    pub x: i32,
    pub y: i32,
    pub span_x: i32,
    pub span_y: i32,
}

impl CellAndSpan {
    pub fn new(x: i32, y: i32, span_x: i32, span_y: i32) -> Self {
        Self {
            x,
            y,
            span_x,
            span_y,
        }
    }

    pub fn at(cell: CellPos, span: CellSpan) -> Self {
        Self::new(cell.x, cell.y, span.x, span.y)
    }

    pub fn rect(&self) -> CellRect {
        CellRect::from_cells(self.x, self.y, self.span_x, self.span_y)
    }

    pub fn cell(&self) -> CellPos {
        CellPos::new(self.x, self.y)
    }

    pub fn span(&self) -> CellSpan {
        CellSpan::new(self.span_x, self.span_y)
    }
}

impl fmt::Display for CellAndSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.span_x, self.span_y
        )
    }
}

/// A point in the grid's pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A half-open pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> i32 {
        (self.left + self.right) >> 1
    }

    pub fn center_y(&self) -> i32 {
        (self.top + self.bottom) >> 1
    }

    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.center_x(), self.center_y())
    }
}

/// What kind of entity an item is.
///
/// The only behavior that depends on the kind is span calculation and
/// whether the item may be displaced by a reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Application,
    Shortcut,
    Folder,
    Widget {
        /// Minimum width in pixels requested by the widget provider
        min_width: i32,
        /// Minimum height in pixels requested by the widget provider
        min_height: i32,
        /// Smallest width the widget may be resized to; defaults to `min_width`
        #[serde(default)]
        min_resize_width: Option<i32>,
        /// Smallest height the widget may be resized to; defaults to `min_height`
        #[serde(default)]
        min_resize_height: Option<i32>,
    },
    /// Fixed launcher button that never moves out of the way
    AllAppsButton,
}

impl ItemKind {
    pub fn can_reorder(&self) -> bool {
        !matches!(self, ItemKind::AllAppsButton)
    }

    /// Span and minimum span for this kind of item on a grid with `metrics`
    pub fn spans(&self, metrics: &CellMetrics) -> (CellSpan, CellSpan) {
        match self {
            ItemKind::Widget {
                min_width,
                min_height,
                min_resize_width,
                min_resize_height,
            } => {
                let span = metrics.rect_to_cell(*min_width, *min_height);
                let span = CellSpan::new(span.x.max(1), span.y.max(1));
                let min = metrics.rect_to_cell(
                    min_resize_width.unwrap_or(*min_width),
                    min_resize_height.unwrap_or(*min_height),
                );
                let min = CellSpan::new(min.x.clamp(1, span.x), min.y.clamp(1, span.y));
                (span, min)
            }
            ItemKind::Application
            | ItemKind::Shortcut
            | ItemKind::Folder
            | ItemKind::AllAppsButton => (CellSpan::unit(), CellSpan::unit()),
        }
    }
}

/// An entity placed on the grid, with committed and temporary placement
#[derive(Debug, Clone, PartialEq)]
pub struct GridItem {
    pub(crate) id: ItemId,
    pub(crate) kind: ItemKind,
    pub(crate) cell_x: i32,
    pub(crate) cell_y: i32,
    pub(crate) span_x: i32,
    pub(crate) span_y: i32,
    pub(crate) tmp_cell_x: i32,
    pub(crate) tmp_cell_y: i32,
    pub(crate) tmp_span_x: i32,
    pub(crate) tmp_span_y: i32,
    pub(crate) can_reorder: bool,
    pub(crate) use_tmp_coords: bool,
    pub(crate) requires_db_update: bool,
}

impl GridItem {
    pub fn new(id: ItemId, kind: ItemKind, cell: CellPos, span: CellSpan) -> Self {
        let can_reorder = kind.can_reorder();
        Self {
            id,
            kind,
            cell_x: cell.x,
            cell_y: cell.y,
            span_x: span.x,
            span_y: span.y,
            tmp_cell_x: cell.x,
            tmp_cell_y: cell.y,
            tmp_span_x: span.x,
            tmp_span_y: span.y,
            can_reorder,
            use_tmp_coords: false,
            requires_db_update: false,
        }
    }

    /// Override whether a reorder may displace this item
    pub fn with_can_reorder(mut self, can_reorder: bool) -> Self {
        self.can_reorder = can_reorder;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn can_reorder(&self) -> bool {
        self.can_reorder
    }

    pub fn uses_tmp_coords(&self) -> bool {
        self.use_tmp_coords
    }

    pub fn requires_db_update(&self) -> bool {
        self.requires_db_update
    }

    /// The persisted, authoritative placement
    pub fn committed(&self) -> CellAndSpan {
        CellAndSpan::new(self.cell_x, self.cell_y, self.span_x, self.span_y)
    }

    /// The speculative placement of an in-progress reorder
    pub fn temporary(&self) -> CellAndSpan {
        CellAndSpan::new(
            self.tmp_cell_x,
            self.tmp_cell_y,
            self.tmp_span_x,
            self.tmp_span_y,
        )
    }

    /// Placement the rendering layer should show right now
    pub fn displayed(&self) -> CellAndSpan {
        if self.use_tmp_coords {
            self.temporary()
        } else {
            self.committed()
        }
    }

    pub(crate) fn set_temporary(&mut self, placement: CellAndSpan) {
        self.tmp_cell_x = placement.x;
        self.tmp_cell_y = placement.y;
        self.tmp_span_x = placement.span_x;
        self.tmp_span_y = placement.span_y;
    }

    pub(crate) fn set_committed(&mut self, placement: CellAndSpan) {
        self.cell_x = placement.x;
        self.cell_y = placement.y;
        self.span_x = placement.span_x;
        self.span_y = placement.span_y;
    }

    pub(crate) fn reset_temporary(&mut self) {
        self.set_temporary(self.committed());
    }
}

/// A placement change reported to the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemChange {
    pub id: ItemId,
    pub previous: CellAndSpan,
    pub current: CellAndSpan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects() {
        let a = CellRect::from_cells(0, 0, 2, 2);
        let b = CellRect::from_cells(1, 1, 2, 2);
        let c = CellRect::from_cells(2, 0, 1, 1);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_empty_rect_contains_nothing() {
        let empty = CellRect::new(3, 3, 2, 2);
        assert!(!empty.contains(&CellRect::from_cells(3, 3, 0, 0)));
        let full = CellRect::from_cells(0, 0, 4, 4);
        assert!(full.contains(&CellRect::from_cells(1, 1, 2, 2)));
        assert!(!full.contains(&CellRect::from_cells(3, 3, 2, 1)));
    }

    #[test]
    fn test_union_ignores_empty() {
        let mut r = CellRect::new(0, 0, 0, 0);
        r.union(&CellRect::from_cells(2, 1, 1, 1));
        assert_eq!(r, CellRect::new(2, 1, 3, 2));
        r.union(&CellRect::from_cells(0, 3, 1, 1));
        assert_eq!(r, CellRect::new(0, 1, 3, 4));
    }

    #[test]
    fn test_pixel_rect_center_rounds_down() {
        let r = PixelRect::new(0, 0, 5, 7);
        assert_eq!(r.center(), PixelPoint::new(2, 3));
    }

    #[test]
    fn test_displayed_follows_flag() {
        let mut item = GridItem::new(
            ItemId(1),
            ItemKind::Shortcut,
            CellPos::new(0, 0),
            CellSpan::unit(),
        );
        item.set_temporary(CellAndSpan::new(2, 3, 1, 1));
        assert_eq!(item.displayed(), CellAndSpan::new(0, 0, 1, 1));
        item.use_tmp_coords = true;
        assert_eq!(item.displayed(), CellAndSpan::new(2, 3, 1, 1));
    }

    #[test]
    fn test_all_apps_button_is_fixed() {
        let item = GridItem::new(
            ItemId(9),
            ItemKind::AllAppsButton,
            CellPos::new(0, 0),
            CellSpan::unit(),
        );
        assert!(!item.can_reorder());
    }
}
