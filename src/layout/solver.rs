//! Displacement solver for reorder-on-drop
//!
//! Given a drop point and the span of the item being dropped, the solver
//! builds an [`ItemConfiguration`]: a proposed placement for every item on
//! the grid plus the region the dropped item would occupy. Two strategies
//! compete. The swap strategy claims the nearest region regardless of
//! occupancy and relocates whatever is in the way; the no-shuffle strategy
//! only looks for vacant space. [`select_solution`] picks between them.
//!
//! The solver never touches committed item state. It works on a scratch
//! occupancy grid that the caller lends it and reports its result as a
//! value the caller may later apply.

use log::{debug, trace};

use super::direction::{compute_direction_vector, Direction};
use super::geometry::CellMetrics;
use super::occupancy::OccupancyGrid;
use super::search::{nearest_area_in_direction, nearest_cell_area, AreaSearch};
use super::types::{CellAndSpan, CellPos, CellRect, CellSpan, GridItem, ItemId, PixelPoint};

// ============================================================================
// ItemConfiguration
// ============================================================================

/// One item's proposed placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigEntry {
    pub id: ItemId,
    pub can_reorder: bool,
    pub placement: CellAndSpan,
}

/// A proposed arrangement of every item plus the drop region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemConfiguration {
    /// Entries in grid order
    entries: Vec<ConfigEntry>,
    /// Whether this configuration is a valid arrangement
    pub is_solution: bool,
    /// Region the dropped item would occupy
    pub drag: CellAndSpan,
}

impl ItemConfiguration {
    /// Snapshot the committed (or temporary) placement of every item
    pub fn from_items(items: &[GridItem], temporary: bool) -> Self {
        let entries = items
            .iter()
            .map(|item| ConfigEntry {
                id: item.id(),
                can_reorder: item.can_reorder(),
                placement: if temporary {
                    item.temporary()
                } else {
                    item.committed()
                },
            })
            .collect();
        Self {
            entries,
            is_solution: false,
            drag: CellAndSpan::default(),
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&CellAndSpan> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.placement)
    }

    fn get_mut(&mut self, id: ItemId) -> Option<&mut CellAndSpan> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.placement)
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Area of the drop region, in cells
    pub fn area(&self) -> i32 {
        self.drag.span_x * self.drag.span_y
    }

    /// Items whose proposed placement differs from `items`' committed placement
    pub fn moved_items<'a>(
        &'a self,
        items: &'a [GridItem],
    ) -> impl Iterator<Item = (ItemId, CellAndSpan)> + 'a {
        self.entries.iter().filter_map(move |e| {
            items
                .iter()
                .find(|i| i.id() == e.id)
                .filter(|i| i.committed() != e.placement)
                .map(|_| (e.id, e.placement))
        })
    }
}

/// Choose between the swap and no-shuffle configurations.
///
/// The swap configuration wins when its drop region is at least as large as
/// the no-shuffle one, so a drop onto an occupied cell pushes its occupant
/// even while vacant cells remain elsewhere. Returns `None` when neither is a
/// solution.
pub fn select_solution(
    swap: ItemConfiguration,
    no_shuffle: ItemConfiguration,
) -> Option<ItemConfiguration> {
    if swap.is_solution && (!no_shuffle.is_solution || swap.area() >= no_shuffle.area()) {
        trace!("selected swap solution, area {}", swap.area());
        Some(swap)
    } else if no_shuffle.is_solution {
        trace!("selected no-shuffle solution, area {}", no_shuffle.area());
        Some(no_shuffle)
    } else {
        None
    }
}

// ============================================================================
// ReorderSolver
// ============================================================================

/// Searches for arrangements that make room for a drop
pub struct ReorderSolver<'a> {
    items: &'a [GridItem],
    occupied: &'a OccupancyGrid,
    scratch: &'a mut OccupancyGrid,
    metrics: CellMetrics,
}

impl<'a> ReorderSolver<'a> {
    /// Create a solver over `items` and their committed `occupied` grid.
    ///
    /// `scratch` must have the same dimensions; its contents are overwritten.
    pub fn new(
        items: &'a [GridItem],
        occupied: &'a OccupancyGrid,
        scratch: &'a mut OccupancyGrid,
        metrics: CellMetrics,
    ) -> Self {
        Self {
            items,
            occupied,
            scratch,
            metrics,
        }
    }

    /// Current contents of the scratch grid
    pub fn scratch(&self) -> &OccupancyGrid {
        &*self.scratch
    }

    /// Claim the region nearest `pixel` and displace whatever is in the way.
    ///
    /// If no arrangement exists at `span`, the span is shrunk toward
    /// `min_span`, alternating axes, and the search repeats.
    pub fn simple_swap(
        &mut self,
        pixel: PixelPoint,
        min_span: CellSpan,
        span: CellSpan,
        direction: Direction,
        drag: Option<ItemId>,
    ) -> ItemConfiguration {
        let mut span = span;
        let mut decrement_x = true;

        loop {
            let mut solution = ItemConfiguration::from_items(self.items, false);
            self.scratch.copy_from(self.occupied);

            let target = AreaSearch::new(self.occupied, &self.metrics)
                .nearest_area_ignore_occupied(pixel, span);
            let found = match target {
                Some(cell) => self.rearrangement_exists(cell, span, direction, drag, &mut solution),
                None => false,
            };

            if let (true, Some(cell)) = (found, target) {
                debug!(
                    "swap solution at ({}, {}) for span {}x{}",
                    cell.x, cell.y, span.x, span.y
                );
                solution.is_solution = true;
                solution.drag = CellAndSpan::at(cell, span);
                return solution;
            }

            if span.x > min_span.x && (min_span.y == span.y || decrement_x) {
                span.x -= 1;
                decrement_x = false;
            } else if span.y > min_span.y {
                span.y -= 1;
                decrement_x = true;
            } else {
                trace!("no swap solution down to span {}x{}", span.x, span.y);
                solution.is_solution = false;
                return solution;
            }
        }
    }

    /// Best vacant region, leaving every item where it is
    pub fn find_configuration_no_shuffle(
        &self,
        pixel: PixelPoint,
        min_span: CellSpan,
        span: CellSpan,
    ) -> ItemConfiguration {
        match AreaSearch::new(self.occupied, &self.metrics)
            .nearest_vacant_area_shrinking(pixel, min_span, span)
        {
            Some(found) => {
                let mut solution = ItemConfiguration::from_items(self.items, false);
                solution.drag = CellAndSpan::at(found.cell, found.span);
                solution.is_solution = true;
                solution
            }
            None => ItemConfiguration::default(),
        }
    }

    /// Items other than `drag` whose committed region intersects the given region
    pub fn intersecting_items(
        &self,
        cell: CellPos,
        span: CellSpan,
        drag: Option<ItemId>,
    ) -> Vec<ItemId> {
        let region = CellRect::from_cells(cell.x, cell.y, span.x, span.y);
        self.items
            .iter()
            .filter(|item| Some(item.id()) != drag)
            .filter(|item| item.committed().rect().intersects(&region))
            .map(|item| item.id())
            .collect()
    }

    /// Direction to push displaced items for a drop at `pixel`.
    ///
    /// The drop region is widened to every item it touches, and the offset
    /// from the drop point to that region's center, normalized by the span,
    /// is snapped to a compass direction. An axis the drop fills completely
    /// contributes nothing. With no usable offset the push goes right.
    pub fn direction_vector_for_drop(
        &self,
        pixel: PixelPoint,
        span: CellSpan,
        drag: Option<ItemId>,
    ) -> Direction {
        let target = AreaSearch::new(self.occupied, &self.metrics)
            .nearest_area_ignore_occupied(pixel, span);
        let Some(target) = target else {
            return Direction::RIGHT;
        };

        let probe = CellRect::from_cells(target.x, target.y, span.x, span.y);
        let mut drop_region = probe;
        for item in self.items {
            if Some(item.id()) == drag {
                continue;
            }
            let rect = item.committed().rect();
            if rect.intersects(&probe) {
                drop_region.union(&rect);
            }
        }

        let region = self.metrics.region_to_rect(
            drop_region.left,
            drop_region.top,
            drop_region.width(),
            drop_region.height(),
        );
        let mut delta_x = (region.center_x() - pixel.x) / span.x;
        let mut delta_y = (region.center_y() - pixel.y) / span.y;

        if drop_region.width() == self.metrics.count_x || span.x == self.metrics.count_x {
            delta_x = 0;
        }
        if drop_region.height() == self.metrics.count_y || span.y == self.metrics.count_y {
            delta_y = 0;
        }

        if delta_x == 0 && delta_y == 0 {
            Direction::RIGHT
        } else {
            compute_direction_vector(delta_x as f32, delta_y as f32)
        }
    }

    /// Try to relocate everything overlapping the drop region at `cell`
    fn rearrangement_exists(
        &mut self,
        cell: CellPos,
        span: CellSpan,
        direction: Direction,
        drag: Option<ItemId>,
        solution: &mut ItemConfiguration,
    ) -> bool {
        if cell.x < 0 || cell.y < 0 {
            return false;
        }
        let drop_rect = CellRect::from_cells(cell.x, cell.y, span.x, span.y);

        if let Some(placement) = drag.and_then(|id| solution.get_mut(id)) {
            placement.x = cell.x;
            placement.y = cell.y;
        }

        let mut intersecting = Vec::new();
        for entry in solution.entries() {
            if Some(entry.id) == drag {
                continue;
            }
            if entry.placement.rect().intersects(&drop_rect) {
                if !entry.can_reorder {
                    trace!("item {} is fixed, drop at ({}, {}) blocked", entry.id, cell.x, cell.y);
                    return false;
                }
                intersecting.push(entry.id);
            }
        }

        if self.attempt_push_in_direction(&intersecting, &drop_rect, direction, drag, solution) {
            trace!("pushed {} item(s) {}", intersecting.len(), direction);
            return true;
        }

        if self.add_items_to_temp_location(&intersecting, &drop_rect, direction, false, drag, solution)
        {
            trace!("shuffled {} item(s) as a block", intersecting.len());
            return true;
        }

        for id in &intersecting {
            if !self.add_item_to_temp_location(*id, &drop_rect, direction, solution) {
                return false;
            }
        }
        true
    }

    /// Push the intersecting items as a block along each candidate axis in turn
    fn attempt_push_in_direction(
        &mut self,
        intersecting: &[ItemId],
        drop_rect: &CellRect,
        direction: Direction,
        drag: Option<ItemId>,
        solution: &mut ItemConfiguration,
    ) -> bool {
        let candidates = if direction.is_diagonal() {
            [
                direction.horizontal(),
                direction.vertical(),
                direction.reversed().horizontal(),
                direction.reversed().vertical(),
            ]
        } else {
            [
                direction,
                direction.reversed(),
                direction.swapped(),
                direction.swapped().reversed(),
            ]
        };

        candidates.into_iter().any(|candidate| {
            self.add_items_to_temp_location(intersecting, drop_rect, candidate, true, drag, solution)
        })
    }

    /// Move a group of items together so they clear `drop_rect`.
    ///
    /// With `push`, the group first absorbs every item standing in its way and
    /// then marches along `direction`; otherwise the group jumps to the nearest
    /// position that fits. Interlocking shapes are respected in both cases.
    fn add_items_to_temp_location(
        &mut self,
        items: &[ItemId],
        drop_rect: &CellRect,
        direction: Direction,
        push: bool,
        drag: Option<ItemId>,
        solution: &mut ItemConfiguration,
    ) -> bool {
        if items.is_empty() {
            return true;
        }

        let mut bounding = CellRect::new(0, 0, 0, 0);
        for id in items {
            if let Some(c) = solution.get(*id) {
                bounding.union(&c.rect());
            }
        }

        let mut group = items.to_vec();
        if push {
            self.complete_set_of_items_to_move(&mut group, &mut bounding, direction, drag, solution);
        }

        for id in &group {
            if let Some(c) = solution.get(*id) {
                self.scratch.mark_rect(&c.rect(), false);
            }
        }

        let mut block = OccupancyGrid::new(bounding.width(), bounding.height());
        for id in &group {
            if let Some(c) = solution.get(*id) {
                block.mark(
                    c.x - bounding.left,
                    c.y - bounding.top,
                    c.span_x,
                    c.span_y,
                    true,
                );
            }
        }

        self.scratch.mark_rect(drop_rect, true);

        let target = if push {
            nearest_area_in_direction(
                &*self.scratch,
                bounding.origin(),
                bounding.span(),
                direction,
                Some(&block),
            )
        } else {
            nearest_cell_area(
                &*self.scratch,
                bounding.origin(),
                bounding.span(),
                direction,
                Some(&block),
            )
        };

        let success = match target {
            Some(found) => {
                let delta_x = found.x - bounding.left;
                let delta_y = found.y - bounding.top;
                for id in &group {
                    if let Some(c) = solution.get_mut(*id) {
                        c.x += delta_x;
                        c.y += delta_y;
                    }
                }
                true
            }
            None => false,
        };

        for id in &group {
            if let Some(c) = solution.get(*id) {
                self.scratch.mark_rect(&c.rect(), true);
            }
        }
        success
    }

    /// Grow `group` with the items a push along `direction` would bump into.
    ///
    /// Starts from the trailing edge of the bounding box and sweeps it forward
    /// at least as many times as the box is deep; `bounding` ends up covering
    /// the whole group.
    fn complete_set_of_items_to_move(
        &self,
        group: &mut Vec<ItemId>,
        bounding: &mut CellRect,
        direction: Direction,
        drag: Option<ItemId>,
        solution: &ItemConfiguration,
    ) {
        let b = *bounding;
        let mut edge = if direction.dy < 0 {
            CellRect::new(b.left, b.bottom - 1, b.right, b.bottom)
        } else if direction.dy > 0 {
            CellRect::new(b.left, b.top, b.right, b.top + 1)
        } else if direction.dx < 0 {
            CellRect::new(b.right - 1, b.top, b.right, b.bottom)
        } else if direction.dx > 0 {
            CellRect::new(b.left, b.top, b.left + 1, b.bottom)
        } else {
            b
        };

        let mut min_runs = (b.width() - edge.width())
            .abs()
            .max((b.height() - edge.height()).abs())
            + 1;

        loop {
            let found = self.add_item_in_direction(group, &mut edge, direction, drag, solution);
            if !(found || min_runs > 0) {
                break;
            }
            min_runs -= 1;
        }
        bounding.union(&edge);
    }

    /// Sweep `edge` one cell along `direction` and absorb items it runs into.
    ///
    /// An item joins the group when its leading side sits on the swept edge
    /// and a cell it would vacate is pushed by an occupied cell behind it.
    fn add_item_in_direction(
        &self,
        group: &mut Vec<ItemId>,
        edge: &mut CellRect,
        direction: Direction,
        drag: Option<ItemId>,
        solution: &ItemConfiguration,
    ) -> bool {
        let (delta_x, delta_y) = if direction.dy < 0 {
            (0, -1)
        } else if direction.dy > 0 {
            (0, 1)
        } else if direction.dx < 0 {
            (-1, 0)
        } else if direction.dx > 0 {
            (1, 0)
        } else {
            (0, 0)
        };

        let mut swept = *edge;
        swept.offset(delta_x, delta_y);

        let mut found = false;
        for entry in solution.entries() {
            if group.contains(&entry.id) || Some(entry.id) == drag {
                continue;
            }
            let c = entry.placement;
            let rect = c.rect();
            if !swept.intersects(&rect) {
                continue;
            }
            if !entry.can_reorder {
                return false;
            }

            let on_leading_side = (direction.dx < 0 && c.x == swept.left)
                || (direction.dx > 0 && c.x == swept.right - 1)
                || (direction.dy < 0 && c.y == swept.top)
                || (direction.dy > 0 && c.y == swept.bottom - 1);
            if !on_leading_side {
                continue;
            }

            let pushed = (c.x..c.x + c.span_x).any(|x| {
                (c.y..c.y + c.span_y).any(|y| self.scratch.get(x - delta_x, y - delta_y))
            });
            if pushed {
                group.push(entry.id);
                edge.union(&rect);
                found = true;
            }
        }
        found
    }

    /// Move a single item to the nearest free position clear of `drop_rect`
    fn add_item_to_temp_location(
        &mut self,
        id: ItemId,
        drop_rect: &CellRect,
        direction: Direction,
        solution: &mut ItemConfiguration,
    ) -> bool {
        let Some(current) = solution.get(id).copied() else {
            return false;
        };

        self.scratch.mark_rect(&current.rect(), false);
        self.scratch.mark_rect(drop_rect, true);

        let mut placed = current;
        let target = nearest_cell_area(&*self.scratch, current.cell(), current.span(), direction, None);
        let success = match target {
            Some(found) => {
                placed.x = found.x;
                placed.y = found.y;
                if let Some(c) = solution.get_mut(id) {
                    *c = placed;
                }
                true
            }
            None => false,
        };

        self.scratch.mark_rect(&placed.rect(), true);
        success
    }
}
