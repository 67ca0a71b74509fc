//! A grid of cells holding icons and widgets, with live reorder support
//!
//! [`CellLayout`] owns the items, the committed occupancy grid and a scratch
//! grid for speculative arrangements. While something is dragged over it,
//! [`CellLayout::create_area`] asks the solver for room, previews the result
//! through temporary coordinates and, on drop, commits it. Reverting a preview
//! restores the committed arrangement.
//!
//! Drag state that must survive between calls (which item is being dragged
//! and the push direction chosen so far) lives in a [`DragSession`] owned by
//! the caller, so separate gestures never share it.

use log::{debug, trace, warn};

use super::animation::{AnimationBridge, NullAnimator, ReorderAnimator};
use super::config::GridConfig;
use super::direction::Direction;
use super::error::LayoutError;
use super::geometry::CellMetrics;
use super::occupancy::OccupancyGrid;
use super::search::{AreaMatch, AreaSearch};
use super::solver::{select_solution, ItemConfiguration, ReorderSolver};
use super::types::{
    CellAndSpan, CellPos, CellRect, CellSpan, GridItem, ItemChange, ItemId, PixelPoint, PixelRect,
};

/// What a [`CellLayout::create_area`] call is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropMode {
    /// The drag is hovering; preview the arrangement and hint at moves
    DragOver,
    /// Only ask whether a drop here would be accepted
    AcceptDrop,
    /// An item from this grid is being dropped
    OnDrop,
    /// An item from elsewhere is being dropped
    OnDropExternal,
}

impl DropMode {
    fn is_drop(self) -> bool {
        matches!(self, DropMode::OnDrop | DropMode::OnDropExternal)
    }

    fn reuses_direction(self) -> bool {
        matches!(
            self,
            DropMode::OnDrop | DropMode::OnDropExternal | DropMode::AcceptDrop
        )
    }

    fn updates_state(self) -> bool {
        !matches!(self, DropMode::AcceptDrop)
    }
}

/// State of one drag gesture, owned by whoever drives the drag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    dragged: Option<ItemId>,
    previous_direction: Option<Direction>,
}

impl DragSession {
    /// A drag of something that is not on this grid
    pub fn external() -> Self {
        Self::default()
    }

    /// A drag of an item already placed on this grid
    pub fn for_item(id: ItemId) -> Self {
        Self {
            dragged: Some(id),
            previous_direction: None,
        }
    }

    pub fn dragged(&self) -> Option<ItemId> {
        self.dragged
    }

    /// Push direction chosen by the last hover, reused by the drop
    pub fn previous_direction(&self) -> Option<Direction> {
        self.previous_direction
    }

    pub fn reset_direction(&mut self) {
        self.previous_direction = None;
    }
}

/// Result of a [`CellLayout::create_area`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    /// Region the dropped item gets, or `None` when there is no room
    pub placement: Option<CellAndSpan>,
    /// Push direction the solver used
    pub direction: Direction,
    /// Placement changes committed by a drop; empty otherwise
    pub changes: Vec<ItemChange>,
}

impl DropOutcome {
    pub fn is_solution(&self) -> bool {
        self.placement.is_some()
    }

    pub fn cell(&self) -> Option<CellPos> {
        self.placement.map(|p| p.cell())
    }

    pub fn span(&self) -> Option<CellSpan> {
        self.placement.map(|p| p.span())
    }
}

/// A grid of items with reorder-on-drop
pub struct CellLayout {
    config: GridConfig,
    metrics: CellMetrics,
    items: Vec<GridItem>,
    occupied: OccupancyGrid,
    tmp_occupied: OccupancyGrid,
    item_placement_dirty: bool,
    drag_in_progress: bool,
    animations: AnimationBridge,
}

impl CellLayout {
    /// Create an empty layout that discards animation requests
    pub fn new(config: GridConfig) -> Self {
        Self::with_animator(config, Box::new(NullAnimator))
    }

    pub fn with_animator(config: GridConfig, animator: Box<dyn ReorderAnimator>) -> Self {
        let metrics = config.metrics();
        let animations = AnimationBridge::new(&config, animator);
        Self {
            occupied: OccupancyGrid::new(config.count_x, config.count_y),
            tmp_occupied: OccupancyGrid::new(config.count_x, config.count_y),
            config,
            metrics,
            items: Vec::new(),
            item_placement_dirty: false,
            drag_in_progress: false,
            animations,
        }
    }

    pub fn set_animator(&mut self, animator: Box<dyn ReorderAnimator>) {
        self.animations.set_animator(animator);
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn metrics(&self) -> &CellMetrics {
        &self.metrics
    }

    pub fn count_x(&self) -> i32 {
        self.metrics.count_x
    }

    pub fn count_y(&self) -> i32 {
        self.metrics.count_y
    }

    /// Items in the order they were added
    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&GridItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    fn index_of(&self, id: ItemId) -> Result<usize, LayoutError> {
        self.items
            .iter()
            .position(|i| i.id() == id)
            .ok_or(LayoutError::UnknownItem(id))
    }

    /// Committed occupancy
    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupied
    }

    /// Occupancy of the arrangement currently being previewed
    pub fn temp_occupancy(&self) -> &OccupancyGrid {
        &self.tmp_occupied
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool, LayoutError> {
        self.occupied.is_occupied(x, y)
    }

    /// Whether a previewed arrangement differs from the committed one
    pub fn is_item_placement_dirty(&self) -> bool {
        self.item_placement_dirty
    }

    pub fn is_drag_in_progress(&self) -> bool {
        self.drag_in_progress
    }

    /// Item whose committed region covers a cell
    pub fn item_at(&self, x: i32, y: i32) -> Option<&GridItem> {
        self.items
            .iter()
            .find(|i| i.committed().rect().contains_cell(x, y))
    }

    /// Pixel rectangle an item is currently displayed in
    pub fn item_pixel_rect(&self, id: ItemId) -> Option<PixelRect> {
        self.item(id).map(|item| {
            let p = item.displayed();
            self.metrics.region_to_rect(p.x, p.y, p.span_x, p.span_y)
        })
    }

    fn solver(&mut self) -> ReorderSolver<'_> {
        ReorderSolver::new(
            &self.items,
            &self.occupied,
            &mut self.tmp_occupied,
            self.metrics,
        )
    }

    fn search(&self) -> AreaSearch<'_> {
        AreaSearch::new(&self.occupied, &self.metrics)
    }

    // ------------------------------------------------------------------------
    // Item bookkeeping
    // ------------------------------------------------------------------------

    /// Place an item at its committed position
    pub fn add_item(&mut self, item: GridItem) -> Result<(), LayoutError> {
        let placement = item.committed();
        if !placement.span().is_valid() {
            return Err(LayoutError::InvalidSpan {
                id: item.id(),
                span_x: placement.span_x,
                span_y: placement.span_y,
            });
        }
        if self.item(item.id()).is_some() {
            return Err(LayoutError::DuplicateItem(item.id()));
        }
        if placement.x < 0
            || placement.y < 0
            || placement.x + placement.span_x > self.count_x()
            || placement.y + placement.span_y > self.count_y()
        {
            return Err(LayoutError::OutsideGrid {
                id: item.id(),
                placement,
                count_x: self.count_x(),
                count_y: self.count_y(),
            });
        }
        if !self.occupied.is_region_vacant(
            placement.x,
            placement.y,
            placement.span_x,
            placement.span_y,
        ) {
            return Err(LayoutError::Overlap {
                id: item.id(),
                placement,
            });
        }

        self.occupied.mark_rect(&placement.rect(), true);
        let mut item = item;
        item.reset_temporary();
        self.items.push(item);
        Ok(())
    }

    /// Add persisted items, skipping (and reporting) any that do not fit
    pub fn restore_items<I>(&mut self, items: I) -> Vec<LayoutError>
    where
        I: IntoIterator<Item = GridItem>,
    {
        let mut rejected = Vec::new();
        for item in items {
            if let Err(err) = self.add_item(item) {
                warn!("skipping item: {}", err);
                rejected.push(err);
            }
        }
        rejected
    }

    /// Take an item off the grid
    pub fn remove_item(&mut self, id: ItemId) -> Result<GridItem, LayoutError> {
        let index = self.index_of(id)?;
        let item = self.items.remove(index);
        let rect = item.committed().rect();
        self.occupied.mark_rect(&rect, false);
        // Keep cells of any neighbor that shares the freed region
        for other in &self.items {
            let other_rect = other.committed().rect();
            if other_rect.intersects(&rect) {
                self.occupied.mark_rect(&other_rect, true);
            }
        }
        Ok(item)
    }

    /// Move an item to a new committed cell and span
    pub fn on_move(&mut self, id: ItemId, cell: CellPos, span: CellSpan) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        let target = CellAndSpan::at(cell, span);
        if !span.is_valid() {
            return Err(LayoutError::InvalidSpan {
                id,
                span_x: span.x,
                span_y: span.y,
            });
        }
        if cell.x < 0
            || cell.y < 0
            || cell.x + span.x > self.count_x()
            || cell.y + span.y > self.count_y()
        {
            return Err(LayoutError::OutsideGrid {
                id,
                placement: target,
                count_x: self.count_x(),
                count_y: self.count_y(),
            });
        }

        let item = &mut self.items[index];
        self.occupied.mark_rect(&item.committed().rect(), false);
        self.occupied.mark_rect(&target.rect(), true);
        item.set_committed(target);
        item.reset_temporary();
        Ok(())
    }

    /// Mark every item as using (or not using) its temporary placement
    pub fn set_use_temp_coords(&mut self, use_temp: bool) {
        for item in &mut self.items {
            item.use_tmp_coords = use_temp;
        }
    }

    /// Drain the items whose placement changed since the last call
    pub fn take_dirty_items(&mut self) -> Vec<(ItemId, CellAndSpan)> {
        self.items
            .iter_mut()
            .filter(|i| i.requires_db_update)
            .map(|i| {
                i.requires_db_update = false;
                (i.id(), i.committed())
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Drag lifecycle
    // ------------------------------------------------------------------------

    pub fn on_drag_enter(&mut self) {
        self.drag_in_progress = true;
    }

    /// The drag left the grid: drop any preview
    pub fn on_drag_exit(&mut self) {
        self.drag_in_progress = false;
        self.revert_temp_state();
        self.set_use_temp_coords(false);
    }

    /// Lift an item off the grid so the solver treats its cells as free
    pub fn prepare_child_for_drag(&mut self, id: ItemId) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        let rect = self.items[index].committed().rect();
        self.occupied.mark_rect(&rect, false);
        Ok(())
    }

    /// Put a dragged item's cells back after its drop completed
    pub fn on_drop_completed(&mut self, id: ItemId) -> Result<(), LayoutError> {
        let index = self.index_of(id)?;
        let rect = self.items[index].committed().rect();
        self.occupied.mark_rect(&rect, true);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reorder
    // ------------------------------------------------------------------------

    /// Find room for a drop of `span` (at least `min_span`) centered at `pixel`.
    ///
    /// In [`DropMode::DragOver`] the chosen arrangement is previewed through
    /// temporary coordinates and displaced items start hinting. Drop modes
    /// commit the arrangement and report the changes. [`DropMode::AcceptDrop`]
    /// only answers whether a drop would fit.
    pub fn create_area(
        &mut self,
        session: &mut DragSession,
        pixel: PixelPoint,
        min_span: CellSpan,
        span: CellSpan,
        mode: DropMode,
    ) -> DropOutcome {
        let drag = session.dragged;

        let direction = match session.previous_direction {
            Some(previous) if mode.reuses_direction() => {
                if mode.is_drop() {
                    session.previous_direction = None;
                }
                previous
            }
            _ => {
                let direction = self.solver().direction_vector_for_drop(pixel, span, drag);
                session.previous_direction = Some(direction);
                direction
            }
        };
        trace!(
            "{:?} at ({}, {}) span {}x{} pushing {}",
            mode,
            pixel.x,
            pixel.y,
            span.x,
            span.y,
            direction
        );

        let (swap, no_shuffle) = {
            let mut solver = self.solver();
            let swap = solver.simple_swap(pixel, min_span, span, direction, drag);
            let no_shuffle = solver.find_configuration_no_shuffle(pixel, min_span, span);
            (swap, no_shuffle)
        };
        let solution = select_solution(swap, no_shuffle);

        self.set_use_temp_coords(true);

        let mut changes = Vec::new();
        if let Some(solution) = &solution {
            if mode.updates_state() {
                let commit_drag = mode.is_drop() && drag.is_some_and(|id| self.item(id).is_some());
                self.copy_solution_to_temp_state(solution, drag);
                self.item_placement_dirty = true;
                self.animate_items_to_solution(solution, drag, commit_drag);

                if mode.is_drop() {
                    changes = self.commit_temp_placement();
                    self.animations.complete_and_clear_hints();
                    self.item_placement_dirty = false;
                } else {
                    self.animations
                        .begin_or_adjust_hints(solution, &self.items, drag);
                }
            }
        } else {
            debug!("no room for span {}x{} at ({}, {})", span.x, span.y, pixel.x, pixel.y);
        }

        if mode == DropMode::OnDrop || solution.is_none() {
            self.set_use_temp_coords(false);
        }

        DropOutcome {
            placement: solution.map(|s| s.drag),
            direction,
            changes,
        }
    }

    /// Make room for an item being resized to `span` at `cell`.
    ///
    /// Returns whether an arrangement was found. With `commit` it is applied
    /// immediately; otherwise it is previewed with hints.
    pub fn create_area_for_resize(
        &mut self,
        id: ItemId,
        cell: CellPos,
        span: CellSpan,
        direction: Direction,
        commit: bool,
    ) -> Result<bool, LayoutError> {
        let index = self.index_of(id)?;
        let committed = self.items[index].committed().rect();
        self.occupied.mark_rect(&committed, false);

        let pixel = self
            .metrics
            .region_to_center_point(cell.x, cell.y, span.x, span.y);
        let swap = self
            .solver()
            .simple_swap(pixel, span, span, direction, Some(id));

        self.set_use_temp_coords(true);
        if swap.is_solution {
            self.copy_solution_to_temp_state(&swap, Some(id));
            self.item_placement_dirty = true;
            self.animate_items_to_solution(&swap, Some(id), commit);

            if commit {
                self.commit_temp_placement();
                self.animations.complete_and_clear_hints();
                self.item_placement_dirty = false;
            } else {
                self.animations
                    .begin_or_adjust_hints(&swap, &self.items, Some(id));
            }
        }

        if !(swap.is_solution && commit) {
            self.occupied.mark_rect(&committed, true);
        }
        Ok(swap.is_solution)
    }

    /// Load a solution into temporary coordinates and the scratch grid
    fn copy_solution_to_temp_state(&mut self, solution: &ItemConfiguration, drag: Option<ItemId>) {
        self.tmp_occupied.clear();
        for item in &mut self.items {
            if Some(item.id()) == drag {
                item.set_temporary(solution.drag);
                continue;
            }
            if let Some(placement) = solution.get(item.id()) {
                item.set_temporary(*placement);
                self.tmp_occupied.mark_rect(&placement.rect(), true);
            }
        }
        self.tmp_occupied.mark_rect(&solution.drag.rect(), true);
    }

    fn animate_items_to_solution(
        &mut self,
        solution: &ItemConfiguration,
        drag: Option<ItemId>,
        commit_drag: bool,
    ) {
        self.tmp_occupied.clear();
        for item in &self.items {
            if Some(item.id()) == drag {
                continue;
            }
            if let Some(placement) = solution.get(item.id()) {
                self.animations.animate_to_position(item.id(), *placement);
                self.tmp_occupied.mark_rect(&placement.rect(), true);
            }
        }
        if commit_drag {
            self.tmp_occupied.mark_rect(&solution.drag.rect(), true);
        }
    }

    /// Promote temporary placements to committed ones.
    ///
    /// Items whose cell or span changed are flagged for persistence and
    /// returned.
    pub fn commit_temp_placement(&mut self) -> Vec<ItemChange> {
        self.occupied.copy_from(&self.tmp_occupied);

        let mut changes = Vec::new();
        for item in &mut self.items {
            let previous = item.committed();
            let current = item.temporary();
            if previous != current {
                item.requires_db_update = true;
                changes.push(ItemChange {
                    id: item.id(),
                    previous,
                    current,
                });
            }
            item.set_committed(current);
            item.use_tmp_coords = false;
        }
        debug!("committed {} placement change(s)", changes.len());
        changes
    }

    /// Throw away a previewed arrangement and glide items home
    pub fn revert_temp_state(&mut self) {
        if !self.item_placement_dirty {
            return;
        }
        for item in &mut self.items {
            if item.temporary() != item.committed() {
                item.reset_temporary();
                self.animations
                    .animate_to_position(item.id(), item.committed());
            }
        }
        self.animations.complete_and_clear_hints();
        self.tmp_occupied.copy_from(&self.occupied);
        self.item_placement_dirty = false;
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Nearest fully vacant region of `span`, treating `ignore`'s cells as free
    pub fn find_nearest_vacant_area(
        &self,
        pixel: PixelPoint,
        span: CellSpan,
        ignore: Option<ItemId>,
    ) -> Option<CellPos> {
        self.search()
            .ignoring(self.ignore_rect(ignore))
            .nearest_vacant_area(pixel, span)
    }

    /// Nearest vacant region between `min_span` and `span`
    pub fn find_nearest_vacant_area_shrinking(
        &self,
        pixel: PixelPoint,
        min_span: CellSpan,
        span: CellSpan,
        ignore: Option<ItemId>,
    ) -> Option<AreaMatch> {
        self.search()
            .ignoring(self.ignore_rect(ignore))
            .nearest_vacant_area_shrinking(pixel, min_span, span)
    }

    /// Nearest region of `span`, occupied or not
    pub fn find_nearest_area(&self, pixel: PixelPoint, span: CellSpan) -> Option<CellPos> {
        self.search().nearest_area_ignore_occupied(pixel, span)
    }

    /// Whether the region a drop at `pixel` would target holds another item
    pub fn is_nearest_drop_location_occupied(
        &self,
        pixel: PixelPoint,
        span: CellSpan,
        session: &DragSession,
    ) -> bool {
        let drag = session.dragged;
        let Some(cell) = self.find_nearest_area(pixel, span) else {
            return false;
        };
        let region = CellRect::from_cells(cell.x, cell.y, span.x, span.y);
        self.items
            .iter()
            .filter(|i| Some(i.id()) != drag)
            .any(|i| i.committed().rect().intersects(&region))
    }

    /// First vacant region of `span`, scanning row by row
    pub fn find_cell_for_span(&self, span: CellSpan) -> Option<CellPos> {
        self.search().cell_for_span(span)
    }

    /// First vacant region of `span`, preferring regions that cover `cell`
    pub fn find_cell_for_span_that_intersects(
        &self,
        span: CellSpan,
        cell: CellPos,
    ) -> Option<CellPos> {
        self.search().cell_for_span_that_intersects(span, Some(cell))
    }

    /// Like [`CellLayout::find_cell_for_span`], with `ignore`'s cells counted as free
    pub fn find_cell_for_span_ignoring(
        &self,
        span: CellSpan,
        ignore: Option<ItemId>,
    ) -> Option<CellPos> {
        self.search()
            .ignoring(self.ignore_rect(ignore))
            .cell_for_span(span)
    }

    pub fn exists_empty_cell(&self) -> bool {
        self.find_cell_for_span(CellSpan::unit()).is_some()
    }

    fn ignore_rect(&self, ignore: Option<ItemId>) -> Option<CellRect> {
        ignore
            .and_then(|id| self.item(id))
            .map(|item| item.committed().rect())
    }
}
