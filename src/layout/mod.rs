//! Grid layout engine with reorder-on-drop
//!
//! This module holds the occupancy bookkeeping for a grid of cells, the
//! spatial searches that locate room for an item, and the displacement
//! solver that shuffles existing items out of the way of a drop.

pub mod animation;
pub mod cell_layout;
pub mod config;
pub mod direction;
pub mod error;
pub mod geometry;
pub mod occupancy;
pub mod search;
pub mod solver;
pub mod types;

pub use animation::{
    compute_hint_delta, AnimationBridge, AnimationEvent, NullAnimator, RecordingAnimator,
    ReorderAnimator, ReorderHint,
};
pub use cell_layout::{CellLayout, DragSession, DropMode, DropOutcome};
pub use config::GridConfig;
pub use direction::{compute_direction_vector, Direction};
pub use error::LayoutError;
pub use geometry::CellMetrics;
pub use occupancy::OccupancyGrid;
pub use search::{nearest_area_in_direction, nearest_cell_area, AreaMatch, AreaSearch};
pub use solver::{select_solution, ConfigEntry, ItemConfiguration, ReorderSolver};
pub use types::*;
