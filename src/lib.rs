//! Cell Reorder - grid placement and reorder-on-drop for home-screen style layouts
//!
//! This library keeps track of items on a grid of cells, finds room for an
//! item being dragged over the grid, and shuffles existing items out of the
//! way when the nearest room is taken.
//!
//! # Example
//!
//! ```rust
//! use cell_reorder::run_scenario;
//!
//! let report = run_scenario(
//!     r#"
//! [grid]
//! count_x = 2
//! count_y = 1
//!
//! [[items]]
//! id = 1
//! cell = [0, 0]
//! "#,
//! )
//! .unwrap();
//! assert_eq!(report.final_grid(), "1 .");
//! ```

pub mod layout;
pub mod render;
pub mod scenario;

pub use layout::{
    CellLayout, DragSession, DropMode, DropOutcome, GridConfig, GridItem, ItemConfiguration,
    ItemId, ItemKind, LayoutError,
};
pub use render::render_grid;
pub use scenario::{Scenario, ScenarioError, ScenarioReport};

use thiserror::Error;

/// Errors that can occur while loading or replaying a scenario
#[derive(Debug, Error)]
pub enum RunError {
    /// Error reading, parsing or following the scenario script
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Error raised by the grid itself
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Configuration for a scenario replay
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Record the animation requests made after each step
    pub animations: bool,
}

impl RunConfig {
    /// Create a new run configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether animation requests are recorded
    pub fn with_animations(mut self, animations: bool) -> Self {
        self.animations = animations;
        self
    }
}

/// Parse a TOML scenario and replay it with default settings
pub fn run_scenario(source: &str) -> Result<ScenarioReport, RunError> {
    run_scenario_with_config(source, RunConfig::default())
}

/// Parse a TOML scenario and replay it
pub fn run_scenario_with_config(
    source: &str,
    config: RunConfig,
) -> Result<ScenarioReport, RunError> {
    let scenario = Scenario::from_str(source)?;
    scenario.replay(config.animations)
}
