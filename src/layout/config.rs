//! Configuration for a cell layout

use serde::{Deserialize, Serialize};

use super::geometry::CellMetrics;

/// Configuration options for a grid and its reorder feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns
    pub count_x: i32,

    /// Number of rows
    pub count_y: i32,

    /// Cell size in pixels (width, height)
    pub cell_size: (i32, i32),

    /// Gap between cells in pixels (horizontal, vertical)
    pub cell_gap: (i32, i32),

    /// Padding before the first cell in pixels (left, top)
    pub padding: (i32, i32),

    /// Icon size in pixels, the unit of the reorder hint nudge
    pub icon_size: i32,

    /// Fraction of the icon size a displaced item is nudged by while a drop is pending
    pub hint_magnitude: f32,

    /// Duration of the move-to-cell animation in milliseconds
    pub reorder_animation_ms: u32,

    /// Period of one reorder hint shake in milliseconds
    pub hint_animation_ms: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            count_x: 4,
            count_y: 4,
            cell_size: (80, 80),
            cell_gap: (0, 0),
            padding: (0, 0),
            icon_size: 64,
            hint_magnitude: 0.12,
            reorder_animation_ms: 150,
            hint_animation_ms: 300,
        }
    }
}

impl GridConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid dimensions in cells
    pub fn with_grid_size(mut self, count_x: i32, count_y: i32) -> Self {
        self.count_x = count_x;
        self.count_y = count_y;
        self
    }

    /// Set the pixel size of one cell
    pub fn with_cell_size(mut self, width: i32, height: i32) -> Self {
        self.cell_size = (width, height);
        self
    }

    /// Set the pixel gaps between cells
    pub fn with_cell_gap(mut self, width_gap: i32, height_gap: i32) -> Self {
        self.cell_gap = (width_gap, height_gap);
        self
    }

    /// Set the padding before the first cell
    pub fn with_padding(mut self, left: i32, top: i32) -> Self {
        self.padding = (left, top);
        self
    }

    /// Set the icon size used to scale reorder hints
    pub fn with_icon_size(mut self, icon_size: i32) -> Self {
        self.icon_size = icon_size;
        self
    }

    /// Pixel geometry derived from this configuration
    pub fn metrics(&self) -> CellMetrics {
        CellMetrics {
            count_x: self.count_x,
            count_y: self.count_y,
            cell_width: self.cell_size.0,
            cell_height: self.cell_size.1,
            width_gap: self.cell_gap.0,
            height_gap: self.cell_gap.1,
            padding_left: self.padding.0,
            padding_top: self.padding.1,
        }
    }

    /// Length of the reorder hint nudge in pixels
    pub fn hint_distance(&self) -> f32 {
        self.hint_magnitude * self.icon_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!((config.count_x, config.count_y), (4, 4));
        assert_eq!(config.cell_size, (80, 80));
        assert_eq!(config.cell_gap, (0, 0));
        assert_eq!(config.hint_magnitude, 0.12);
        assert_eq!(config.reorder_animation_ms, 150);
        assert_eq!(config.hint_animation_ms, 300);
    }

    #[test]
    fn test_builder_pattern() {
        let config = GridConfig::new()
            .with_grid_size(5, 6)
            .with_cell_size(100, 120)
            .with_cell_gap(4, 8);

        let metrics = config.metrics();
        assert_eq!(metrics.count_x, 5);
        assert_eq!(metrics.count_y, 6);
        assert_eq!(metrics.cell_height, 120);
        assert_eq!(metrics.height_gap, 8);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GridConfig = toml::from_str("count_x = 6\ncell_size = [96, 110]").unwrap();
        assert_eq!(config.count_x, 6);
        assert_eq!(config.count_y, 4);
        assert_eq!(config.cell_size, (96, 110));
    }
}
