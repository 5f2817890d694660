//! Grid dimensions, presets and auto-expansion.

use serde::{Deserialize, Serialize};

use super::limits::MAX_GRID_DIMENSION;

/// Cell shape preset. Determines pixel size and marker snapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridPreset {
    /// 16×16 cells, markers snap to the centre (top-down maps).
    #[default]
    Square,
    /// 32×16 cells, markers snap to the left or right half (side-scrollers).
    Rectangle,
}

impl GridPreset {
    /// Tile size in pixels at 1:1 zoom.
    pub const fn tile_size(self) -> (i32, i32) {
        match self {
            Self::Square => (16, 16),
            Self::Rectangle => (32, 16),
        }
    }

    /// Marker snap points as fractions of a cell.
    pub fn snap_points(self) -> &'static [(f32, f32)] {
        match self {
            Self::Square => &[(0.5, 0.5)],
            Self::Rectangle => &[(0.25, 0.5), (0.75, 0.5)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub preset: GridPreset,
    pub tile_width: i32,
    pub tile_height: i32,
    pub cols: i32,
    pub rows: i32,
    /// Prevents preset changes once markers are placed.
    pub locked: bool,
    pub auto_expand_grid: bool,
    /// Distance in cells from the upper bound that triggers expansion.
    pub expansion_threshold: i32,
    /// Multiplicative growth applied per expansion.
    pub expansion_factor: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        let (tile_width, tile_height) = GridPreset::Square.tile_size();
        Self {
            preset: GridPreset::Square,
            tile_width,
            tile_height,
            cols: 256,
            rows: 256,
            locked: false,
            auto_expand_grid: true,
            expansion_threshold: 3,
            expansion_factor: 1.5,
        }
    }
}

impl GridConfig {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.cols && y < self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.cols.max(0) as usize * self.rows.max(0) as usize
    }

    pub fn apply_preset(&mut self, preset: GridPreset) {
        self.preset = preset;
        (self.tile_width, self.tile_height) = preset.tile_size();
    }

    /// Grows `cols`/`rows` when `(x, y)` sits within the expansion threshold
    /// of the upper bound. Returns `true` if the grid grew.
    ///
    /// Only upper bounds move, so existing coordinates stay valid.
    pub fn expand_to_fit(&mut self, x: i32, y: i32) -> bool {
        if !self.auto_expand_grid {
            return false;
        }
        let threshold = self.expansion_threshold.max(0);
        let factor = self.expansion_factor;
        let grow = |current: i32, coord: i32| -> i32 {
            if coord < current - threshold {
                return current;
            }
            let scaled = (current as f32 * factor).ceil() as i32;
            let needed = coord.saturating_add(threshold).saturating_add(1);
            // Factors <= 1 would never make room; fall back to the margin.
            scaled.max(needed).max(current + 1).min(MAX_GRID_DIMENSION)
        };
        let cols = grow(self.cols, x);
        let rows = grow(self.rows, y);
        let changed = cols != self.cols || rows != self.rows;
        if changed {
            log::debug!(
                "Grid expanded from {}x{} to {}x{}",
                self.cols,
                self.rows,
                cols,
                rows
            );
            self.cols = cols;
            self.rows = rows;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_far_from_bounds_does_not_expand() {
        let mut grid = GridConfig {
            cols: 20,
            rows: 20,
            ..Default::default()
        };
        assert!(!grid.expand_to_fit(5, 5));
        assert_eq!((grid.cols, grid.rows), (20, 20));
    }

    #[test]
    fn edge_near_right_bound_grows_cols_only() {
        let mut grid = GridConfig {
            cols: 20,
            rows: 20,
            ..Default::default()
        };
        assert!(grid.expand_to_fit(18, 5));
        assert_eq!(grid.cols, 30);
        assert_eq!(grid.rows, 20);
    }

    #[test]
    fn expansion_keeps_margin_for_far_edges() {
        let mut grid = GridConfig {
            cols: 10,
            rows: 10,
            ..Default::default()
        };
        grid.expand_to_fit(40, 0);
        assert!(grid.cols >= 44);
    }

    #[test]
    fn disabled_expansion_is_noop() {
        let mut grid = GridConfig {
            cols: 10,
            rows: 10,
            auto_expand_grid: false,
            ..Default::default()
        };
        assert!(!grid.expand_to_fit(9, 9));
    }

    #[test]
    fn presets_set_tile_size() {
        let mut grid = GridConfig::default();
        grid.apply_preset(GridPreset::Rectangle);
        assert_eq!((grid.tile_width, grid.tile_height), (32, 16));
        assert_eq!(GridPreset::Rectangle.snap_points().len(), 2);
    }
}
