//! Run-length encoded tile grid.
//!
//! Each painted row is a [`TileRow`] holding sorted, non-overlapping
//! [`TileRun`]s. Two runs that touch never share a tile id, and runs never
//! store [`EMPTY_TILE`]; every mutation goes through [`TileRow::set`], which
//! re-establishes these invariants before returning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Palette index of a painted tile.
pub type TileId = u32;

/// The reserved "no tile" id.
pub const EMPTY_TILE: TileId = 0;

/// A maximal horizontal span of equal tiles: `count` cells starting at `start_x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRun {
    pub start_x: i32,
    pub count: i32,
    pub tile_id: TileId,
}

impl TileRun {
    pub const fn new(start_x: i32, count: i32, tile_id: TileId) -> Self {
        Self {
            start_x,
            count,
            tile_id,
        }
    }

    /// One past the last covered x, clamped to `i32::MAX`.
    pub const fn end(&self) -> i32 {
        self.start_x.saturating_add(self.count)
    }

    pub const fn contains(&self, x: i32) -> bool {
        x >= self.start_x && x < self.end()
    }
}

/// A single recorded cell write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    pub x: i32,
    pub y: i32,
    pub old_tile: TileId,
    pub new_tile: TileId,
}

impl TileChange {
    pub const fn new(x: i32, y: i32, old_tile: TileId, new_tile: TileId) -> Self {
        Self {
            x,
            y,
            old_tile,
            new_tile,
        }
    }
}

/// One row of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRow {
    pub y: i32,
    runs: Vec<TileRun>,
}

impl TileRow {
    pub fn new(y: i32) -> Self {
        Self { y, runs: Vec::new() }
    }

    /// Builds a row from arbitrary runs, normalizing them.
    ///
    /// Runs are sorted, empty and zero-length runs are dropped, later runs
    /// win where runs overlap, and touching equal runs are merged.
    pub fn from_runs(y: i32, runs: impl IntoIterator<Item = TileRun>) -> Self {
        let mut row = Self::new(y);
        for run in runs {
            if run.count <= 0 || run.tile_id == EMPTY_TILE {
                continue;
            }
            row.fill_span(run.start_x, run.count, run.tile_id);
        }
        row
    }

    pub fn runs(&self) -> &[TileRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Index of the first run whose end lies beyond `x`.
    fn lower_bound(&self, x: i32) -> usize {
        self.runs.partition_point(|run| run.end() <= x)
    }

    pub fn get(&self, x: i32) -> TileId {
        match self.runs.get(self.lower_bound(x)) {
            Some(run) if run.contains(x) => run.tile_id,
            _ => EMPTY_TILE,
        }
    }

    /// Sets a single cell, returning the previous tile when it changed.
    pub fn set(&mut self, x: i32, tile_id: TileId) -> Option<TileId> {
        let previous = self.get(x);
        if previous == tile_id {
            return None;
        }
        self.fill_span(x, 1, tile_id).then_some(previous)
    }

    /// Overwrites `[start_x, start_x + count)` with `tile_id`.
    ///
    /// A span reaching past `i32::MAX` is clipped there. Returns `false`
    /// when nothing is left to write.
    fn fill_span(&mut self, start_x: i32, count: i32, tile_id: TileId) -> bool {
        let end = start_x.saturating_add(count);
        if end <= start_x {
            return false;
        }
        let first = self.lower_bound(start_x);
        let last = self.runs.partition_point(|run| run.start_x < end);

        let mut replacement = Vec::with_capacity(3);
        if let Some(head) = self.runs.get(first).filter(|r| r.start_x < start_x && first < last) {
            replacement.push(TileRun::new(head.start_x, start_x - head.start_x, head.tile_id));
        }
        if tile_id != EMPTY_TILE {
            replacement.push(TileRun::new(start_x, end - start_x, tile_id));
        }
        if last > first {
            let tail = self.runs[last - 1];
            if tail.end() > end {
                replacement.push(TileRun::new(end, tail.end() - end, tail.tile_id));
            }
        }

        self.runs.splice(first..last, replacement);
        self.coalesce_around(first);
        true
    }

    /// Merges touching equal runs in the neighbourhood of `index`.
    fn coalesce_around(&mut self, index: usize) {
        let lo = index.saturating_sub(1);
        let hi = (index + 4).min(self.runs.len());
        let mut i = lo;
        let mut end = hi;
        while i + 1 < end {
            let (a, b) = (self.runs[i], self.runs[i + 1]);
            if a.tile_id == b.tile_id && a.end() == b.start_x {
                self.runs[i].count = b.end() - a.start_x;
                self.runs.remove(i + 1);
                end -= 1;
            } else {
                i += 1;
            }
        }
    }

    /// Number of cells painted with `tile_id`.
    pub fn count_tiles(&self, tile_id: TileId) -> usize {
        self.runs
            .iter()
            .filter(|run| run.tile_id == tile_id)
            .map(|run| run.count as usize)
            .sum()
    }

    /// Checks the run-list invariants. Used by tests and debug assertions.
    pub fn is_normalized(&self) -> bool {
        let runs_valid = self
            .runs
            .iter()
            .all(|run| run.count > 0 && run.tile_id != EMPTY_TILE);
        let pairs_valid = self.runs.windows(2).all(|pair| {
            let (a, b) = (pair[0], pair[1]);
            a.end() <= b.start_x && !(a.end() == b.start_x && a.tile_id == b.tile_id)
        });
        runs_valid && pairs_valid
    }
}

/// Inclusive bounding rectangle in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl CellBounds {
    pub const fn from_cell(x: i32, y: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Grows an optional bounds accumulator by one cell.
pub(crate) fn extend_bounds(bounds: &mut Option<CellBounds>, x: i32, y: i32) {
    match bounds {
        Some(b) => b.include(x, y),
        None => *bounds = Some(CellBounds::from_cell(x, y)),
    }
}

/// All painted rows, keyed by `y`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileLayer {
    rows: BTreeMap<i32, TileRow>,
}

impl TileLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, x: i32, y: i32) -> TileId {
        self.rows.get(&y).map_or(EMPTY_TILE, |row| row.get(x))
    }

    /// Writes one cell. Returns the previous tile if the cell changed.
    pub fn set(&mut self, x: i32, y: i32, tile_id: TileId) -> Option<TileId> {
        let row = self.rows.entry(y).or_insert_with(|| TileRow::new(y));
        let previous = row.set(x, tile_id);
        debug_assert!(row.is_normalized(), "row {y} lost its run invariants");
        if row.is_empty() {
            self.rows.remove(&y);
        }
        previous
    }

    /// Replaces a whole row. Empty rows are dropped.
    pub fn insert_row(&mut self, row: TileRow) {
        if row.is_empty() {
            self.rows.remove(&row.y);
        } else {
            self.rows.insert(row.y, row);
        }
    }

    pub fn row(&self, y: i32) -> Option<&TileRow> {
        self.rows.get(&y)
    }

    /// Rows in ascending `y` order.
    pub fn rows(&self) -> impl Iterator<Item = &TileRow> {
        self.rows.values()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Cells painted with `tile_id`, in row-major order.
    pub fn cells_with_tile(&self, tile_id: TileId) -> Vec<(i32, i32)> {
        self.rows
            .values()
            .flat_map(|row| {
                row.runs()
                    .iter()
                    .filter(move |run| run.tile_id == tile_id)
                    .flat_map(move |run| (run.start_x..run.end()).map(move |x| (x, row.y)))
            })
            .collect()
    }

    pub fn count_tiles(&self, tile_id: TileId) -> usize {
        self.rows.values().map(|row| row.count_tiles(tile_id)).sum()
    }

    /// Bounding rectangle of every painted cell, or `None` when nothing is painted.
    pub fn content_bounds(&self) -> Option<CellBounds> {
        let mut bounds = None;
        for row in self.rows.values() {
            if let (Some(first), Some(last)) = (row.runs().first(), row.runs().last()) {
                extend_bounds(&mut bounds, first.start_x, row.y);
                extend_bounds(&mut bounds, last.end() - 1, row.y);
            }
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(row: &TileRow) -> Vec<(i32, i32, TileId)> {
        row.runs()
            .iter()
            .map(|r| (r.start_x, r.count, r.tile_id))
            .collect()
    }

    #[test]
    fn runs_reaching_past_i32_max_are_clipped() {
        let row = TileRow::from_runs(0, [TileRun::new(i32::MAX - 1, 5, 1)]);
        assert_eq!(runs(&row), vec![(i32::MAX - 1, 1, 1)]);
        assert_eq!(row.get(i32::MAX - 1), 1);

        let mut row = TileRow::new(0);
        assert_eq!(row.set(i32::MAX, 1), None);
        assert!(row.is_empty());
    }

    #[test]
    fn get_on_empty_row_is_empty() {
        let row = TileRow::new(0);
        assert_eq!(row.get(5), EMPTY_TILE);
    }

    #[test]
    fn adjacent_writes_merge_into_one_run() {
        let mut row = TileRow::new(0);
        row.set(2, 1);
        row.set(3, 1);
        row.set(1, 1);
        assert_eq!(runs(&row), vec![(1, 3, 1)]);
    }

    #[test]
    fn filling_a_gap_merges_both_sides() {
        let mut row = TileRow::new(0);
        row.set(0, 4);
        row.set(2, 4);
        assert_eq!(runs(&row), vec![(0, 1, 4), (2, 1, 4)]);
        row.set(1, 4);
        assert_eq!(runs(&row), vec![(0, 3, 4)]);
    }

    #[test]
    fn interior_write_splits_run() {
        let mut row = TileRow::new(0);
        for x in 0..5 {
            row.set(x, 1);
        }
        assert_eq!(row.set(2, 2), Some(1));
        assert_eq!(runs(&row), vec![(0, 2, 1), (2, 1, 2), (3, 2, 1)]);
        assert!(row.is_normalized());
    }

    #[test]
    fn edge_write_shrinks_run() {
        let mut row = TileRow::new(0);
        for x in 0..4 {
            row.set(x, 1);
        }
        row.set(0, 3);
        row.set(3, 3);
        assert_eq!(runs(&row), vec![(0, 1, 3), (1, 2, 1), (3, 1, 3)]);
    }

    #[test]
    fn erase_removes_cells() {
        let mut row = TileRow::new(0);
        for x in 0..3 {
            row.set(x, 1);
        }
        row.set(1, EMPTY_TILE);
        assert_eq!(runs(&row), vec![(0, 1, 1), (2, 1, 1)]);
        row.set(0, EMPTY_TILE);
        row.set(2, EMPTY_TILE);
        assert!(row.is_empty());
    }

    #[test]
    fn rewriting_same_tile_reports_no_change() {
        let mut row = TileRow::new(0);
        assert_eq!(row.set(7, 2), Some(EMPTY_TILE));
        assert_eq!(row.set(7, 2), None);
        assert_eq!(row.set(8, EMPTY_TILE), None);
    }

    #[test]
    fn restoring_split_cell_rejoins_run() {
        let mut row = TileRow::new(0);
        for x in 0..5 {
            row.set(x, 1);
        }
        row.set(2, 9);
        row.set(2, 1);
        assert_eq!(runs(&row), vec![(0, 5, 1)]);
    }

    #[test]
    fn pseudo_random_writes_keep_invariants() {
        // Deterministic LCG so the sequence is reproducible.
        let mut state: u32 = 0x1234_5678;
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            state >> 8
        };
        let mut row = TileRow::new(0);
        let mut shadow = [EMPTY_TILE; 64];
        for _ in 0..2_000 {
            let x = (next() % 64) as i32;
            let tile = next() % 4;
            row.set(x, tile);
            shadow[x as usize] = tile;
            assert!(row.is_normalized(), "invariants broken: {:?}", row.runs());
        }
        for (x, expected) in shadow.iter().enumerate() {
            assert_eq!(row.get(x as i32), *expected);
        }
    }

    #[test]
    fn negative_coordinates_are_supported() {
        let mut row = TileRow::new(-3);
        row.set(-2, 1);
        row.set(-1, 1);
        row.set(0, 1);
        assert_eq!(runs(&row), vec![(-2, 3, 1)]);
        assert_eq!(row.get(-2), 1);
        assert_eq!(row.get(-3), EMPTY_TILE);
    }

    #[test]
    fn from_runs_normalizes_input() {
        let row = TileRow::from_runs(
            0,
            [
                TileRun::new(5, 2, 1),
                TileRun::new(0, 3, 1),
                TileRun::new(3, 2, 1),
                TileRun::new(10, 0, 2),
                TileRun::new(12, 2, EMPTY_TILE),
            ],
        );
        assert_eq!(runs(&row), vec![(0, 7, 1)]);
    }

    #[test]
    fn from_runs_later_runs_win_overlaps() {
        let row = TileRow::from_runs(0, [TileRun::new(0, 6, 1), TileRun::new(2, 2, 2)]);
        assert_eq!(runs(&row), vec![(0, 2, 1), (2, 2, 2), (4, 2, 1)]);
    }

    #[test]
    fn layer_drops_rows_that_become_empty() {
        let mut layer = TileLayer::new();
        layer.set(1, 4, 2);
        assert_eq!(layer.row_count(), 1);
        layer.set(1, 4, EMPTY_TILE);
        assert_eq!(layer.row_count(), 0);
        assert_eq!(layer.get(1, 4), EMPTY_TILE);
    }

    #[test]
    fn layer_content_bounds() {
        let mut layer = TileLayer::new();
        assert_eq!(layer.content_bounds(), None);
        layer.set(3, 1, 1);
        layer.set(7, 1, 2);
        layer.set(-1, 5, 1);
        let bounds = layer.content_bounds().unwrap();
        assert_eq!(
            bounds,
            CellBounds {
                min_x: -1,
                min_y: 1,
                max_x: 7,
                max_y: 5
            }
        );
        assert_eq!(bounds.width(), 9);
        assert_eq!(bounds.height(), 5);
    }

    #[test]
    fn layer_tile_usage() {
        let mut layer = TileLayer::new();
        for x in 0..3 {
            layer.set(x, 0, 2);
        }
        layer.set(0, 1, 2);
        layer.set(1, 1, 3);
        assert_eq!(layer.count_tiles(2), 4);
        assert_eq!(layer.cells_with_tile(2), vec![(0, 0), (1, 0), (2, 0), (0, 1)]);
    }
}
