//! Serializable image of a whole document.
//!
//! Persistence layers (JSON, packages, project folders) live outside this
//! crate; they read and write [`DocumentSnapshot`] and must call
//! [`DocumentSnapshot::validate`] on anything loaded from disk.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{MapDocument, Metadata};
use crate::map::limits::{
    MAX_CELL_ASSIGNMENTS, MAX_COORDINATE, MAX_EDGES, MAX_GRID_DIMENSION, MAX_ICONS, MAX_MARKERS,
    MAX_PALETTE_ENTRIES, MAX_REGION_GROUPS, MAX_ROOMS, MAX_TILE_ROWS, MAX_TILE_SIZE,
    MIN_GRID_DIMENSION, MIN_TILE_SIZE,
};
use crate::map::{
    Cell, EMPTY_TILE, EdgeId, EdgeState, GridConfig, IconData, Marker, Palette, RegionGroup,
    Room, RoomId, TileRow, TileRun, TileType, are_adjacent,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("{what} count {count} exceeds limit {limit}")]
    LimitExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },
    #[error("grid size {cols}x{rows} outside {min}..={max}")]
    GridSize {
        cols: i32,
        rows: i32,
        min: i32,
        max: i32,
    },
    #[error("cell ({x}, {y}) assigned to unknown room {room}")]
    UnknownRoom { x: i32, y: i32, room: RoomId },
    #[error("duplicate {what} id {id}")]
    DuplicateId { what: &'static str, id: String },
    #[error("palette has no empty entry (id 0)")]
    MissingEmptyTile,
    #[error("edge {0:?} does not join adjacent cells")]
    InvalidEdge(EdgeId),
    #[error("tile size {width}x{height} outside {min}..={max}")]
    TileSize {
        width: i32,
        height: i32,
        min: i32,
        max: i32,
    },
    #[error("expansion factor {0} must be a finite number greater than 1")]
    ExpansionFactor(f32),
    #[error("tile run {run:?} in row {y} is empty or out of range")]
    InvalidTileRun { y: i32, run: TileRun },
    #[error("{what} at ({x}, {y}) lies outside +/-{max}")]
    CoordinateOutOfRange {
        what: &'static str,
        x: i32,
        y: i32,
        max: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub metadata: Metadata,
    pub grid: GridConfig,
    pub palette: Vec<TileType>,
    pub tiles: Vec<TileRow>,
    /// Walls and doors; `None` edges are never stored.
    pub edges: Vec<(EdgeId, EdgeState)>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub region_groups: Vec<RegionGroup>,
    /// Sorted by `(y, x)`.
    pub cell_assignments: Vec<(Cell, RoomId)>,
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub icons: Vec<(String, IconData)>,
}

fn check_limit(what: &'static str, count: usize, limit: usize) -> Result<(), SnapshotError> {
    if count > limit {
        return Err(SnapshotError::LimitExceeded { what, count, limit });
    }
    Ok(())
}

fn coordinate_in_range(value: i32) -> bool {
    (-MAX_COORDINATE..=MAX_COORDINATE).contains(&value)
}

fn check_cell(what: &'static str, (x, y): Cell) -> Result<(), SnapshotError> {
    if coordinate_in_range(x) && coordinate_in_range(y) {
        return Ok(());
    }
    Err(SnapshotError::CoordinateOutOfRange {
        what,
        x,
        y,
        max: MAX_COORDINATE,
    })
}

/// A stored run must be non-empty and end inside the coordinate range.
fn check_run(y: i32, run: &TileRun) -> Result<(), SnapshotError> {
    let end = run.start_x.checked_add(run.count);
    let valid = run.count > 0
        && coordinate_in_range(run.start_x)
        && end.is_some_and(|end| end - 1 <= MAX_COORDINATE);
    if valid {
        Ok(())
    } else {
        Err(SnapshotError::InvalidTileRun { y, run: *run })
    }
}

fn check_unique<'a>(
    what: &'static str,
    ids: impl IntoIterator<Item = &'a str>,
) -> Result<(), SnapshotError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SnapshotError::DuplicateId {
                what,
                id: id.to_owned(),
            });
        }
    }
    Ok(())
}

impl DocumentSnapshot {
    /// Checks size limits and referential integrity.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let (cols, rows) = (self.grid.cols, self.grid.rows);
        let dimension = MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION;
        if !dimension.contains(&cols) || !dimension.contains(&rows) {
            return Err(SnapshotError::GridSize {
                cols,
                rows,
                min: MIN_GRID_DIMENSION,
                max: MAX_GRID_DIMENSION,
            });
        }
        let (width, height) = (self.grid.tile_width, self.grid.tile_height);
        let tile_size = MIN_TILE_SIZE..=MAX_TILE_SIZE;
        if !tile_size.contains(&width) || !tile_size.contains(&height) {
            return Err(SnapshotError::TileSize {
                width,
                height,
                min: MIN_TILE_SIZE,
                max: MAX_TILE_SIZE,
            });
        }
        let factor = self.grid.expansion_factor;
        if !factor.is_finite() || factor <= 1.0 {
            return Err(SnapshotError::ExpansionFactor(factor));
        }
        check_limit("palette entry", self.palette.len(), MAX_PALETTE_ENTRIES)?;
        check_limit("tile row", self.tiles.len(), MAX_TILE_ROWS)?;
        check_limit("edge", self.edges.len(), MAX_EDGES)?;
        check_limit("room", self.rooms.len(), MAX_ROOMS)?;
        check_limit("region group", self.region_groups.len(), MAX_REGION_GROUPS)?;
        check_limit(
            "cell assignment",
            self.cell_assignments.len(),
            MAX_CELL_ASSIGNMENTS,
        )?;
        check_limit("marker", self.markers.len(), MAX_MARKERS)?;
        check_limit("icon", self.icons.len(), MAX_ICONS)?;

        if !self.palette.iter().any(|entry| entry.id == EMPTY_TILE) {
            return Err(SnapshotError::MissingEmptyTile);
        }
        for row in &self.tiles {
            check_cell("tile row", (0, row.y))?;
            for run in row.runs() {
                check_run(row.y, run)?;
            }
        }
        for (edge, _) in &self.edges {
            let (a, b) = edge.cells();
            check_cell("edge", a)?;
            check_cell("edge", b)?;
            if !are_adjacent(a, b) {
                return Err(SnapshotError::InvalidEdge(*edge));
            }
        }
        for (cell, _) in &self.cell_assignments {
            check_cell("cell assignment", *cell)?;
        }

        check_unique("room", self.rooms.iter().map(|r| r.id.as_str()))?;
        check_unique(
            "region group",
            self.region_groups.iter().map(|g| g.id.as_str()),
        )?;
        check_unique("marker", self.markers.iter().map(|m| m.id.as_str()))?;

        let rooms: HashSet<&str> = self.rooms.iter().map(|r| r.id.as_str()).collect();
        if let Some(((x, y), room)) = self
            .cell_assignments
            .iter()
            .find(|(_, room)| !rooms.contains(room.as_str()))
        {
            return Err(SnapshotError::UnknownRoom {
                x: *x,
                y: *y,
                room: room.clone(),
            });
        }
        Ok(())
    }
}

impl MapDocument {
    pub fn to_snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            metadata: self.metadata.clone(),
            grid: self.grid.clone(),
            palette: self.palette.entries().to_vec(),
            tiles: self.tiles.rows().cloned().collect(),
            edges: self.edges.sorted(),
            rooms: self.rooms.clone(),
            region_groups: self.region_groups.clone(),
            cell_assignments: self.cell_assignments(),
            markers: self.markers.clone(),
            icons: self
                .icons
                .iter()
                .map(|(name, icon)| (name.to_owned(), icon.clone()))
                .collect(),
        }
    }

    /// Validates a snapshot and rebuilds a clean document from it.
    ///
    /// Rows and edges pass through the normalizing setters, so a snapshot
    /// written by a sloppier tool still yields canonical runs and edges.
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        let mut doc = MapDocument::new(snapshot.grid);
        doc.metadata = snapshot.metadata;

        let mut palette = Palette::empty();
        for (index, entry) in snapshot.palette.into_iter().enumerate() {
            palette.insert_at(index, entry);
        }
        doc.palette = palette;

        for row in snapshot.tiles {
            let normalized = TileRow::from_runs(row.y, row.runs().iter().copied());
            doc.tiles.insert_row(normalized);
        }
        for (edge, state) in snapshot.edges {
            let ((x1, y1), (x2, y2)) = edge.cells();
            doc.edges.set(EdgeId::new(x1, y1, x2, y2), state);
        }
        doc.rooms = snapshot.rooms;
        doc.region_groups = snapshot.region_groups;
        doc.cell_rooms = snapshot.cell_assignments.into_iter().collect();
        doc.markers = snapshot.markers;
        for (name, icon) in snapshot.icons {
            doc.icons.insert(name, icon);
        }

        doc.invalidate_all_room_cell_caches();
        doc.dirty = false;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Color, MarkerId};

    fn sample() -> MapDocument {
        let mut doc = MapDocument::new(GridConfig {
            cols: 16,
            rows: 16,
            ..Default::default()
        });
        doc.set_tile_at(1, 1, 1);
        doc.set_tile_at(2, 1, 1);
        doc.set_edge_state(EdgeId::new(1, 1, 1, 2), EdgeState::Wall);
        doc.set_edge_state(EdgeId::new(2, 1, 3, 1), EdgeState::Door);
        let room = doc.create_room_from_cells(&[(1, 1), (2, 1)], "Hall", false);
        doc.add_marker(Marker::new(MarkerId::new("m"), 1.5, 1.5));
        doc.find_marker_mut("m").unwrap().room_id = Some(room);
        doc
    }

    #[test]
    fn snapshot_round_trip_preserves_document() {
        let doc = sample();
        let snapshot = doc.to_snapshot();
        let restored = MapDocument::from_snapshot(snapshot.clone()).unwrap();

        assert_eq!(restored.to_snapshot(), snapshot);
        assert!(!restored.is_dirty());
        assert_eq!(restored.room_cells(&RoomId::new("room_0")).len(), 2);
    }

    #[test]
    fn unknown_room_is_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot
            .cell_assignments
            .push(((5, 5), RoomId::new("ghost")));
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::UnknownRoom { x: 5, y: 5, .. })
        ));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot.grid.cols = MAX_GRID_DIMENSION + 1;
        assert!(matches!(
            MapDocument::from_snapshot(snapshot),
            Err(SnapshotError::GridSize { .. })
        ));
    }

    #[test]
    fn palette_without_empty_entry_is_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot.palette.retain(|entry| entry.id != EMPTY_TILE);
        assert_eq!(snapshot.validate(), Err(SnapshotError::MissingEmptyTile));
    }

    #[test]
    fn duplicate_room_ids_are_rejected() {
        let mut snapshot = sample().to_snapshot();
        let copy = snapshot.rooms[0].clone();
        snapshot.rooms.push(copy);
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::DuplicateId { what: "room", .. })
        ));
    }

    #[test]
    fn stray_edge_is_rejected_without_overflow() {
        let mut snapshot = sample().to_snapshot();
        let stray = EdgeId {
            x1: i32::MIN,
            y1: 0,
            x2: i32::MAX,
            y2: 0,
        };
        snapshot.edges.push((stray, EdgeState::Wall));
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::CoordinateOutOfRange { what: "edge", .. })
        ));

        let mut snapshot = sample().to_snapshot();
        let far_apart = EdgeId {
            x1: 0,
            y1: 0,
            x2: 5,
            y2: 0,
        };
        snapshot.edges.push((far_apart, EdgeState::Wall));
        assert_eq!(snapshot.validate(), Err(SnapshotError::InvalidEdge(far_apart)));
    }

    #[test]
    fn bad_grid_settings_are_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot.grid.tile_width = 0;
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::TileSize { width: 0, .. })
        ));

        let mut snapshot = sample().to_snapshot();
        snapshot.grid.expansion_factor = f32::NAN;
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::ExpansionFactor(_))
        ));
    }

    #[test]
    fn far_cell_assignment_is_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot
            .cell_assignments
            .push(((MAX_COORDINATE + 1, 0), RoomId::new("room_0")));
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::CoordinateOutOfRange { what: "cell assignment", .. })
        ));
    }

    #[test]
    fn loading_normalizes_rows() {
        let mut snapshot = sample().to_snapshot();
        snapshot.tiles = vec![TileRow::from_runs(
            4,
            [TileRun::new(0, 2, 3), TileRun::new(2, 2, 3)],
        )];
        snapshot.palette.push(TileType::new(9, "Extra", Color::WHITE));

        let doc = MapDocument::from_snapshot(snapshot).unwrap();
        assert_eq!(doc.tiles().row(4).unwrap().runs(), &[TileRun::new(0, 4, 3)]);
        assert_eq!(doc.palette().len(), 6);
    }
}
