//! Rooms, region groups and detected regions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::ids::{Cell, RegionGroupId, RoomId};
use super::tiles::CellBounds;

/// A named room. Its shape lives in the document's cell assignment map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub color: Color,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub parent_region_group_id: Option<RegionGroupId>,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            notes: String::new(),
            tags: BTreeSet::new(),
            parent_region_group_id: None,
        }
    }

    /// Default fill color for the `index`-th generated room.
    pub fn default_color(index: usize) -> Color {
        const COLORS: [Color; 8] = [
            Color::rgba(0.40, 0.60, 0.90, 0.35),
            Color::rgba(0.90, 0.55, 0.35, 0.35),
            Color::rgba(0.45, 0.80, 0.45, 0.35),
            Color::rgba(0.85, 0.40, 0.70, 0.35),
            Color::rgba(0.95, 0.85, 0.35, 0.35),
            Color::rgba(0.40, 0.85, 0.85, 0.35),
            Color::rgba(0.65, 0.50, 0.90, 0.35),
            Color::rgba(0.80, 0.80, 0.80, 0.35),
        ];
        COLORS[index % COLORS.len()]
    }
}

/// Editable room fields captured for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomProperties {
    pub name: String,
    pub color: Color,
    pub notes: String,
    pub tags: BTreeSet<String>,
    pub parent_region_group_id: Option<RegionGroupId>,
}

impl RoomProperties {
    pub fn capture(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            color: room.color,
            notes: room.notes.clone(),
            tags: room.tags.clone(),
            parent_region_group_id: room.parent_region_group_id.clone(),
        }
    }

    pub fn apply_to(&self, room: &mut Room) {
        room.name.clone_from(&self.name);
        room.color = self.color;
        room.notes.clone_from(&self.notes);
        room.tags.clone_from(&self.tags);
        room.parent_region_group_id.clone_from(&self.parent_region_group_id);
    }
}

/// A flat grouping of rooms (an area, a biome, a floor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionGroup {
    pub id: RegionGroupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl RegionGroup {
    pub fn new(id: RegionGroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            tags: BTreeSet::new(),
        }
    }
}

/// Editable region-group fields captured for undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionProperties {
    pub name: String,
    pub description: String,
    pub tags: BTreeSet<String>,
}

impl RegionProperties {
    pub fn capture(region: &RegionGroup) -> Self {
        Self {
            name: region.name.clone(),
            description: region.description.clone(),
            tags: region.tags.clone(),
        }
    }

    pub fn apply_to(&self, region: &mut RegionGroup) {
        region.name.clone_from(&self.name);
        region.description.clone_from(&self.description);
        region.tags.clone_from(&self.tags);
    }
}

/// A connected component found by room detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedRegion {
    /// Cells in row-major `(y, x)` order.
    pub cells: Vec<Cell>,
    pub bounding_box: CellBounds,
    /// `true` when no cell can step through a non-wall edge out of the grid
    /// or into a room.
    pub is_enclosed: bool,
}

impl DetectedRegion {
    pub fn contains(&self, cell: Cell) -> bool {
        self.bounding_box.contains(cell.0, cell.1) && self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
