//! The map document: every store plus the rules that keep them consistent.
//!
//! All mutation goes through [`MapDocument`] methods so that the dirty flag
//! and the per-room cell cache can never fall out of sync with the data.

mod markers;
mod regions;
mod rooms;
mod snapshot;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use snapshot::{DocumentSnapshot, SnapshotError};

use crate::abstract_editor::Editable;
use crate::map::{
    Cell, CellBounds, Color, EMPTY_TILE, EdgeId, EdgeMap, EdgeState, GridConfig, GridPreset,
    IconData, IconLibrary, Marker, Palette, RegionGroup, Room, RoomId, TileChange, TileId,
    TileLayer, TileType,
};

/// Free-form document information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// A palette entry removed together with the tiles that used it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedPaletteColor {
    pub index: usize,
    pub entry: TileType,
    /// Cells repainted with the replacement tile, in row-major order.
    pub replaced: Vec<TileChange>,
}

#[derive(Debug, Default)]
pub struct MapDocument {
    metadata: Metadata,
    grid: GridConfig,
    palette: Palette,
    tiles: TileLayer,
    edges: EdgeMap,
    rooms: Vec<Room>,
    region_groups: Vec<RegionGroup>,
    cell_rooms: HashMap<Cell, RoomId>,
    markers: Vec<Marker>,
    icons: IconLibrary,
    /// Sorted cells per room, filled lazily by [`room_cells`](Self::room_cells).
    room_cell_cache: RefCell<HashMap<RoomId, Arc<[Cell]>>>,
    dirty: bool,
}

impl Editable for MapDocument {
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl MapDocument {
    /// An empty document with the default palette.
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            ..Default::default()
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        if self.metadata != metadata {
            self.metadata = metadata;
            self.dirty = true;
        }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridConfig {
        self.dirty = true;
        &mut self.grid
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    pub fn edges(&self) -> &EdgeMap {
        &self.edges
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn icons(&self) -> &IconLibrary {
        &self.icons
    }

    // ---- dirty flag -------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after a successful save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // ---- tiles ------------------------------------------------------------

    pub fn get_tile_at(&self, x: i32, y: i32) -> TileId {
        self.tiles.get(x, y)
    }

    /// Paints one cell. Returns `true` if the cell changed.
    pub fn set_tile_at(&mut self, x: i32, y: i32, tile_id: TileId) -> bool {
        let changed = self.tiles.set(x, y, tile_id).is_some();
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Applies recorded tile writes, taking `new_tile` of each change.
    pub fn apply_tile_changes<'a>(&mut self, changes: impl IntoIterator<Item = &'a TileChange>) {
        for change in changes {
            self.set_tile_at(change.x, change.y, change.new_tile);
        }
    }

    /// Reverts recorded tile writes, last change first.
    pub fn revert_tile_changes<'a>(
        &mut self,
        changes: impl DoubleEndedIterator<Item = &'a TileChange>,
    ) {
        for change in changes.rev() {
            self.set_tile_at(change.x, change.y, change.old_tile);
        }
    }

    /// Bounding rectangle of all authored content: tiles, edges and markers.
    ///
    /// `None` means the document is empty.
    pub fn calculate_content_bounds(&self) -> Option<CellBounds> {
        let mut bounds = self.tiles.content_bounds();
        for other in [self.edges.content_bounds(), self.marker_bounds()] {
            bounds = match (bounds, other) {
                (Some(a), Some(b)) => Some(a.union(b)),
                (a, b) => a.or(b),
            };
        }
        bounds
    }

    // ---- edges ------------------------------------------------------------

    pub fn get_edge_state(&self, edge: EdgeId) -> EdgeState {
        self.edges.get(edge)
    }

    /// Sets an edge and returns its previous state.
    ///
    /// Placing a wall or door near the upper grid bound grows the grid when
    /// auto-expansion is enabled.
    pub fn set_edge_state(&mut self, edge: EdgeId, state: EdgeState) -> EdgeState {
        let previous = self.edges.set(edge, state);
        if previous != state {
            self.dirty = true;
        }
        if state != EdgeState::None {
            let ((x1, y1), (x2, y2)) = edge.cells();
            let grew_first = self.grid.expand_to_fit(x1, y1);
            let grew_second = self.grid.expand_to_fit(x2, y2);
            if grew_first || grew_second {
                self.dirty = true;
            }
        }
        previous
    }

    /// Next state in the `None → Wall → Door → None` cycle.
    pub const fn cycle_edge_state(state: EdgeState) -> EdgeState {
        state.cycle()
    }

    // ---- grid presets -----------------------------------------------------

    /// The preset may only change while no markers are placed.
    pub fn can_change_grid_preset(&self) -> bool {
        self.markers.is_empty() && !self.grid.locked
    }

    /// Switches the cell shape. Returns `false` if the preset is locked.
    pub fn apply_grid_preset(&mut self, preset: GridPreset) -> bool {
        if !self.can_change_grid_preset() {
            log::debug!("Grid preset change to {preset:?} refused: markers placed");
            return false;
        }
        if self.grid.preset != preset {
            self.grid.apply_preset(preset);
            self.dirty = true;
        }
        true
    }

    pub fn marker_snap_points(&self) -> &'static [(f32, f32)] {
        self.grid.preset.snap_points()
    }

    // ---- palette ----------------------------------------------------------

    pub fn find_palette_entry(&self, id: TileId) -> Option<&TileType> {
        self.palette.find(id)
    }

    pub fn add_palette_color(&mut self, name: impl Into<String>, color: Color) -> TileId {
        self.dirty = true;
        self.palette.add(name, color)
    }

    /// Re-inserts a palette entry at `index`, replacing any entry with its id.
    pub fn insert_palette_entry(&mut self, index: usize, entry: TileType) {
        self.palette.insert_at(index, entry);
        self.dirty = true;
    }

    pub fn update_palette_color(&mut self, id: TileId, name: &str, color: Color) -> bool {
        let updated = self.palette.update(id, name, color);
        if updated {
            self.dirty = true;
        } else {
            log::debug!("Palette entry {id} not found, update skipped");
        }
        updated
    }

    /// Removes a palette entry and repaints every cell using it with
    /// `replacement` (tile 0 when `None` or when it names the removed id).
    ///
    /// Returns `None` for the empty entry or an unknown id.
    pub fn remove_palette_color(
        &mut self,
        id: TileId,
        replacement: Option<TileId>,
    ) -> Option<RemovedPaletteColor> {
        let replacement = replacement.filter(|r| *r != id).unwrap_or(EMPTY_TILE);
        let Some((index, entry)) = self.palette.remove(id) else {
            log::debug!("Palette entry {id} not removable");
            return None;
        };
        let replaced: Vec<TileChange> = self
            .tiles
            .cells_with_tile(id)
            .into_iter()
            .map(|(x, y)| TileChange::new(x, y, id, replacement))
            .collect();
        self.apply_tile_changes(&replaced);
        self.dirty = true;
        Some(RemovedPaletteColor {
            index,
            entry,
            replaced,
        })
    }

    pub fn count_tiles_using(&self, id: TileId) -> usize {
        self.tiles.count_tiles(id)
    }

    // ---- icons ------------------------------------------------------------

    pub fn find_icon(&self, name: &str) -> Option<&IconData> {
        self.icons.get(name)
    }

    /// Adds or replaces an icon, returning the replaced data.
    pub fn add_icon(&mut self, name: impl Into<String>, icon: IconData) -> Option<IconData> {
        self.dirty = true;
        self.icons.insert(name, icon)
    }

    /// Removes an icon. Markers keep their icon name.
    pub fn remove_icon(&mut self, name: &str) -> Option<IconData> {
        let removed = self.icons.remove(name);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Renames an icon and every marker reference to it.
    pub fn rename_icon(&mut self, old: &str, new: &str) -> bool {
        if !self.icons.rename(old, new) {
            log::debug!("Icon rename {old} -> {new} skipped");
            return false;
        }
        self.update_marker_icon_names(old, new);
        self.dirty = true;
        true
    }
}
