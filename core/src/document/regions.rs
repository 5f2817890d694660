//! Connected-component analysis over the wall graph.
//!
//! Two orthogonally adjacent cells are connected unless the edge between
//! them is a [`Wall`](EdgeState::Wall); doors connect. All flood fills use an
//! explicit stack and scan in row-major order, so results are deterministic.

use std::collections::HashSet;

use fixedbitset::FixedBitSet;

use super::MapDocument;
use crate::map::{
    Cell, CellBounds, DetectedRegion, EdgeChange, EdgeId, EdgeSide, EdgeState, Room, RoomId,
    TileChange, TileId,
};

impl MapDocument {
    fn is_wall_between(&self, cell: Cell, side: EdgeSide) -> bool {
        self.edges.get(EdgeId::from_side(cell, side)) == EdgeState::Wall
    }

    /// Flood-fills every unassigned cell inside the grid into components.
    ///
    /// A component is enclosed when none of its cells can step through a
    /// non-wall edge onto a cell outside the grid or onto a cell that
    /// belongs to a room. Components come back ordered by their first cell
    /// in `(y, x)` order.
    pub fn detect_all_enclosed_rooms(&self) -> Vec<DetectedRegion> {
        let (cols, rows) = (self.grid.cols, self.grid.rows);
        if cols <= 0 || rows <= 0 {
            return Vec::new();
        }
        let index = |(x, y): Cell| y as usize * cols as usize + x as usize;

        let mut visited = FixedBitSet::with_capacity(self.grid.cell_count());
        for cell in self.cell_rooms.keys() {
            if self.grid.contains(cell.0, cell.1) {
                visited.insert(index(*cell));
            }
        }

        let mut regions = Vec::new();
        let mut stack = Vec::new();
        for y in 0..rows {
            for x in 0..cols {
                let start = (x, y);
                if visited.contains(index(start)) {
                    continue;
                }
                visited.insert(index(start));
                stack.push(start);

                let mut cells = Vec::new();
                let mut bounds = CellBounds::from_cell(x, y);
                let mut is_enclosed = true;
                while let Some(cell) = stack.pop() {
                    cells.push(cell);
                    bounds.include(cell.0, cell.1);
                    for side in EdgeSide::ALL {
                        if self.is_wall_between(cell, side) {
                            continue;
                        }
                        let neighbor = side.neighbor(cell);
                        if !self.grid.contains(neighbor.0, neighbor.1)
                            || self.cell_rooms.contains_key(&neighbor)
                        {
                            is_enclosed = false;
                            continue;
                        }
                        let neighbor_index = index(neighbor);
                        if !visited.contains(neighbor_index) {
                            visited.insert(neighbor_index);
                            stack.push(neighbor);
                        }
                    }
                }
                cells.sort_unstable_by_key(|(x, y)| (*y, *x));
                regions.push(DetectedRegion {
                    cells,
                    bounding_box: bounds,
                    is_enclosed,
                });
            }
        }

        log::info!(
            "Detected {} regions ({} enclosed)",
            regions.len(),
            regions.iter().filter(|r| r.is_enclosed).count()
        );
        regions
    }

    /// Creates a room owning `cells`, overwriting any previous assignment.
    ///
    /// With `generate_walls`, perimeter walls are placed around the result.
    pub fn create_room_from_cells(
        &mut self,
        cells: &[Cell],
        name: impl Into<String>,
        generate_walls: bool,
    ) -> RoomId {
        let id = self.generate_room_id();
        let color = Room::default_color(self.rooms.len());
        self.add_room(Room::new(id.clone(), name, color));
        for cell in cells {
            self.set_cell_room(*cell, &id);
        }
        if generate_walls {
            self.generate_room_perimeter_walls(&id);
        }
        id
    }

    /// Splits every room whose cells form more than one connected component.
    ///
    /// The component holding the room's first `(y, x)` cell keeps the id.
    /// Every other component becomes a new room named `"<name> (2)"`,
    /// `"<name> (3)"`, … that copies color, tags and parent group.
    ///
    /// Returns the number of rooms that were split.
    pub fn split_disconnected_rooms(&mut self) -> usize {
        let room_ids: Vec<RoomId> = self.rooms.iter().map(|room| room.id.clone()).collect();
        let mut split = 0;
        for room_id in room_ids {
            let cells = self.room_cells(&room_id);
            let components = self.room_components(&room_id, &cells);
            if components.len() < 2 {
                continue;
            }
            let Some(template) = self.find_room(room_id.as_str()).cloned() else {
                continue;
            };
            for (n, component) in components.into_iter().enumerate().skip(1) {
                let new_id = self.generate_room_id();
                let mut room = Room::new(
                    new_id.clone(),
                    format!("{} ({})", template.name, n + 1),
                    template.color,
                );
                room.tags.clone_from(&template.tags);
                room.parent_region_group_id
                    .clone_from(&template.parent_region_group_id);
                self.add_room(room);
                for cell in component {
                    self.set_cell_room(cell, &new_id);
                }
            }
            log::info!("Split room {room_id} into disconnected parts");
            split += 1;
        }
        split
    }

    /// Connected components of one room's cells, ordered by first cell.
    fn room_components(&self, room_id: &RoomId, cells: &[Cell]) -> Vec<Vec<Cell>> {
        let mut visited: HashSet<Cell> = HashSet::with_capacity(cells.len());
        let mut components = Vec::new();
        let mut stack = Vec::new();
        for &start in cells {
            if !visited.insert(start) {
                continue;
            }
            stack.push(start);
            let mut component = Vec::new();
            while let Some(cell) = stack.pop() {
                component.push(cell);
                for side in EdgeSide::ALL {
                    let neighbor = side.neighbor(cell);
                    if self.cell_rooms.get(&neighbor) != Some(room_id)
                        || self.is_wall_between(cell, side)
                    {
                        continue;
                    }
                    if visited.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
            component.sort_unstable_by_key(|(x, y)| (*y, *x));
            components.push(component);
        }
        components
    }

    /// Walls off every boundary edge of `room_id`, keeping existing doors.
    ///
    /// Returns the edges that changed.
    pub fn generate_room_perimeter_walls(&mut self, room_id: &RoomId) -> Vec<EdgeChange> {
        let cells = self.room_cells(room_id);
        let mut changes = Vec::new();
        for &cell in cells.iter() {
            for side in EdgeSide::ALL {
                let neighbor = side.neighbor(cell);
                if self.cell_rooms.get(&neighbor) == Some(room_id) {
                    continue;
                }
                let edge = EdgeId::from_side(cell, side);
                let old_state = self.edges.get(edge);
                if old_state == EdgeState::None {
                    self.set_edge_state(edge, EdgeState::Wall);
                    changes.push(EdgeChange::new(edge, old_state, EdgeState::Wall));
                }
            }
        }
        changes
    }

    /// Cells a fill from `start` would repaint with `tile_id`.
    ///
    /// The fill spreads through cells holding the start tile, stays inside
    /// the grid and does not cross walls.
    pub fn compute_tile_fill(&self, start: Cell, tile_id: TileId) -> Vec<TileChange> {
        if !self.grid.contains(start.0, start.1) {
            return Vec::new();
        }
        let target = self.tiles.get(start.0, start.1);
        if target == tile_id {
            return Vec::new();
        }
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        let mut changes = Vec::new();
        while let Some(cell) = stack.pop() {
            changes.push(TileChange::new(cell.0, cell.1, target, tile_id));
            for side in EdgeSide::ALL {
                let neighbor = side.neighbor(cell);
                if !self.grid.contains(neighbor.0, neighbor.1)
                    || self.tiles.get(neighbor.0, neighbor.1) != target
                    || self.is_wall_between(cell, side)
                {
                    continue;
                }
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        changes.sort_unstable_by_key(|change| (change.y, change.x));
        changes
    }
}
