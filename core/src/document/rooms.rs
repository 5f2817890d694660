//! Room and region-group registries, cell assignment and the room cell cache.

use std::sync::Arc;

use super::MapDocument;
use crate::map::{Cell, RegionGroup, RegionGroupId, Room, RoomId};

impl MapDocument {
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn region_groups(&self) -> &[RegionGroup] {
        &self.region_groups
    }

    /// Number of cells assigned to any room.
    pub fn assigned_cell_count(&self) -> usize {
        self.cell_rooms.len()
    }

    /// Every `(cell, room)` assignment, sorted by `(y, x)`.
    pub fn cell_assignments(&self) -> Vec<(Cell, RoomId)> {
        let mut assignments: Vec<_> = self
            .cell_rooms
            .iter()
            .map(|(cell, room)| (*cell, room.clone()))
            .collect();
        assignments.sort_unstable_by_key(|((x, y), _)| (*y, *x));
        assignments
    }

    // ---- rooms ------------------------------------------------------------

    pub fn find_room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id.as_str() == id)
    }

    /// Mutable access for property edits. Marks the document dirty.
    pub fn find_room_mut(&mut self, id: &str) -> Option<&mut Room> {
        let room = self.rooms.iter_mut().find(|room| room.id.as_str() == id)?;
        self.dirty = true;
        Some(room)
    }

    pub fn room_index(&self, id: &str) -> Option<usize> {
        self.rooms.iter().position(|room| room.id.as_str() == id)
    }

    /// Appends a room. Returns `false` if the id is already taken.
    pub fn add_room(&mut self, room: Room) -> bool {
        let len = self.rooms.len();
        self.insert_room_at(len, room)
    }

    /// Inserts a room at `index` (clamped). Returns `false` if the id is taken.
    pub fn insert_room_at(&mut self, index: usize, room: Room) -> bool {
        if self.find_room(room.id.as_str()).is_some() {
            log::debug!("Room {} already exists", room.id);
            return false;
        }
        self.invalidate_room_cell_cache(&room.id);
        let index = index.min(self.rooms.len());
        self.rooms.insert(index, room);
        self.dirty = true;
        true
    }

    /// Removes a room and all of its cell assignments.
    ///
    /// Returns the room with its former registry index.
    pub fn remove_room(&mut self, id: &str) -> Option<(usize, Room)> {
        let Some(index) = self.room_index(id) else {
            log::debug!("Room {id} not found, remove skipped");
            return None;
        };
        let room = self.rooms.remove(index);
        self.clear_all_cells_for_room(&room.id);
        self.invalidate_room_cell_cache(&room.id);
        self.dirty = true;
        Some((index, room))
    }

    /// Smallest unused `room_<n>` id, probing upward from the room count.
    pub fn generate_room_id(&self) -> RoomId {
        (self.rooms.len()..)
            .map(RoomId::numbered)
            .find(|id| self.find_room(id.as_str()).is_none())
            .unwrap_or_else(|| RoomId::numbered(usize::MAX))
    }

    // ---- region groups ----------------------------------------------------

    pub fn find_region_group(&self, id: &str) -> Option<&RegionGroup> {
        self.region_groups.iter().find(|group| group.id.as_str() == id)
    }

    /// Mutable access for property edits. Marks the document dirty.
    pub fn find_region_group_mut(&mut self, id: &str) -> Option<&mut RegionGroup> {
        let group = self
            .region_groups
            .iter_mut()
            .find(|group| group.id.as_str() == id)?;
        self.dirty = true;
        Some(group)
    }

    /// Appends a region group. Returns `false` if the id is already taken.
    pub fn add_region_group(&mut self, group: RegionGroup) -> bool {
        let len = self.region_groups.len();
        self.insert_region_group_at(len, group)
    }

    pub fn insert_region_group_at(&mut self, index: usize, group: RegionGroup) -> bool {
        if self.find_region_group(group.id.as_str()).is_some() {
            log::debug!("Region group {} already exists", group.id);
            return false;
        }
        let index = index.min(self.region_groups.len());
        self.region_groups.insert(index, group);
        self.dirty = true;
        true
    }

    /// Removes a region group and detaches its rooms.
    ///
    /// Returns the group, its former index and the ids of the rooms that
    /// pointed at it.
    pub fn remove_region_group(&mut self, id: &str) -> Option<(usize, RegionGroup, Vec<RoomId>)> {
        let Some(index) = self
            .region_groups
            .iter()
            .position(|group| group.id.as_str() == id)
        else {
            log::debug!("Region group {id} not found, remove skipped");
            return None;
        };
        let group = self.region_groups.remove(index);
        let mut orphaned = Vec::new();
        for room in &mut self.rooms {
            if room.parent_region_group_id.as_ref() == Some(&group.id) {
                room.parent_region_group_id = None;
                orphaned.push(room.id.clone());
            }
        }
        self.dirty = true;
        Some((index, group, orphaned))
    }

    /// Rooms whose parent is `id`, in registry order.
    pub fn rooms_in_region_group(&self, id: &str) -> Vec<&Room> {
        self.rooms
            .iter()
            .filter(|room| {
                room.parent_region_group_id
                    .as_ref()
                    .is_some_and(|parent| parent.as_str() == id)
            })
            .collect()
    }

    pub fn generate_region_group_id(&self) -> RegionGroupId {
        (self.region_groups.len()..)
            .map(RegionGroupId::numbered)
            .find(|id| self.find_region_group(id.as_str()).is_none())
            .unwrap_or_else(|| RegionGroupId::numbered(usize::MAX))
    }

    // ---- cell assignment --------------------------------------------------

    pub fn get_cell_room(&self, cell: Cell) -> Option<&RoomId> {
        self.cell_rooms.get(&cell)
    }

    /// Assigns `cell` to `room_id`, returning the previous owner.
    ///
    /// Unknown rooms are ignored.
    pub fn set_cell_room(&mut self, cell: Cell, room_id: &RoomId) -> Option<RoomId> {
        if self.find_room(room_id.as_str()).is_none() {
            log::debug!("Room {room_id} not found, cell {cell:?} left unassigned");
            return None;
        }
        let previous = self.cell_rooms.insert(cell, room_id.clone());
        if previous.as_ref() != Some(room_id) {
            if let Some(previous) = &previous {
                self.invalidate_room_cell_cache(previous);
            }
            self.invalidate_room_cell_cache(room_id);
            self.dirty = true;
        }
        previous
    }

    /// Unassigns `cell`, returning its previous owner.
    pub fn clear_cell_room(&mut self, cell: Cell) -> Option<RoomId> {
        let previous = self.cell_rooms.remove(&cell)?;
        self.invalidate_room_cell_cache(&previous);
        self.dirty = true;
        Some(previous)
    }

    /// Restores a recorded assignment: `Some` assigns, `None` clears.
    pub fn restore_cell_room(&mut self, cell: Cell, room_id: Option<&RoomId>) {
        match room_id {
            Some(room_id) => {
                self.set_cell_room(cell, room_id);
            }
            None => {
                self.clear_cell_room(cell);
            }
        }
    }

    /// Removes every assignment to `room_id`. Edges are left untouched.
    ///
    /// Returns the cleared cells sorted by `(y, x)`.
    pub fn clear_all_cells_for_room(&mut self, room_id: &RoomId) -> Vec<Cell> {
        let mut cleared = Vec::new();
        self.cell_rooms.retain(|cell, owner| {
            let keep = owner != room_id;
            if !keep {
                cleared.push(*cell);
            }
            keep
        });
        if !cleared.is_empty() {
            self.invalidate_room_cell_cache(room_id);
            self.dirty = true;
        }
        cleared.sort_unstable_by_key(|(x, y)| (*y, *x));
        cleared
    }

    // ---- cell cache -------------------------------------------------------

    /// Cells of `room_id` sorted by `(y, x)`.
    ///
    /// Computed on first use after an invalidation and shared afterwards.
    pub fn room_cells(&self, room_id: &RoomId) -> Arc<[Cell]> {
        if let Some(cells) = self.room_cell_cache.borrow().get(room_id) {
            return Arc::clone(cells);
        }
        let mut cells: Vec<Cell> = self
            .cell_rooms
            .iter()
            .filter(|(_, owner)| *owner == room_id)
            .map(|(cell, _)| *cell)
            .collect();
        cells.sort_unstable_by_key(|(x, y)| (*y, *x));
        log::debug!("Recomputed {} cells for room {room_id}", cells.len());
        let cells: Arc<[Cell]> = cells.into();
        self.room_cell_cache
            .borrow_mut()
            .insert(room_id.clone(), Arc::clone(&cells));
        cells
    }

    pub fn invalidate_room_cell_cache(&self, room_id: &RoomId) {
        self.room_cell_cache.borrow_mut().remove(room_id);
    }

    pub fn invalidate_all_room_cell_caches(&self) {
        self.room_cell_cache.borrow_mut().clear();
    }

    /// `true` if a cache entry for `room_id` is present.
    pub fn is_room_cell_cache_valid(&self, room_id: &RoomId) -> bool {
        self.room_cell_cache.borrow().contains_key(room_id)
    }
}
