//! Room creation, deletion, properties, cell assignment and detection.

use std::collections::{HashMap, HashSet};

use crate::abstract_editor::{
    CoalesceContext, EditAction, EditActionError, EditActionResult, PROPERTY_COALESCE_TIME_MS,
};
use crate::document::MapDocument;
use crate::map::{Cell, EdgeChange, Room, RoomId, RoomProperties};

/// Adds a room, assigns it cells and optionally walls it in.
#[derive(Debug, Clone)]
pub struct CreateRoomCommand {
    room: Room,
    cells: Vec<Cell>,
    generate_walls: bool,
    previous_owners: Vec<(Cell, Option<RoomId>)>,
    wall_changes: Vec<EdgeChange>,
    description: String,
}

impl CreateRoomCommand {
    pub fn new(room: Room, cells: Vec<Cell>, generate_walls: bool) -> Self {
        let description = format!("Create Room: {}", room.name);
        Self {
            room,
            cells,
            generate_walls,
            previous_owners: Vec::new(),
            wall_changes: Vec::new(),
            description,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room.id
    }
}

impl EditAction<MapDocument> for CreateRoomCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        if !target.add_room(self.room.clone()) {
            return Err(EditActionError::InvalidState(format!(
                "room {} already exists",
                self.room.id
            )));
        }
        self.previous_owners = self
            .cells
            .iter()
            .map(|cell| (*cell, target.set_cell_room(*cell, &self.room.id)))
            .collect();
        self.wall_changes = if self.generate_walls {
            target.generate_room_perimeter_walls(&self.room.id)
        } else {
            Vec::new()
        };
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        for change in self.wall_changes.iter().rev() {
            target.set_edge_state(change.edge, change.old_state);
        }
        target.remove_room(self.room.id.as_str());
        for (cell, owner) in self.previous_owners.iter().rev() {
            if let Some(owner) = owner {
                target.set_cell_room(*cell, owner);
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Deletes a room and remembers its cells for undo.
#[derive(Debug, Clone)]
pub struct DeleteRoomCommand {
    room_id: RoomId,
    saved: Option<(usize, Room, Vec<Cell>)>,
    description: String,
}

impl DeleteRoomCommand {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            saved: None,
            description: "Delete Room".to_owned(),
        }
    }
}

impl EditAction<MapDocument> for DeleteRoomCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        let cells = target.room_cells(&self.room_id).to_vec();
        match target.remove_room(self.room_id.as_str()) {
            Some((index, room)) => {
                self.description = format!("Delete Room: {}", room.name);
                self.saved = Some((index, room, cells));
            }
            None => self.saved = None,
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        let Some((index, room, cells)) = &self.saved else {
            return Ok(());
        };
        target.insert_room_at(*index, room.clone());
        for cell in cells {
            target.set_cell_room(*cell, &self.room_id);
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Name, color, notes, tags and parent group edits on one room.
///
/// Consecutive edits to the same room within the property window coalesce:
/// the first "before" is kept and the latest "after" wins.
#[derive(Debug, Clone)]
pub struct ModifyRoomPropertiesCommand {
    room_id: RoomId,
    old: RoomProperties,
    new: RoomProperties,
    description: String,
}

impl ModifyRoomPropertiesCommand {
    pub fn new(room_id: RoomId, old: RoomProperties, new: RoomProperties) -> Self {
        let description = format!("Modify Room: {}", new.name);
        Self {
            room_id,
            old,
            new,
            description,
        }
    }

    fn write(target: &mut MapDocument, room_id: &RoomId, props: &RoomProperties) {
        match target.find_room_mut(room_id.as_str()) {
            Some(room) => props.apply_to(room),
            None => log::debug!("Room {room_id} not found, properties skipped"),
        }
    }
}

impl EditAction<MapDocument> for ModifyRoomPropertiesCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        Self::write(target, &self.room_id, &self.new);
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        Self::write(target, &self.room_id, &self.old);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn coalesce(&mut self, other: Self, _ctx: &CoalesceContext) -> Option<Self> {
        if other.room_id != self.room_id {
            return Some(other);
        }
        self.new = other.new;
        self.description = other.description;
        None
    }

    fn coalesce_window_ms(&self) -> u64 {
        PROPERTY_COALESCE_TIME_MS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub cell: Cell,
    pub old_room: Option<RoomId>,
    pub new_room: Option<RoomId>,
}

/// Room painting: assigns or unassigns individual cells.
#[derive(Debug, Clone, Default)]
pub struct ModifyRoomAssignmentsCommand {
    assignments: Vec<CellAssignment>,
}

impl ModifyRoomAssignmentsCommand {
    pub fn new(assignments: Vec<CellAssignment>) -> Self {
        Self { assignments }
    }

    /// Records moving `cells` to `room` (`None` unassigns), skipping cells
    /// that already match.
    pub fn assign(
        doc: &MapDocument,
        cells: impl IntoIterator<Item = Cell>,
        room: Option<&RoomId>,
    ) -> Self {
        let assignments = cells
            .into_iter()
            .filter_map(|cell| {
                let old_room = doc.get_cell_room(cell);
                (old_room != room).then(|| CellAssignment {
                    cell,
                    old_room: old_room.cloned(),
                    new_room: room.cloned(),
                })
            })
            .collect();
        Self { assignments }
    }

    pub fn assignments(&self) -> &[CellAssignment] {
        &self.assignments
    }
}

impl EditAction<MapDocument> for ModifyRoomAssignmentsCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        for assignment in &self.assignments {
            target.restore_cell_room(assignment.cell, assignment.new_room.as_ref());
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        for assignment in self.assignments.iter().rev() {
            target.restore_cell_room(assignment.cell, assignment.old_room.as_ref());
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Assign Room Cells"
    }
}

/// Splits disconnected rooms and turns enclosed empty areas into rooms.
///
/// The first apply runs detection and records every created room and cell
/// reassignment; redo replays that record instead of detecting again, so it
/// reproduces the same ids even if detection would now answer differently.
#[derive(Debug, Clone, Default)]
pub struct DetectRoomsCommand {
    executed: bool,
    created_rooms: Vec<Room>,
    cell_changes: Vec<CellAssignment>,
    split_count: usize,
    description: String,
}

impl DetectRoomsCommand {
    pub fn new() -> Self {
        Self {
            description: "Detect Rooms".to_owned(),
            ..Default::default()
        }
    }

    pub fn created_rooms(&self) -> &[Room] {
        &self.created_rooms
    }

    pub fn split_count(&self) -> usize {
        self.split_count
    }

    fn detect(&mut self, target: &mut MapDocument) {
        let rooms_before: HashSet<RoomId> =
            target.rooms().iter().map(|room| room.id.clone()).collect();
        let before: HashMap<Cell, RoomId> = target.cell_assignments().into_iter().collect();

        self.split_count = target.split_disconnected_rooms();
        for region in target.detect_all_enclosed_rooms() {
            if !region.is_enclosed || region.is_empty() {
                continue;
            }
            let name = format!("Room {}", target.rooms().len() + 1);
            target.create_room_from_cells(&region.cells, name, false);
        }

        self.created_rooms = target
            .rooms()
            .iter()
            .filter(|room| !rooms_before.contains(&room.id))
            .cloned()
            .collect();

        let after: HashMap<Cell, RoomId> = target.cell_assignments().into_iter().collect();
        let mut cells: Vec<Cell> = before.keys().chain(after.keys()).copied().collect();
        cells.sort_unstable_by_key(|(x, y)| (*y, *x));
        cells.dedup();
        self.cell_changes = cells
            .into_iter()
            .filter_map(|cell| {
                let old_room = before.get(&cell);
                let new_room = after.get(&cell);
                (old_room != new_room).then(|| CellAssignment {
                    cell,
                    old_room: old_room.cloned(),
                    new_room: new_room.cloned(),
                })
            })
            .collect();

        let created = self.created_rooms.len();
        self.description = match (created, self.split_count) {
            (0, 0) => "Detect Rooms".to_owned(),
            (created, 0) => format!("Detect Rooms (created {created})"),
            (0, split) => format!("Detect Rooms (split {split})"),
            (created, split) => format!("Detect Rooms (created {created}, split {split})"),
        };
        log::info!(
            "{}: {} cells reassigned",
            self.description,
            self.cell_changes.len()
        );
    }
}

impl EditAction<MapDocument> for DetectRoomsCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        if !self.executed {
            self.detect(target);
            self.executed = true;
            return Ok(());
        }
        for room in &self.created_rooms {
            target.add_room(room.clone());
        }
        for change in &self.cell_changes {
            target.restore_cell_room(change.cell, change.new_room.as_ref());
        }
        target.invalidate_all_room_cell_caches();
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        for room in &self.created_rooms {
            target.remove_room(room.id.as_str());
        }
        for change in &self.cell_changes {
            target.restore_cell_room(change.cell, change.old_room.as_ref());
        }
        target.invalidate_all_room_cell_caches();
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
