//! Marker and icon commands.

use crate::abstract_editor::{
    CoalesceContext, EditAction, EditActionError, EditActionResult, PROPERTY_COALESCE_TIME_MS,
};
use crate::document::MapDocument;
use crate::map::{IconData, Marker, MarkerId, MarkerProperties};

/// Places a new marker, or replaces an existing one wholesale.
#[derive(Debug, Clone)]
pub struct PlaceMarkerCommand {
    marker: Marker,
    is_new: bool,
    previous: Option<Marker>,
}

impl PlaceMarkerCommand {
    pub fn new(marker: Marker, is_new: bool) -> Self {
        Self {
            marker,
            is_new,
            previous: None,
        }
    }
}

impl EditAction<MapDocument> for PlaceMarkerCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        if self.is_new {
            if !target.add_marker(self.marker.clone()) {
                return Err(EditActionError::InvalidState(format!(
                    "marker {} already exists",
                    self.marker.id
                )));
            }
            return Ok(());
        }
        match target.find_marker_mut(self.marker.id.as_str()) {
            Some(existing) => {
                self.previous = Some(std::mem::replace(existing, self.marker.clone()));
            }
            None => log::debug!("Marker {} not found, modify skipped", self.marker.id),
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        if self.is_new {
            target.remove_marker(self.marker.id.as_str());
            return Ok(());
        }
        if let Some(previous) = &self.previous
            && let Some(existing) = target.find_marker_mut(previous.id.as_str())
        {
            *existing = previous.clone();
        }
        Ok(())
    }

    fn description(&self) -> &str {
        if self.is_new {
            "Place Marker"
        } else {
            "Modify Marker"
        }
    }
}

/// Deletes a selection of markers.
#[derive(Debug, Clone)]
pub struct DeleteMarkersCommand {
    ids: Vec<MarkerId>,
    /// Removed markers with the index each had at the moment of removal.
    removed: Vec<(usize, Marker)>,
    description: String,
}

impl DeleteMarkersCommand {
    pub fn new(ids: Vec<MarkerId>) -> Self {
        let description = match ids.len() {
            1 => "Delete Marker".to_owned(),
            n => format!("Delete {n} Markers"),
        };
        Self {
            ids,
            removed: Vec::new(),
            description,
        }
    }
}

impl EditAction<MapDocument> for DeleteMarkersCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        self.removed = self
            .ids
            .iter()
            .filter_map(|id| target.remove_marker(id.as_str()))
            .collect();
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        for (index, marker) in self.removed.iter().rev() {
            target.insert_marker_at(*index, marker.clone());
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPosition {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerMove {
    pub id: MarkerId,
    pub from: MarkerPosition,
    pub to: MarkerPosition,
}

/// Moves one or more markers (a drag of the current selection).
#[derive(Debug, Clone)]
pub struct MoveMarkersCommand {
    moves: Vec<MarkerMove>,
    description: String,
}

impl MoveMarkersCommand {
    pub fn new(moves: Vec<MarkerMove>) -> Self {
        let description = match moves.len() {
            1 => "Move Marker".to_owned(),
            n => format!("Move {n} Markers"),
        };
        Self { moves, description }
    }

    fn place(target: &mut MapDocument, id: &MarkerId, position: MarkerPosition) {
        match target.find_marker_mut(id.as_str()) {
            Some(marker) => {
                marker.x = position.x;
                marker.y = position.y;
            }
            None => log::debug!("Marker {id} not found, move skipped"),
        }
    }
}

impl EditAction<MapDocument> for MoveMarkersCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        for step in &self.moves {
            Self::place(target, &step.id, step.to);
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        for step in self.moves.iter().rev() {
            Self::place(target, &step.id, step.from);
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Label, icon, color and label visibility edits on one marker.
#[derive(Debug, Clone)]
pub struct ModifyMarkerPropertiesCommand {
    marker_id: MarkerId,
    old: MarkerProperties,
    new: MarkerProperties,
}

impl ModifyMarkerPropertiesCommand {
    pub fn new(marker_id: MarkerId, old: MarkerProperties, new: MarkerProperties) -> Self {
        Self {
            marker_id,
            old,
            new,
        }
    }

    fn write(target: &mut MapDocument, marker_id: &MarkerId, props: &MarkerProperties) {
        match target.find_marker_mut(marker_id.as_str()) {
            Some(marker) => props.apply_to(marker),
            None => log::debug!("Marker {marker_id} not found, properties skipped"),
        }
    }
}

impl EditAction<MapDocument> for ModifyMarkerPropertiesCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        Self::write(target, &self.marker_id, &self.new);
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        Self::write(target, &self.marker_id, &self.old);
        Ok(())
    }

    fn description(&self) -> &str {
        "Modify Marker"
    }

    fn coalesce(&mut self, other: Self, _ctx: &CoalesceContext) -> Option<Self> {
        if other.marker_id != self.marker_id {
            return Some(other);
        }
        self.new = other.new;
        None
    }

    fn coalesce_window_ms(&self) -> u64 {
        PROPERTY_COALESCE_TIME_MS
    }
}

/// Deletes an icon, optionally together with every marker showing it.
#[derive(Debug, Clone)]
pub struct DeleteIconCommand {
    name: String,
    remove_markers: bool,
    icon: Option<IconData>,
    removed_markers: Vec<(usize, Marker)>,
    description: String,
}

impl DeleteIconCommand {
    pub fn new(name: impl Into<String>, remove_markers: bool) -> Self {
        Self {
            name: name.into(),
            remove_markers,
            icon: None,
            removed_markers: Vec::new(),
            description: "Delete Icon".to_owned(),
        }
    }
}

impl EditAction<MapDocument> for DeleteIconCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        self.removed_markers = if self.remove_markers {
            target.remove_markers_using_icon(&self.name)
        } else {
            Vec::new()
        };
        self.icon = target.remove_icon(&self.name);
        if self.icon.is_none() {
            log::debug!("Icon {} not found", self.name);
        }
        self.description = match self.removed_markers.len() {
            0 => "Delete Icon".to_owned(),
            n => format!("Delete Icon (+ {n} markers)"),
        };
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        if let Some(icon) = &self.icon {
            target.add_icon(self.name.clone(), icon.clone());
        }
        for (index, marker) in &self.removed_markers {
            target.insert_marker_at(*index, marker.clone());
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_editor::ManualClock;
    use crate::commands::MapHistory;
    use crate::map::Color;

    fn setup() -> (MapDocument, MapHistory, ManualClock) {
        let clock = ManualClock::new();
        (
            MapDocument::default(),
            MapHistory::with_clock(100, clock.clone()),
            clock,
        )
    }

    fn marker(id: &str, x: f32, icon: &str) -> Marker {
        let mut marker = Marker::new(MarkerId::new(id), x, 0.5);
        marker.icon = icon.to_owned();
        marker
    }

    fn ids(doc: &MapDocument) -> Vec<&str> {
        doc.markers().iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn place_and_modify_marker() {
        let (mut doc, mut history, _) = setup();
        history
            .execute(PlaceMarkerCommand::new(marker("m", 0.5, "save"), true).into(), &mut doc)
            .unwrap();
        assert_eq!(history.undo_description(), Some("Place Marker"));

        let mut moved = marker("m", 3.5, "boss");
        moved.label = "Boss".into();
        history
            .execute(PlaceMarkerCommand::new(moved, false).into(), &mut doc)
            .unwrap();
        assert_eq!(doc.find_marker("m").unwrap().icon, "boss");

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.find_marker("m").unwrap().icon, "save");
        history.undo(&mut doc).unwrap();
        assert!(doc.markers().is_empty());
    }

    #[test]
    fn delete_markers_restores_order() {
        let (mut doc, mut history, _) = setup();
        for (i, id) in ["a", "b", "c", "d"].into_iter().enumerate() {
            doc.add_marker(marker(id, i as f32 + 0.5, ""));
        }
        let command = DeleteMarkersCommand::new(vec![MarkerId::new("d"), MarkerId::new("b")]);
        history.execute(command.into(), &mut doc).unwrap();
        assert_eq!(ids(&doc), ["a", "c"]);
        assert_eq!(history.undo_description(), Some("Delete 2 Markers"));

        history.undo(&mut doc).unwrap();
        assert_eq!(ids(&doc), ["a", "b", "c", "d"]);
    }

    #[test]
    fn move_markers_round_trips() {
        let (mut doc, mut history, _) = setup();
        doc.add_marker(marker("m", 0.5, ""));
        let command = MoveMarkersCommand::new(vec![MarkerMove {
            id: MarkerId::new("m"),
            from: MarkerPosition { x: 0.5, y: 0.5 },
            to: MarkerPosition { x: 4.5, y: 2.5 },
        }]);
        history.execute(command.into(), &mut doc).unwrap();
        assert_eq!(doc.find_marker("m").unwrap().cell(), (4, 2));
        assert_eq!(history.undo_description(), Some("Move Marker"));

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.find_marker("m").unwrap().cell(), (0, 0));
    }

    #[test]
    fn marker_property_edits_coalesce() {
        let (mut doc, mut history, clock) = setup();
        doc.add_marker(marker("m", 0.5, ""));
        let original = doc.find_marker("m").unwrap().color;

        for color in [Color::WHITE, Color::BLACK] {
            let old = MarkerProperties::capture(doc.find_marker("m").unwrap());
            let mut new = old.clone();
            new.color = color;
            let command = ModifyMarkerPropertiesCommand::new(MarkerId::new("m"), old, new);
            history.execute(command.into(), &mut doc).unwrap();
            clock.advance(250);
        }

        assert_eq!(history.undo_count(), 1);
        history.undo(&mut doc).unwrap();
        assert_eq!(doc.find_marker("m").unwrap().color, original);
    }

    #[test]
    fn delete_icon_restores_icon_and_markers() {
        let (mut doc, mut history, _) = setup();
        doc.add_icon(
            "key",
            IconData {
                width: 1,
                height: 1,
                pixels: vec![1, 2, 3, 4],
                category: "items".into(),
            },
        );
        doc.add_marker(marker("a", 0.5, "key"));
        doc.add_marker(marker("b", 1.5, "door"));
        doc.add_marker(marker("c", 2.5, "key"));
        let before = doc.to_snapshot();

        history
            .execute(DeleteIconCommand::new("key", true).into(), &mut doc)
            .unwrap();
        assert_eq!(ids(&doc), ["b"]);
        assert!(doc.find_icon("key").is_none());
        assert_eq!(history.undo_description(), Some("Delete Icon (+ 2 markers)"));

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.to_snapshot(), before);
    }

    #[test]
    fn delete_icon_can_keep_markers() {
        let (mut doc, mut history, _) = setup();
        doc.add_marker(marker("a", 0.5, "key"));
        history
            .execute(DeleteIconCommand::new("key", false).into(), &mut doc)
            .unwrap();
        assert_eq!(ids(&doc), ["a"]);
        assert_eq!(history.undo_description(), Some("Delete Icon"));
    }
}
