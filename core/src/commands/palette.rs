//! Palette commands.

use crate::abstract_editor::{EditAction, EditActionError, EditActionResult};
use crate::document::{MapDocument, RemovedPaletteColor};
use crate::map::{Color, EMPTY_TILE, TileId, TileType};

#[derive(Debug, Clone)]
pub struct AddPaletteColorCommand {
    name: String,
    color: Color,
    /// Id assigned on first apply; redo reuses it.
    id: Option<TileId>,
    description: String,
}

impl AddPaletteColorCommand {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        let name = name.into();
        let description = format!("Add Color: {name}");
        Self {
            name,
            color,
            id: None,
            description,
        }
    }

    pub fn id(&self) -> Option<TileId> {
        self.id
    }
}

impl EditAction<MapDocument> for AddPaletteColorCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        match self.id {
            Some(id) => {
                let end = target.palette().len();
                target.insert_palette_entry(end, TileType::new(id, self.name.clone(), self.color));
            }
            None => self.id = Some(target.add_palette_color(self.name.clone(), self.color)),
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        if let Some(id) = self.id {
            target.remove_palette_color(id, None);
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Removes a palette color, repainting its tiles with a replacement.
#[derive(Debug, Clone)]
pub struct RemovePaletteColorCommand {
    id: TileId,
    replacement: Option<TileId>,
    removed: Option<RemovedPaletteColor>,
    description: String,
}

impl RemovePaletteColorCommand {
    pub fn new(id: TileId, replacement: Option<TileId>) -> Self {
        Self {
            id,
            replacement,
            removed: None,
            description: "Remove Color".to_owned(),
        }
    }
}

impl EditAction<MapDocument> for RemovePaletteColorCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        if self.id == EMPTY_TILE {
            return Err(EditActionError::InvalidState(
                "the empty palette entry cannot be removed".to_owned(),
            ));
        }
        self.removed = target.remove_palette_color(self.id, self.replacement);
        if let Some(removed) = &self.removed {
            self.description = format!("Remove Color: {}", removed.entry.name);
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        if let Some(removed) = &self.removed {
            target.insert_palette_entry(removed.index, removed.entry.clone());
            target.revert_tile_changes(removed.replaced.iter());
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone)]
pub struct UpdatePaletteColorCommand {
    id: TileId,
    name: String,
    color: Color,
    previous: Option<(String, Color)>,
    description: String,
}

impl UpdatePaletteColorCommand {
    pub fn new(id: TileId, name: impl Into<String>, color: Color) -> Self {
        let name = name.into();
        let description = format!("Update Color: {name}");
        Self {
            id,
            name,
            color,
            previous: None,
            description,
        }
    }
}

impl EditAction<MapDocument> for UpdatePaletteColorCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        if self.previous.is_none() {
            self.previous = target
                .find_palette_entry(self.id)
                .map(|entry| (entry.name.clone(), entry.color));
        }
        target.update_palette_color(self.id, &self.name, self.color);
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        if let Some((name, color)) = &self.previous {
            target.update_palette_color(self.id, name, *color);
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
    use crate::commands::MapHistory;

    #[test]
    fn add_color_keeps_its_id_across_redo() {
        let mut doc = MapDocument::default();
        let mut history = MapHistory::new(100);
        history
            .execute(AddPaletteColorCommand::new("Lava", Color::rgb(1.0, 0.3, 0.0)).into(), &mut doc)
            .unwrap();
        assert_eq!(history.undo_description(), Some("Add Color: Lava"));
        assert_eq!(doc.find_palette_entry(5).unwrap().name, "Lava");

        history.undo(&mut doc).unwrap();
        assert!(doc.find_palette_entry(5).is_none());
        history.redo(&mut doc).unwrap();
        assert_eq!(doc.find_palette_entry(5).unwrap().name, "Lava");
        assert_eq!(doc.palette().entries().last().unwrap().id, 5);
    }

    #[test]
    fn remove_color_restores_entry_and_tiles() {
        let mut doc = MapDocument::default();
        let mut history = MapHistory::new(100);
        doc.set_tile_at(0, 0, 2);
        doc.set_tile_at(1, 0, 2);
        doc.set_tile_at(2, 0, 1);
        let before = doc.to_snapshot();

        history
            .execute(RemovePaletteColorCommand::new(2, Some(3)).into(), &mut doc)
            .unwrap();
        assert_eq!(history.undo_description(), Some("Remove Color: Hazard"));
        assert!(doc.find_palette_entry(2).is_none());
        assert_eq!(doc.get_tile_at(0, 0), 3);
        assert_eq!(doc.count_tiles_using(2), 0);

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.to_snapshot(), before);
    }

    #[test]
    fn empty_entry_cannot_be_removed() {
        let mut doc = MapDocument::default();
        let mut history = MapHistory::new(100);
        let result = history.execute(RemovePaletteColorCommand::new(EMPTY_TILE, None).into(), &mut doc);
        assert!(matches!(result, Err(EditActionError::InvalidState(_))));
        assert!(!history.can_undo());
    }

    #[test]
    fn update_color_round_trips() {
        let mut doc = MapDocument::default();
        let mut history = MapHistory::new(100);
        history
            .execute(UpdatePaletteColorCommand::new(1, "Rock", Color::WHITE).into(), &mut doc)
            .unwrap();
        assert_eq!(doc.find_palette_entry(1).unwrap().name, "Rock");

        history.undo(&mut doc).unwrap();
        let entry = doc.find_palette_entry(1).unwrap();
        assert_eq!(entry.name, "Solid");
        assert_ne!(entry.color, Color::WHITE);
    }
}
