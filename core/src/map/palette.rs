//! Tile palette.

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::tiles::{EMPTY_TILE, TileId};

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileType {
    pub id: TileId,
    pub name: String,
    pub color: Color,
}

impl TileType {
    pub fn new(id: TileId, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }
}

/// Ordered list of tile types. Id 0 is the reserved "Empty" entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<TileType>,
}

impl Default for Palette {
    fn default() -> Self {
        let hex = |s: &str| Color::from_hex(s).unwrap_or_default();
        Self {
            entries: vec![
                TileType::new(EMPTY_TILE, "Empty", Color::TRANSPARENT),
                TileType::new(1, "Solid", hex("#3a3a3a")),
                TileType::new(2, "Hazard", hex("#be3a34")),
                TileType::new(3, "Water", hex("#2a5a9a")),
                TileType::new(4, "Breakable", hex("#8b6914")),
            ],
        }
    }
}

impl Palette {
    /// A palette holding only the empty entry.
    pub fn empty() -> Self {
        Self {
            entries: vec![TileType::new(EMPTY_TILE, "Empty", Color::TRANSPARENT)],
        }
    }

    pub fn entries(&self) -> &[TileType] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: TileId) -> Option<&TileType> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn position(&self, id: TileId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Smallest id larger than every existing one.
    pub fn next_id(&self) -> TileId {
        self.entries
            .iter()
            .map(|entry| entry.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Appends a new color and returns its id.
    pub fn add(&mut self, name: impl Into<String>, color: Color) -> TileId {
        let id = self.next_id();
        self.entries.push(TileType::new(id, name, color));
        id
    }

    /// Inserts an entry at `index` (clamped), replacing any entry with the same id.
    pub fn insert_at(&mut self, index: usize, entry: TileType) {
        self.entries.retain(|existing| existing.id != entry.id);
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Returns `false` if no entry has `id`.
    pub fn update(&mut self, id: TileId, name: &str, color: Color) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.name = name.to_owned();
                entry.color = color;
                true
            }
            None => false,
        }
    }

    /// Removes an entry with its former index. The empty entry cannot be removed.
    pub fn remove(&mut self, id: TileId) -> Option<(usize, TileType)> {
        if id == EMPTY_TILE {
            return None;
        }
        let index = self.position(id)?;
        Some((index, self.entries.remove(index)))
    }
}
