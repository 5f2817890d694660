//! Point markers (save points, items, bosses, …).

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::ids::{MarkerId, RoomId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    /// Sub-cell position; `5.5` is the centre of column 5.
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    pub kind: String,
    pub label: String,
    pub icon: String,
    pub color: Color,
    /// Size as a fraction of a cell.
    pub size: f32,
    /// User scaling multiplier on top of `size`.
    pub scale: f32,
    pub show_label: bool,
}

impl Marker {
    pub fn new(id: MarkerId, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            room_id: None,
            kind: String::new(),
            label: String::new(),
            icon: String::new(),
            color: Color::rgb(0.3, 0.8, 0.3),
            size: 0.6,
            scale: 1.0,
            show_label: true,
        }
    }

    /// Cell containing the marker.
    pub fn cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// Editable marker fields captured for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerProperties {
    pub label: String,
    pub icon: String,
    pub color: Color,
    pub show_label: bool,
}

impl MarkerProperties {
    pub fn capture(marker: &Marker) -> Self {
        Self {
            label: marker.label.clone(),
            icon: marker.icon.clone(),
            color: marker.color,
            show_label: marker.show_label,
        }
    }

    pub fn apply_to(&self, marker: &mut Marker) {
        marker.label.clone_from(&self.label);
        marker.icon.clone_from(&self.icon);
        marker.color = self.color;
        marker.show_label = self.show_label;
    }
}
