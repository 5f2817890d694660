//! Marker registry.

use super::MapDocument;
use crate::map::{CellBounds, Marker, MarkerId};

impl MapDocument {
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn find_marker(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id.as_str() == id)
    }

    /// Mutable access for moves and property edits. Marks the document dirty.
    pub fn find_marker_mut(&mut self, id: &str) -> Option<&mut Marker> {
        let marker = self
            .markers
            .iter_mut()
            .find(|marker| marker.id.as_str() == id)?;
        self.dirty = true;
        Some(marker)
    }

    pub fn marker_index(&self, id: &str) -> Option<usize> {
        self.markers.iter().position(|marker| marker.id.as_str() == id)
    }

    /// Appends a marker. Returns `false` if the id is already taken.
    pub fn add_marker(&mut self, marker: Marker) -> bool {
        let len = self.markers.len();
        self.insert_marker_at(len, marker)
    }

    pub fn insert_marker_at(&mut self, index: usize, marker: Marker) -> bool {
        if self.find_marker(marker.id.as_str()).is_some() {
            log::debug!("Marker {} already exists", marker.id);
            return false;
        }
        let index = index.min(self.markers.len());
        self.markers.insert(index, marker);
        self.dirty = true;
        true
    }

    /// Removes a marker, returning it with its former index.
    pub fn remove_marker(&mut self, id: &str) -> Option<(usize, Marker)> {
        let Some(index) = self.marker_index(id) else {
            log::debug!("Marker {id} not found, remove skipped");
            return None;
        };
        self.dirty = true;
        Some((index, self.markers.remove(index)))
    }

    pub fn markers_using_icon(&self, icon: &str) -> Vec<&Marker> {
        self.markers
            .iter()
            .filter(|marker| marker.icon == icon)
            .collect()
    }

    /// Removes every marker that shows `icon`.
    ///
    /// Returns the removed markers with their former indices, ascending, so
    /// re-inserting them in order restores the registry.
    pub fn remove_markers_using_icon(&mut self, icon: &str) -> Vec<(usize, Marker)> {
        let mut removed = Vec::new();
        let mut index = 0;
        let mut original_index = 0;
        while index < self.markers.len() {
            if self.markers[index].icon == icon {
                removed.push((original_index, self.markers.remove(index)));
            } else {
                index += 1;
            }
            original_index += 1;
        }
        if !removed.is_empty() {
            self.dirty = true;
        }
        removed
    }

    /// Points every marker showing `old` at `new`. Returns how many changed.
    pub fn update_marker_icon_names(&mut self, old: &str, new: &str) -> usize {
        let mut updated = 0;
        for marker in self.markers.iter_mut().filter(|marker| marker.icon == old) {
            marker.icon = new.to_owned();
            updated += 1;
        }
        if updated > 0 {
            self.dirty = true;
        }
        updated
    }

    /// Closest marker within `tolerance` cells of `(x, y)`.
    pub fn find_marker_near(&self, x: f32, y: f32, tolerance: f32) -> Option<&Marker> {
        let max_dist_sq = tolerance * tolerance;
        self.markers
            .iter()
            .map(|marker| {
                let (dx, dy) = (marker.x - x, marker.y - y);
                (marker, dx * dx + dy * dy)
            })
            .filter(|(_, dist_sq)| *dist_sq <= max_dist_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(marker, _)| marker)
    }

    /// Markers whose position lies inside the rectangle (inclusive).
    pub fn markers_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&Marker> {
        let (x0, x1) = (min_x.min(max_x), min_x.max(max_x));
        let (y0, y1) = (min_y.min(max_y), min_y.max(max_y));
        self.markers
            .iter()
            .filter(|m| m.x >= x0 && m.x <= x1 && m.y >= y0 && m.y <= y1)
            .collect()
    }

    /// Smallest unused `marker_<n>` id, probing upward from the marker count.
    pub fn generate_marker_id(&self) -> MarkerId {
        (self.markers.len()..)
            .map(MarkerId::numbered)
            .find(|id| self.find_marker(id.as_str()).is_none())
            .unwrap_or_else(|| MarkerId::numbered(usize::MAX))
    }

    pub(super) fn marker_bounds(&self) -> Option<CellBounds> {
        let mut cells = self.markers.iter().map(Marker::cell);
        let first = cells.next()?;
        let mut bounds = CellBounds::from_cell(first.0, first.1);
        for (x, y) in cells {
            bounds.include(x, y);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str, x: f32, y: f32, icon: &str) -> Marker {
        let mut marker = Marker::new(MarkerId::new(id), x, y);
        marker.icon = icon.to_owned();
        marker
    }

    #[test]
    fn remove_and_reinsert_restores_order() {
        let mut doc = MapDocument::default();
        for id in ["a", "b", "c"] {
            doc.add_marker(marker(id, 0.5, 0.5, ""));
        }
        let (index, removed) = doc.remove_marker("b").unwrap();
        assert_eq!(index, 1);
        assert!(doc.remove_marker("b").is_none());

        doc.insert_marker_at(index, removed);
        let ids: Vec<_> = doc.markers().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn remove_markers_using_icon_reports_original_indices() {
        let mut doc = MapDocument::default();
        doc.add_marker(marker("a", 0.5, 0.5, "key"));
        doc.add_marker(marker("b", 1.5, 0.5, "door"));
        doc.add_marker(marker("c", 2.5, 0.5, "key"));

        assert_eq!(doc.markers_using_icon("key").len(), 2);
        let removed = doc.remove_markers_using_icon("key");
        let indices: Vec<_> = removed.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, [0, 2]);
        assert_eq!(doc.markers().len(), 1);

        for (index, marker) in removed {
            doc.insert_marker_at(index, marker);
        }
        let ids: Vec<_> = doc.markers().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn icon_rename_counts_updates() {
        let mut doc = MapDocument::default();
        doc.add_marker(marker("a", 0.5, 0.5, "key"));
        doc.add_marker(marker("b", 1.5, 0.5, "key"));
        assert_eq!(doc.update_marker_icon_names("key", "gold"), 2);
        assert_eq!(doc.update_marker_icon_names("key", "gold"), 0);
        assert_eq!(doc.markers_using_icon("gold").len(), 2);
    }

    #[test]
    fn nearest_marker_within_tolerance() {
        let mut doc = MapDocument::default();
        doc.add_marker(marker("near", 2.5, 2.5, ""));
        doc.add_marker(marker("far", 3.5, 2.5, ""));

        assert_eq!(doc.find_marker_near(2.7, 2.5, 0.5).unwrap().id.as_str(), "near");
        assert!(doc.find_marker_near(10.0, 10.0, 0.5).is_none());
    }

    #[test]
    fn rect_selection_accepts_reversed_corners() {
        let mut doc = MapDocument::default();
        doc.add_marker(marker("in", 1.5, 1.5, ""));
        doc.add_marker(marker("out", 5.5, 1.5, ""));

        let found = doc.markers_in_rect(3.0, 3.0, 0.0, 0.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "in");
    }

    #[test]
    fn generated_marker_ids_are_unique() {
        let mut doc = MapDocument::default();
        let first = doc.generate_marker_id();
        doc.add_marker(Marker::new(first.clone(), 0.5, 0.5));
        let second = doc.generate_marker_id();
        assert_eq!(first.as_str(), "marker_0");
        assert_eq!(second.as_str(), "marker_1");
    }
}
