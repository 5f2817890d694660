//! Tile painting, fill and edge commands.

use crate::abstract_editor::{COALESCE_TIME_MS, CoalesceContext, EditAction, EditActionResult};
use crate::document::MapDocument;
use crate::map::{Cell, EdgeChange, EdgeId, EdgeState, TileChange, TileId};

/// A brush stroke. Rapid consecutive strokes coalesce into one undo step.
#[derive(Debug, Clone, Default)]
pub struct PaintTilesCommand {
    changes: Vec<TileChange>,
}

impl PaintTilesCommand {
    pub fn new(changes: Vec<TileChange>) -> Self {
        Self { changes }
    }

    /// Records painting `cells` with `tile_id`, skipping cells that already hold it.
    pub fn paint(doc: &MapDocument, cells: impl IntoIterator<Item = Cell>, tile_id: TileId) -> Self {
        let changes = cells
            .into_iter()
            .filter_map(|(x, y)| {
                let old_tile = doc.get_tile_at(x, y);
                (old_tile != tile_id).then(|| TileChange::new(x, y, old_tile, tile_id))
            })
            .collect();
        Self { changes }
    }

    pub fn changes(&self) -> &[TileChange] {
        &self.changes
    }
}

impl EditAction<MapDocument> for PaintTilesCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        target.apply_tile_changes(&self.changes);
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        target.revert_tile_changes(self.changes.iter());
        Ok(())
    }

    fn description(&self) -> &str {
        "Paint Tiles"
    }

    fn coalesce(&mut self, other: Self, _ctx: &CoalesceContext) -> Option<Self> {
        self.changes.extend(other.changes);
        None
    }

    fn coalesce_window_ms(&self) -> u64 {
        COALESCE_TIME_MS
    }
}

/// A bucket fill. Never coalesces.
#[derive(Debug, Clone, Default)]
pub struct FillTilesCommand {
    changes: Vec<TileChange>,
}

impl FillTilesCommand {
    pub fn new(changes: Vec<TileChange>) -> Self {
        Self { changes }
    }

    /// Records the fill [`MapDocument::compute_tile_fill`] would perform.
    pub fn fill(doc: &MapDocument, start: Cell, tile_id: TileId) -> Self {
        Self::new(doc.compute_tile_fill(start, tile_id))
    }

    pub fn changes(&self) -> &[TileChange] {
        &self.changes
    }
}

impl EditAction<MapDocument> for FillTilesCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        target.apply_tile_changes(&self.changes);
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        target.revert_tile_changes(self.changes.iter());
        Ok(())
    }

    fn description(&self) -> &str {
        "Fill Tiles"
    }
}

/// Wall and door edits made with the edge tool.
#[derive(Debug, Clone, Default)]
pub struct ModifyEdgesCommand {
    changes: Vec<EdgeChange>,
}

impl ModifyEdgesCommand {
    pub fn new(changes: Vec<EdgeChange>) -> Self {
        Self { changes }
    }

    /// Records setting every edge in `edges` to `state`.
    pub fn set(doc: &MapDocument, edges: impl IntoIterator<Item = EdgeId>, state: EdgeState) -> Self {
        let changes = edges
            .into_iter()
            .filter_map(|edge| {
                let old_state = doc.get_edge_state(edge);
                (old_state != state).then(|| EdgeChange::new(edge, old_state, state))
            })
            .collect();
        Self { changes }
    }

    pub fn changes(&self) -> &[EdgeChange] {
        &self.changes
    }
}

impl EditAction<MapDocument> for ModifyEdgesCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        for change in &self.changes {
            target.set_edge_state(change.edge, change.new_state);
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        for change in self.changes.iter().rev() {
            target.set_edge_state(change.edge, change.old_state);
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Modify Edges"
    }

    fn coalesce(&mut self, other: Self, _ctx: &CoalesceContext) -> Option<Self> {
        self.changes.extend(other.changes);
        None
    }

    fn coalesce_window_ms(&self) -> u64 {
        COALESCE_TIME_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_editor::ManualClock;
    use crate::commands::{Command, MapHistory};

    fn setup() -> (MapDocument, MapHistory, ManualClock) {
        let clock = ManualClock::new();
        let history = MapHistory::with_clock(100, clock.clone());
        (MapDocument::default(), history, clock)
    }

    fn paint(doc: &MapDocument, cells: &[Cell], tile: TileId) -> Command {
        PaintTilesCommand::paint(doc, cells.iter().copied(), tile).into()
    }

    #[test]
    fn strokes_within_window_merge() {
        let (mut doc, mut history, clock) = setup();

        let first = paint(&doc, &[(0, 0), (1, 0)], 1);
        history.execute(first, &mut doc).unwrap();
        clock.advance(100);
        let second = paint(&doc, &[(2, 0), (3, 0)], 1);
        history.execute(second, &mut doc).unwrap();

        assert_eq!(history.undo_count(), 1);
        assert_eq!(doc.tiles().row(0).unwrap().runs().len(), 1);

        history.undo(&mut doc).unwrap();
        assert!(doc.tiles().is_empty());
    }

    #[test]
    fn strokes_after_window_stay_separate() {
        let (mut doc, mut history, clock) = setup();

        let first = paint(&doc, &[(0, 0)], 1);
        history.execute(first, &mut doc).unwrap();
        clock.advance(200);
        let second = paint(&doc, &[(1, 0)], 1);
        history.execute(second, &mut doc).unwrap();

        assert_eq!(history.undo_count(), 2);
        history.undo(&mut doc).unwrap();
        assert_eq!(doc.get_tile_at(0, 0), 1);
        assert_eq!(doc.get_tile_at(1, 0), 0);
    }

    #[test]
    fn distant_strokes_within_window_merge() {
        let (mut doc, mut history, clock) = setup();

        let first = paint(&doc, &[(0, 0)], 1);
        history.execute(first, &mut doc).unwrap();
        clock.advance(100);
        let second = paint(&doc, &[(10, 10)], 1);
        history.execute(second, &mut doc).unwrap();

        assert_eq!(history.undo_count(), 1);
        history.undo(&mut doc).unwrap();
        assert_eq!(doc.get_tile_at(0, 0), 0);
        assert_eq!(doc.get_tile_at(10, 10), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn distant_edge_strokes_within_window_merge() {
        let (mut doc, mut history, clock) = setup();

        let near = ModifyEdgesCommand::set(&doc, [EdgeId::new(0, 0, 1, 0)], EdgeState::Wall);
        history.execute(near.into(), &mut doc).unwrap();
        clock.advance(100);
        let far = ModifyEdgesCommand::set(&doc, [EdgeId::new(20, 20, 20, 21)], EdgeState::Wall);
        history.execute(far.into(), &mut doc).unwrap();

        assert_eq!(history.undo_count(), 1);
        history.undo(&mut doc).unwrap();
        assert!(doc.edges().is_empty());
    }

    #[test]
    fn repainted_cell_restores_original_tile() {
        let (mut doc, mut history, clock) = setup();

        let first = paint(&doc, &[(0, 0)], 1);
        history.execute(first, &mut doc).unwrap();
        clock.advance(10);
        let second = paint(&doc, &[(0, 0)], 2);
        history.execute(second, &mut doc).unwrap();
        assert_eq!(doc.get_tile_at(0, 0), 2);

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.get_tile_at(0, 0), 0);
    }

    #[test]
    fn paint_skips_unchanged_cells() {
        let mut doc = MapDocument::default();
        doc.set_tile_at(0, 0, 1);
        let command = PaintTilesCommand::paint(&doc, [(0, 0), (1, 0)], 1);
        assert_eq!(command.changes(), &[TileChange::new(1, 0, 0, 1)]);
    }

    #[test]
    fn fill_never_merges_with_paint() {
        let (mut doc, mut history, _) = setup();

        let first = paint(&doc, &[(0, 0)], 1);
        history.execute(first, &mut doc).unwrap();
        let fill = FillTilesCommand::fill(&doc, (0, 0), 2);
        history.execute(fill.into(), &mut doc).unwrap();

        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.undo_description(), Some("Fill Tiles"));
        assert_eq!(doc.get_tile_at(0, 0), 2);
    }

    #[test]
    fn edge_strokes_merge_and_undo() {
        let (mut doc, mut history, clock) = setup();

        let walls = ModifyEdgesCommand::set(&doc, [EdgeId::new(0, 0, 1, 0)], EdgeState::Wall);
        history.execute(walls.into(), &mut doc).unwrap();
        clock.advance(50);
        let doors = ModifyEdgesCommand::set(&doc, [EdgeId::new(0, 0, 1, 0)], EdgeState::Door);
        history.execute(doors.into(), &mut doc).unwrap();

        assert_eq!(history.undo_count(), 1);
        assert_eq!(doc.get_edge_state(EdgeId::new(0, 0, 1, 0)), EdgeState::Door);

        history.undo(&mut doc).unwrap();
        assert_eq!(doc.get_edge_state(EdgeId::new(0, 0, 1, 0)), EdgeState::None);
        assert!(doc.edges().is_empty());
    }
}
