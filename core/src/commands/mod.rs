//! Map editing commands.
//!
//! Every undoable edit of a [`MapDocument`] is one of the structs in this
//! module, wrapped in the closed [`Command`] enum that [`MapHistory`] stores.
//! Only two commands of the same [`CommandKind`] are ever offered to each
//! other for coalescing.

mod markers;
mod palette;
mod regions;
mod rooms;
mod tiles;

pub use markers::{
    DeleteIconCommand, DeleteMarkersCommand, MarkerMove, MarkerPosition,
    ModifyMarkerPropertiesCommand, MoveMarkersCommand, PlaceMarkerCommand,
};
pub use palette::{AddPaletteColorCommand, RemovePaletteColorCommand, UpdatePaletteColorCommand};
pub use regions::{CreateRegionCommand, DeleteRegionCommand, ModifyRegionPropertiesCommand};
pub use rooms::{
    CellAssignment, CreateRoomCommand, DeleteRoomCommand, DetectRoomsCommand,
    ModifyRoomAssignmentsCommand, ModifyRoomPropertiesCommand,
};
pub use tiles::{FillTilesCommand, ModifyEdgesCommand, PaintTilesCommand};

use crate::abstract_editor::{CoalesceContext, EditAction, EditActionHistory, EditActionResult};
use crate::document::MapDocument;

/// Undo/redo history over a map document.
pub type MapHistory = EditActionHistory<MapDocument, Command>;

macro_rules! command_set {
    ($($variant:ident($command:ty)),* $(,)?) => {
        /// Any undoable map edit.
        #[derive(Debug, Clone)]
        pub enum Command {
            $($variant($command),)*
        }

        /// Tag identifying the variant of a [`Command`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CommandKind {
            $($variant,)*
        }

        impl Command {
            pub fn kind(&self) -> CommandKind {
                match self {
                    $(Self::$variant(_) => CommandKind::$variant,)*
                }
            }
        }

        $(
            impl From<$command> for Command {
                fn from(command: $command) -> Self {
                    Self::$variant(command)
                }
            }
        )*

        impl EditAction<MapDocument> for Command {
            fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
                match self {
                    $(Self::$variant(command) => command.apply(target),)*
                }
            }

            fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
                match self {
                    $(Self::$variant(command) => command.undo(target),)*
                }
            }

            fn description(&self) -> &str {
                match self {
                    $(Self::$variant(command) => command.description(),)*
                }
            }

            fn coalesce(&mut self, other: Self, ctx: &CoalesceContext) -> Option<Self> {
                match (self, other) {
                    $(
                        (Self::$variant(top), Self::$variant(next)) => {
                            top.coalesce(next, ctx).map(Self::$variant)
                        }
                    )*
                    (_, other) => Some(other),
                }
            }

            fn coalesce_window_ms(&self) -> u64 {
                match self {
                    $(Self::$variant(command) => command.coalesce_window_ms(),)*
                }
            }
        }
    };
}

command_set! {
    PaintTiles(PaintTilesCommand),
    FillTiles(FillTilesCommand),
    ModifyEdges(ModifyEdgesCommand),
    CreateRoom(CreateRoomCommand),
    DeleteRoom(DeleteRoomCommand),
    ModifyRoomProperties(ModifyRoomPropertiesCommand),
    ModifyRoomAssignments(ModifyRoomAssignmentsCommand),
    CreateRegion(CreateRegionCommand),
    DeleteRegion(DeleteRegionCommand),
    ModifyRegionProperties(ModifyRegionPropertiesCommand),
    PlaceMarker(PlaceMarkerCommand),
    DeleteMarkers(DeleteMarkersCommand),
    MoveMarkers(MoveMarkersCommand),
    ModifyMarkerProperties(ModifyMarkerPropertiesCommand),
    DeleteIcon(DeleteIconCommand),
    AddPaletteColor(AddPaletteColorCommand),
    RemovePaletteColor(RemovePaletteColorCommand),
    UpdatePaletteColor(UpdatePaletteColorCommand),
    DetectRooms(DetectRoomsCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_editor::ManualClock;
    use crate::map::{EdgeId, EdgeState, TileChange};

    #[test]
    fn kind_matches_variant() {
        let command: Command = PaintTilesCommand::default().into();
        assert_eq!(command.kind(), CommandKind::PaintTiles);
        let command: Command = DetectRoomsCommand::new().into();
        assert_eq!(command.kind(), CommandKind::DetectRooms);
    }

    #[test]
    fn different_kinds_never_coalesce() {
        let clock = ManualClock::new();
        let mut history = MapHistory::with_clock(100, clock.clone());
        let mut doc = MapDocument::default();

        let paint = PaintTilesCommand::new(vec![TileChange::new(0, 0, 0, 1)]);
        history.execute(paint.into(), &mut doc).unwrap();
        clock.advance(10);
        let edges = ModifyEdgesCommand::set(&doc, [EdgeId::new(0, 0, 1, 0)], EdgeState::Wall);
        history.execute(edges.into(), &mut doc).unwrap();

        assert_eq!(history.undo_count(), 2);
        let descriptions: Vec<&str> = history.undo_descriptions().collect();
        assert_eq!(descriptions, ["Modify Edges", "Paint Tiles"]);
    }

    #[test]
    fn window_comes_from_the_inner_command() {
        let paint: Command = PaintTilesCommand::default().into();
        let fill: Command = FillTilesCommand::default().into();
        assert_eq!(paint.coalesce_window_ms(), crate::abstract_editor::COALESCE_TIME_MS);
        assert_eq!(fill.coalesce_window_ms(), 0);
    }
}
