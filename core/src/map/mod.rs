//! Plain data types and leaf stores of a map document.
//!
//! - [`TileLayer`]: run-length encoded tiles
//! - [`EdgeMap`]: sparse walls and doors
//! - [`Palette`], [`IconLibrary`]: tile colors and marker icons
//! - [`Room`], [`RegionGroup`], [`Marker`]: named entities
//!
//! None of these types know about each other; [`MapDocument`](crate::document::MapDocument)
//! ties them together and keeps derived state consistent.

mod color;
mod edges;
mod grid;
mod icons;
mod ids;
pub mod limits;
mod marker;
mod palette;
mod room;
mod tiles;

pub use color::Color;
pub use edges::{EdgeChange, EdgeId, EdgeMap, EdgeSide, EdgeState, are_adjacent};
pub use grid::{GridConfig, GridPreset};
pub use icons::{IconData, IconLibrary};
pub use ids::{Cell, MarkerId, RegionGroupId, RoomId};
pub use marker::{Marker, MarkerProperties};
pub use palette::{Palette, TileType};
pub use room::{DetectedRegion, RegionGroup, RegionProperties, Room, RoomProperties};
pub use tiles::{CellBounds, EMPTY_TILE, TileChange, TileId, TileLayer, TileRow, TileRun};
