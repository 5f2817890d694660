//! Size limits enforced by the loading layer before data enters a document.
//!
//! The model itself stays correct (no overflow, no recursion) up to these
//! maximums; [`DocumentSnapshot::validate`](crate::document::DocumentSnapshot::validate)
//! rejects anything larger.

/// Largest accepted `cols`/`rows` value.
pub const MAX_GRID_DIMENSION: i32 = 10_000;
pub const MIN_GRID_DIMENSION: i32 = 1;
/// Largest absolute cell coordinate accepted for stored tiles, edges and
/// cell assignments.
pub const MAX_COORDINATE: i32 = MAX_GRID_DIMENSION;
pub const MAX_TILE_SIZE: i32 = 256;
pub const MIN_TILE_SIZE: i32 = 1;

pub const MAX_TILE_ROWS: usize = 1_000_000;
pub const MAX_MARKERS: usize = 100_000;
pub const MAX_ROOMS: usize = 10_000;
pub const MAX_REGION_GROUPS: usize = 10_000;
pub const MAX_EDGES: usize = 1_000_000;
pub const MAX_PALETTE_ENTRIES: usize = 10_000;
pub const MAX_CELL_ASSIGNMENTS: usize = 10_000_000;
pub const MAX_ICONS: usize = 10_000;
