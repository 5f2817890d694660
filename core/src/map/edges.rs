//! Walls and doors on the boundaries between cells.
//!
//! An [`EdgeId`] names the shared side of two orthogonally adjacent cells.
//! Construction normalizes the pair so that both orders produce the same
//! id, which lets [`EdgeMap`] key on it directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ids::Cell;
use super::tiles::{CellBounds, extend_bounds};

/// State of a single edge. `None` is never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeState {
    #[default]
    None,
    Wall,
    Door,
}

impl EdgeState {
    /// Next state in the `None → Wall → Door → None` cycle used by the edge tool.
    pub const fn cycle(self) -> Self {
        match self {
            Self::None => Self::Wall,
            Self::Wall => Self::Door,
            Self::Door => Self::None,
        }
    }
}

/// Side of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    North,
    South,
    East,
    West,
}

impl EdgeSide {
    pub const ALL: [EdgeSide; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Offset from a cell to its neighbour on this side.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    pub const fn neighbor(self, (x, y): Cell) -> Cell {
        let (dx, dy) = self.offset();
        (x + dx, y + dy)
    }
}

/// `true` when `a` and `b` share a side. Safe for any coordinates.
pub fn are_adjacent(a: Cell, b: Cell) -> bool {
    u64::from(a.0.abs_diff(b.0)) + u64::from(a.1.abs_diff(b.1)) == 1
}

/// Normalized identifier of the boundary between two adjacent cells.
///
/// `(x1, y1)` is always lexicographically smaller than `(x2, y2)`: cells
/// stacked vertically have `x1 == x2 && y1 < y2`, cells side by side have
/// `y1 == y2 && x1 < x2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl EdgeId {
    /// Builds the edge between `(x1, y1)` and `(x2, y2)` in either order.
    ///
    /// The cells must be orthogonally adjacent.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        debug_assert!(
            are_adjacent((x1, y1), (x2, y2)),
            "edge cells ({x1},{y1}) and ({x2},{y2}) are not adjacent"
        );
        if (x1, y1) <= (x2, y2) {
            Self { x1, y1, x2, y2 }
        } else {
            Self {
                x1: x2,
                y1: y2,
                x2: x1,
                y2: y1,
            }
        }
    }

    /// The edge between two cells, or `None` when they are not adjacent.
    pub fn between(a: Cell, b: Cell) -> Option<Self> {
        are_adjacent(a, b).then(|| Self::new(a.0, a.1, b.0, b.1))
    }

    /// The edge on `side` of `cell`.
    pub fn from_side(cell: Cell, side: EdgeSide) -> Self {
        let (nx, ny) = side.neighbor(cell);
        Self::new(cell.0, cell.1, nx, ny)
    }

    /// The two cells this edge separates, smaller first.
    pub const fn cells(&self) -> (Cell, Cell) {
        ((self.x1, self.y1), (self.x2, self.y2))
    }

    /// `true` when the edge separates two vertically stacked cells.
    pub const fn is_between_rows(&self) -> bool {
        self.x1 == self.x2
    }

    pub fn is_normalized(&self) -> bool {
        let (a, b) = self.cells();
        are_adjacent(a, b) && a < b
    }
}

/// Sparse edge storage. Absent keys read as [`EdgeState::None`].
/// A single recorded edge write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeChange {
    pub edge: EdgeId,
    pub old_state: EdgeState,
    pub new_state: EdgeState,
}

impl EdgeChange {
    pub const fn new(edge: EdgeId, old_state: EdgeState, new_state: EdgeState) -> Self {
        Self {
            edge,
            old_state,
            new_state,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeMap {
    edges: HashMap<EdgeId, EdgeState>,
}

impl EdgeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, edge: EdgeId) -> EdgeState {
        self.edges.get(&edge).copied().unwrap_or_default()
    }

    /// Stores `state`, returning the previous state.
    pub fn set(&mut self, edge: EdgeId, state: EdgeState) -> EdgeState {
        let previous = match state {
            EdgeState::None => self.edges.remove(&edge),
            _ => self.edges.insert(edge, state),
        };
        previous.unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, EdgeState)> + '_ {
        self.edges.iter().map(|(edge, state)| (*edge, *state))
    }

    /// Edges sorted by id, for deterministic output.
    pub fn sorted(&self) -> Vec<(EdgeId, EdgeState)> {
        let mut edges: Vec<_> = self.iter().collect();
        edges.sort_unstable_by_key(|(edge, _)| *edge);
        edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn count(&self, state: EdgeState) -> usize {
        self.edges.values().filter(|s| **s == state).count()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Bounds of every cell touching a stored edge.
    pub fn content_bounds(&self) -> Option<CellBounds> {
        let mut bounds = None;
        for edge in self.edges.keys() {
            let ((x1, y1), (x2, y2)) = edge.cells();
            extend_bounds(&mut bounds, x1, y1);
            extend_bounds(&mut bounds, x2, y2);
        }
        bounds
    }
}
