//! Abstract editor framework for reversible editing operations.
//!
//! This module provides the foundational traits and types for building
//! an undo/redo-capable editor system. It is decoupled from the map
//! document so the history can be tested against any [`Editable`] target.
//!
//! - [`Editable`]: types that can be edited
//! - [`EditAction`]: an edit operation (Command pattern)
//! - [`EditActionHistory`]: undo/redo stack managing action sequences
//! - [`Clock`]: millisecond time source driving coalescing
//!
//! # Coalescing
//!
//! A new action may merge into the top undo entry when it arrives within
//! that entry's [`EditAction::coalesce_window_ms`] and the merge chain is
//! intact. Undo and redo break the chain, so an edit made right after
//! stepping back always starts a fresh entry.

mod action;
mod clock;
mod history;

pub use action::{
    COALESCE_DIST_SQ, COALESCE_TIME_MS, CoalesceContext, EditAction, EditActionError,
    EditActionResult, Editable, PROPERTY_COALESCE_TIME_MS,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use history::{DEFAULT_MAX_UNDO, EditActionHistory};
