//! Editable targets and reversible editor actions.
//!
//! This module defines the core abstractions for an undo/redo editor system:
//!
//! - [`Editable`]: types that actions operate on
//! - [`EditAction`]: a reversible edit operation (Command pattern)
//! - [`CoalesceContext`]: timing and distance passed to [`EditAction::coalesce`]
//! - [`EditActionError`] / [`EditActionResult`]: error handling for actions
//!
//! EditActions are self-contained: each implementation internally stores whatever
//! data it needs (target identifiers, old/new values, recorded deltas, etc.).

use std::fmt;

use thiserror::Error;

/// A type that serves as an editing target.
///
/// The history calls [`mark_dirty`](Self::mark_dirty) after every undo and
/// redo so that saving is offered even when the restored state happens to
/// match a previous one.
///
/// # Example
///
/// ```ignore
/// struct MyScene { dirty: bool }
/// impl Editable for MyScene {
///     fn mark_dirty(&mut self) { self.dirty = true; }
/// }
/// ```
pub trait Editable: 'static {
    /// Flags the target as modified since the last save.
    fn mark_dirty(&mut self) {}
}

/// Error type for action execution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditActionError {
    /// The target object was not found.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The target is in an invalid state for this action.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// Default [`CoalesceContext::distance_sq`].
pub const COALESCE_DIST_SQ: f32 = 16.0;

/// Coalescing window for paint and edge strokes.
pub const COALESCE_TIME_MS: u64 = 150;

/// Coalescing window for property edits (typing into a name field, dragging a color).
pub const PROPERTY_COALESCE_TIME_MS: u64 = 300;

/// What the history knows about a coalescing candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoalesceContext {
    /// Milliseconds since the previous command was added.
    pub time_delta_ms: u64,
    /// Squared stroke distance, in cells, a command may use to refuse a
    /// merge. The map commands merge on time alone.
    pub distance_sq: f32,
}

impl CoalesceContext {
    pub const fn new(time_delta_ms: u64) -> Self {
        Self {
            time_delta_ms,
            distance_sq: COALESCE_DIST_SQ,
        }
    }
}

/// A reversible editor action (Command pattern).
///
/// EditActions encapsulate a single logical edit and capture enough state to
/// undo the change and redo it. Each implementation stores its own data
/// internally; there is no prescribed property system.
///
/// # Coalescing
///
/// Actions that represent incremental changes (each mouse move during a
/// paint stroke, each keystroke in a name field) can override
/// [`coalesce`](Self::coalesce) so that rapid consecutive actions collapse
/// into one undo step. The history only offers a candidate when it arrives
/// within [`coalesce_window_ms`](Self::coalesce_window_ms) of the previous
/// command.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct Rename {
///     room: RoomId,
///     old_name: String,
///     new_name: String,
/// }
///
/// impl EditAction<MapDocument> for Rename {
///     fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
///         target.rename_room(&self.room, &self.new_name);
///         Ok(())
///     }
///
///     fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
///         target.rename_room(&self.room, &self.old_name);
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Rename room"
///     }
///
///     fn coalesce(&mut self, other: Self, _ctx: &CoalesceContext) -> Option<Self> {
///         if self.room == other.room {
///             self.new_name = other.new_name;
///             return None; // consumed
///         }
///         Some(other) // not mergeable
///     }
/// }
/// ```
pub trait EditAction<T: Editable>: fmt::Debug + Send {
    /// Applies the action to the target (forward / redo direction).
    ///
    /// Returns `Ok(())` on success, or an [`EditActionError`] if the action
    /// could not be applied.
    fn apply(&mut self, target: &mut T) -> EditActionResult;

    /// Reverses the action (undo direction).
    ///
    /// Must restore the target to the state before [`apply`](Self::apply)
    /// was called.
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// A short, human-readable description for display in the edit menu.
    ///
    /// Examples: `"Paint Tiles"`, `"Modify Room Properties"`.
    fn description(&self) -> &str;

    /// Tries to absorb `other` into `self`.
    ///
    /// If the actions are compatible, `self` takes over `other`'s effect and
    /// returns `None` (the other action is consumed). Otherwise returns
    /// `Some(other)` back to the caller.
    ///
    /// Returns `Some(other)` by default (no coalescing).
    fn coalesce(&mut self, other: Self, ctx: &CoalesceContext) -> Option<Self>
    where
        Self: Sized,
    {
        let _ = ctx;
        Some(other)
    }

    /// How long after this action a follow-up may still coalesce into it.
    ///
    /// Default: `0` (never).
    fn coalesce_window_ms(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: i32,
        dirty: bool,
    }

    impl Editable for Counter {
        fn mark_dirty(&mut self) {
            self.dirty = true;
        }
    }

    #[derive(Debug)]
    struct Add {
        amount: i32,
    }

    impl EditAction<Counter> for Add {
        fn apply(&mut self, target: &mut Counter) -> EditActionResult {
            target.value += self.amount;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> EditActionResult {
            target.value -= self.amount;
            Ok(())
        }

        fn description(&self) -> &str {
            "Add"
        }
    }

    #[test]
    fn apply_modifies_target() {
        let mut counter = Counter {
            value: 0,
            dirty: false,
        };
        let mut action = Add { amount: 5 };
        action.apply(&mut counter).unwrap();
        assert_eq!(counter.value, 5);
    }

    #[test]
    fn undo_reverses_apply() {
        let mut counter = Counter {
            value: 0,
            dirty: false,
        };
        let mut action = Add { amount: 5 };
        action.apply(&mut counter).unwrap();
        action.undo(&mut counter).unwrap();
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn action_description() {
        let action = Add { amount: 1 };
        assert_eq!(action.description(), "Add");
    }

    #[test]
    fn action_error_display() {
        assert_eq!(
            EditActionError::TargetNotFound("room_3".into()).to_string(),
            "target not found: room_3"
        );
        assert_eq!(
            EditActionError::InvalidState("locked".into()).to_string(),
            "invalid state: locked"
        );
        assert_eq!(
            EditActionError::Custom("something went wrong".into()).to_string(),
            "something went wrong"
        );
    }

    #[test]
    fn default_never_coalesces() {
        let mut first = Add { amount: 1 };
        let second = Add { amount: 2 };
        assert_eq!(first.coalesce_window_ms(), 0);
        let returned = first.coalesce(second, &CoalesceContext::new(0));
        assert_eq!(returned.map(|a| a.amount), Some(2));
        assert_eq!(first.amount, 1);
    }

    #[test]
    fn default_mark_dirty_is_overridable() {
        let mut counter = Counter {
            value: 0,
            dirty: false,
        };
        counter.mark_dirty();
        assert!(counter.dirty);
    }

    #[test]
    fn context_uses_default_distance() {
        let ctx = CoalesceContext::new(40);
        assert_eq!(ctx.time_delta_ms, 40);
        assert_eq!(ctx.distance_sq, COALESCE_DIST_SQ);
    }
}
