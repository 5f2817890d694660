//! Undo/redo action history.
//!
//! [`EditActionHistory`] manages a linear undo/redo stack of [`EditAction`]s.
//! When a new action is pushed after undoing, the redo stack is cleared
//! (standard editor behavior). Rapid consecutive actions may coalesce into
//! the top entry; timing comes from an injected [`Clock`].

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

use super::action::{CoalesceContext, EditAction, EditActionResult, Editable};
use super::clock::{Clock, MonotonicClock};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Manages an undo/redo stack of editor actions.
///
/// The undo stack is a bounded [`VecDeque`]. When it exceeds `max_undo`,
/// the oldest action is dropped from the front. The redo stack is an
/// unbounded [`Vec`] (it can never grow larger than the undo stack was).
///
/// # Example
///
/// ```ignore
/// let mut history = EditActionHistory::new(50);
/// let mut document = MapDocument::default();
///
/// // Execute and record an action
/// history.execute(Command::from(paint), &mut document)?;
///
/// // Undo the last action
/// history.undo(&mut document)?;
///
/// // Redo it
/// history.redo(&mut document)?;
/// ```
pub struct EditActionHistory<T: Editable, A: EditAction<T>> {
    undo_stack: VecDeque<A>,
    redo_stack: Vec<A>,
    max_undo: usize,
    /// Set by undo/redo so the next command never merges into an entry the
    /// user has already stepped over.
    merge_broken: bool,
    clock: Box<dyn Clock>,
    last_command_ms: Option<u64>,
    _target: PhantomData<fn(&mut T)>,
}

impl<T: Editable, A: EditAction<T>> EditActionHistory<T, A> {
    /// Creates a new empty action history with the given maximum undo depth.
    ///
    /// When the undo stack exceeds `max_undo`, the oldest action is dropped.
    pub fn new(max_undo: usize) -> Self {
        Self::with_clock(max_undo, MonotonicClock::new())
    }

    /// Creates a history that times coalescing with `clock`.
    pub fn with_clock(max_undo: usize, clock: impl Clock + 'static) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            merge_broken: false,
            clock: Box::new(clock),
            last_command_ms: None,
            _target: PhantomData,
        }
    }

    /// Applies an action to the target and records it.
    ///
    /// Shorthand for [`add_command`](Self::add_command) with `execute = true`.
    pub fn execute(&mut self, action: A, target: &mut T) -> EditActionResult {
        self.add_command(action, target, true)
    }

    /// Records an action, applying it first when `execute` is set.
    ///
    /// Pass `execute = false` when the caller already mutated the target
    /// (live tool preview) and only needs the entry for undo.
    ///
    /// If the action arrives within the top entry's
    /// [coalescing window](EditAction::coalesce_window_ms) and the merge chain
    /// is intact, the top entry may absorb it. A coalesced entry is
    /// re-applied (when `execute`) and nothing new is pushed.
    ///
    /// Either way the redo stack is cleared. If the action fails, it is not
    /// pushed onto the stack.
    pub fn add_command(
        &mut self,
        mut action: A,
        target: &mut T,
        execute: bool,
    ) -> EditActionResult {
        let now = self.clock.now_ms();
        let time_delta = self.last_command_ms.map(|last| now.saturating_sub(last));
        self.last_command_ms = Some(now);

        if !self.merge_broken
            && let Some(delta) = time_delta
            && let Some(top) = self.undo_stack.back_mut()
            && delta < top.coalesce_window_ms()
        {
            match top.coalesce(action, &CoalesceContext::new(delta)) {
                None => {
                    self.redo_stack.clear();
                    if execute {
                        top.apply(target)?;
                    }
                    return Ok(());
                }
                Some(returned) => action = returned,
            }
        }

        if execute {
            action.apply(target)?;
        }
        self.merge_broken = false;
        self.redo_stack.clear();

        self.undo_stack.push_back(action);
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
        Ok(())
    }

    /// Undoes the most recent action.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. A failed undo
    /// leaves the action on the undo stack.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = action.undo(target) {
            log::warn!("Undo of '{}' failed: {err}", action.description());
            self.undo_stack.push_back(action);
            return Err(err);
        }
        self.redo_stack.push(action);
        self.merge_broken = true;
        target.mark_dirty();
        Ok(true)
    }

    /// Redoes the most recently undone action.
    ///
    /// Returns `Ok(false)` when there is nothing to redo. A failed redo
    /// leaves the action on the redo stack.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = action.apply(target) {
            log::warn!("Redo of '{}' failed: {err}", action.description());
            self.redo_stack.push(action);
            return Err(err);
        }
        self.undo_stack.push_back(action);
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
        self.merge_broken = true;
        target.mark_dirty();
        Ok(true)
    }

    /// Returns `true` if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the action [`undo`](Self::undo) would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|a| a.description())
    }

    /// Description of the action [`redo`](Self::redo) would reapply.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|a| a.description())
    }

    /// Returns an iterator over undo action descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Returns an iterator over redo action descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    /// Returns the number of actions in the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of actions in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Returns the maximum undo depth.
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Clears both undo and redo stacks and resets coalescing state.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.merge_broken = false;
        self.last_command_ms = None;
    }
}

impl<T: Editable, A: EditAction<T>> fmt::Debug for EditActionHistory<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("merge_broken", &self.merge_broken)
            .field("last_command_ms", &self.last_command_ms)
            .finish()
    }
}
