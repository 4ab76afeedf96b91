//! Shared state container.
//!
//! # Responsibility
//! - Hold the one `ApplicationState` of a session.
//! - Apply actions through `reduce` only.
//!
//! # Invariants
//! - Every mutation goes through `reduce`.
//! - `dispatch_with` computes and applies its action under one lock, so a
//!   list rebuilt from the current notes cannot overwrite a concurrent change.

use crate::state::app_state::ApplicationState;
use crate::state::reducer::{reduce, Action};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct NoteStore {
    state: Mutex<ApplicationState>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one action.
    pub fn dispatch(&self, action: Action) {
        let mut guard = self.lock();
        apply(&mut *guard, action);
    }

    /// Derives an action from the current state and applies it atomically.
    ///
    /// `f` returning `None` leaves state untouched. The returned value is the
    /// action that was applied, if any.
    pub fn dispatch_with<F>(&self, f: F) -> Option<Action>
    where
        F: FnOnce(&ApplicationState) -> Option<Action>,
    {
        let mut guard = self.lock();
        let action = f(&*guard)?;
        apply(&mut *guard, action.clone());
        Some(action)
    }

    /// Like `dispatch_with`, for several actions applied in order under one lock.
    ///
    /// No other dispatch can observe or interleave with a partial batch.
    pub fn dispatch_all_with<F>(&self, f: F) -> Option<Vec<Action>>
    where
        F: FnOnce(&ApplicationState) -> Option<Vec<Action>>,
    {
        let mut guard = self.lock();
        let actions = f(&*guard)?;
        for action in &actions {
            apply(&mut *guard, action.clone());
        }
        Some(actions)
    }

    /// Returns a copy of the current state for rendering.
    pub fn snapshot(&self) -> ApplicationState {
        self.lock().clone()
    }

    // A panic in a reducer caller must not wedge the view.
    fn lock(&self) -> MutexGuard<'_, ApplicationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply(state: &mut ApplicationState, action: Action) {
    let current = std::mem::take(state);
    *state = reduce(current, action);
}
