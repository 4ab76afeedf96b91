//! Application state held by the notes client.
//!
//! # Invariants
//! - A fresh state is `loading=true` with no notes until the first fetch settles.
//! - Note ids are unique within `notes`.
//! - `notes` is ordered most-recently-created first.

use crate::model::note::{Note, NoteForm};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationState {
    pub notes: Vec<Note>,
    /// True until the initial fetch succeeds or fails.
    pub loading: bool,
    /// True when the initial fetch failed.
    pub error: bool,
    pub form: NoteForm,
}

impl ApplicationState {
    /// Returns the state a session starts from.
    pub fn initial() -> Self {
        Self {
            notes: Vec::new(),
            loading: true,
            error: false,
            form: NoteForm::default(),
        }
    }

    pub fn find_note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    pub fn contains_note(&self, note_id: &str) -> bool {
        self.find_note(note_id).is_some()
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::initial()
    }
}
