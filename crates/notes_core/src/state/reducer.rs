//! Pure state transitions for the notes client.
//!
//! # Responsibility
//! - Map `(state, action)` to the next state without side effects.
//! - Provide the list rebuild helpers used by optimistic update/delete.
//!
//! # Invariants
//! - `reduce` performs no I/O and never panics.
//! - Unrecognized actions return the input state unchanged.

use crate::model::note::{FormField, Note, NoteForm};
use crate::state::app_state::ApplicationState;
use serde::{Deserialize, Serialize};

/// Named state transitions.
///
/// Serialized with a `type` tag so view layers can dispatch actions as JSON
/// (`{"type":"SET_INPUT","name":"name","value":"x"}`). Any `type` this
/// version does not know decodes to `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replaces the note list and ends loading.
    SetNotes { notes: Vec<Note> },
    /// Marks the initial fetch as failed.
    Error,
    /// Prepends one note.
    AddNote { note: Note },
    /// Clears the form back to empty values.
    ResetForm,
    /// Sets one form field.
    SetInput { name: FormField, value: String },
    #[serde(other)]
    Unknown,
}

/// Applies one action to a state.
pub fn reduce(state: ApplicationState, action: Action) -> ApplicationState {
    match action {
        Action::SetNotes { notes } => ApplicationState {
            notes,
            loading: false,
            ..state
        },
        Action::Error => ApplicationState {
            loading: false,
            error: true,
            ..state
        },
        Action::AddNote { note } => {
            let mut notes = Vec::with_capacity(state.notes.len() + 1);
            notes.push(note);
            notes.extend(state.notes);
            ApplicationState { notes, ..state }
        }
        Action::ResetForm => ApplicationState {
            form: NoteForm::default(),
            ..state
        },
        Action::SetInput { name, value } => {
            let mut form = state.form;
            form.set_field(name, value);
            ApplicationState { form, ..state }
        }
        Action::Unknown => state,
    }
}

/// Rebuilds `notes` with the completion flag of `note_id` flipped.
///
/// Returns `None` when no note carries `note_id`. Order is preserved and
/// only the target note changes.
pub fn toggle_completed(notes: &[Note], note_id: &str) -> Option<(Vec<Note>, bool)> {
    let index = notes.iter().position(|note| note.id == note_id)?;
    let mut rebuilt = notes.to_vec();
    let target = &mut rebuilt[index];
    target.completed = !target.completed;
    let completed = target.completed;
    Some((rebuilt, completed))
}

/// Rebuilds `notes` without `note_id`, keeping the order of the rest.
///
/// Returns `None` when no note carries `note_id`.
pub fn remove_note(notes: &[Note], note_id: &str) -> Option<Vec<Note>> {
    if !notes.iter().any(|note| note.id == note_id) {
        return None;
    }
    Some(
        notes
            .iter()
            .filter(|note| note.id != note_id)
            .cloned()
            .collect(),
    )
}
