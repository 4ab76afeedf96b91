//! Note workflows for one application session.
//!
//! # Responsibility
//! - Run the fetch/create/toggle/delete workflows against a `NotesGateway`.
//! - Apply local changes optimistically, before the remote call settles.
//! - Reconcile notes announced by the backend's create subscription.
//!
//! # Invariants
//! - Remote failures never escape a workflow: fetch failures become the
//!   `ERROR` action, mutation failures are logged and reported through an
//!   `ActionResponse` with `ok=false`.
//! - Optimistic changes are not rolled back when the remote call fails.
//! - An acknowledgment reports success only after the remote call succeeded.
//! - Create/update/delete workflows for the same note id run one at a time,
//!   from local change to remote completion.
//! - Precondition failures touch neither state nor the gateway.

use crate::gateway::{DeleteNoteInput, NotesGateway, UpdateNoteInput};
use crate::model::note::{generate_note_id, ClientId, FormField, Note, NoteId};
use crate::service::note_locks::NoteLocks;
use crate::state::app_state::ApplicationState;
use crate::state::reducer::{remove_note, toggle_completed, Action};
use crate::state::store::NoteStore;
use log::{debug, error, info, warn};
use std::time::Instant;

/// Outcome of one workflow, shown to the user as an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation fully succeeded, remote call included.
    pub ok: bool,
    /// Note the operation targeted, when one was resolved.
    pub note_id: Option<NoteId>,
    /// Human-readable acknowledgment.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, note_id: Option<NoteId>) -> Self {
        Self {
            ok: true,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, note_id: Option<NoteId>) -> Self {
        Self {
            ok: false,
            note_id,
            message: message.into(),
        }
    }
}

/// State container, gateway and session tag bound together.
pub struct NoteSession<G: NotesGateway> {
    client_id: ClientId,
    store: NoteStore,
    gateway: G,
    note_locks: NoteLocks,
}

impl<G: NotesGateway> NoteSession<G> {
    /// Starts a session with a freshly generated client id.
    pub fn new(gateway: G) -> Self {
        Self::with_client_id(gateway, ClientId::generate())
    }

    pub fn with_client_id(gateway: G, client_id: ClientId) -> Self {
        info!(
            "event=session_start module=service status=ok client_id={}",
            client_id
        );
        Self {
            client_id,
            store: NoteStore::new(),
            gateway,
            note_locks: NoteLocks::default(),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns a copy of the current state for rendering.
    pub fn state(&self) -> ApplicationState {
        self.store.snapshot()
    }

    /// Forwards a raw action from the view layer.
    pub fn dispatch(&self, action: Action) {
        self.store.dispatch(action);
    }

    pub fn set_input(&self, field: FormField, value: impl Into<String>) {
        self.store.dispatch(Action::SetInput {
            name: field,
            value: value.into(),
        });
    }

    pub fn reset_form(&self) {
        self.store.dispatch(Action::ResetForm);
    }

    /// Loads the note list, replacing local notes on success.
    ///
    /// Failure sets the error flag; there is no retry.
    pub async fn fetch_notes(&self) -> ActionResponse {
        let started_at = Instant::now();
        info!("event=notes_fetch module=service status=start");

        match self.gateway.list_notes().await {
            Ok(notes) => {
                let count = notes.len();
                self.store.dispatch(Action::SetNotes { notes });
                info!(
                    "event=notes_fetch module=service status=ok count={} duration_ms={}",
                    count,
                    started_at.elapsed().as_millis()
                );
                ActionResponse::success(format!("Loaded {count} note(s)."), None)
            }
            Err(err) => {
                self.store.dispatch(Action::Error);
                error!(
                    "event=notes_fetch module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                ActionResponse::failure(format!("notes_fetch failed: {err}"), None)
            }
        }
    }

    /// Creates a note from the current form values.
    ///
    /// The note is prepended and the form cleared, in one step, before the
    /// create request is sent. The new id stays locked until the request
    /// settles, so a toggle or delete of the fresh note reaches the gateway
    /// after its create.
    pub async fn create_note(&self) -> ActionResponse {
        let note_id = generate_note_id();
        let _lock = self.note_locks.acquire(&note_id).await;

        let mut rejected = None;
        let mut created = None;
        self.store.dispatch_all_with(|state| {
            if let Err(err) = state.form.validate() {
                rejected = Some(err);
                return None;
            }
            let note = Note::with_id(
                note_id.clone(),
                &self.client_id,
                state.form.name.clone(),
                state.form.description.clone(),
            );
            created = Some(note.clone());
            Some(vec![Action::AddNote { note }, Action::ResetForm])
        });

        let note = match (created, rejected) {
            (Some(note), _) => note,
            (None, reason) => {
                let message = reason.map_or_else(
                    || "note_create rejected".to_string(),
                    |err| err.to_string(),
                );
                debug!(
                    "event=note_create module=service status=rejected reason={}",
                    message
                );
                return ActionResponse::failure(message, None);
            }
        };

        let started_at = Instant::now();
        match self.gateway.create_note(&note).await {
            Ok(()) => {
                info!(
                    "event=note_create module=service status=ok note_id={} duration_ms={}",
                    note_id,
                    started_at.elapsed().as_millis()
                );
                ActionResponse::success("Note created.", Some(note_id))
            }
            Err(err) => {
                error!(
                    "event=note_create module=service status=error note_id={} duration_ms={} error={}",
                    note_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                ActionResponse::failure(format!("note_create failed: {err}"), Some(note_id))
            }
        }
    }

    /// Flips the completion flag of one note.
    pub async fn toggle_completed(&self, note_id: &str) -> ActionResponse {
        let _lock = self.note_locks.acquire(note_id).await;

        let mut completed = None;
        let applied = self.store.dispatch_with(|state| {
            let (notes, flipped) = toggle_completed(&state.notes, note_id)?;
            completed = Some(flipped);
            Some(Action::SetNotes { notes })
        });
        let completed = match (applied, completed) {
            (Some(_), Some(completed)) => completed,
            _ => return not_found("note_update", note_id),
        };

        let input = UpdateNoteInput {
            id: note_id.to_string(),
            completed,
        };
        let started_at = Instant::now();
        match self.gateway.update_note(&input).await {
            Ok(()) => {
                info!(
                    "event=note_update module=service status=ok note_id={} completed={} duration_ms={}",
                    note_id,
                    completed,
                    started_at.elapsed().as_millis()
                );
                ActionResponse::success("Note updated.", Some(input.id))
            }
            Err(err) => {
                error!(
                    "event=note_update module=service status=error note_id={} completed={} duration_ms={} error={}",
                    note_id,
                    completed,
                    started_at.elapsed().as_millis(),
                    err
                );
                ActionResponse::failure(format!("note_update failed: {err}"), Some(input.id))
            }
        }
    }

    /// Removes one note.
    pub async fn delete_note(&self, note_id: &str) -> ActionResponse {
        let _lock = self.note_locks.acquire(note_id).await;

        let applied = self.store.dispatch_with(|state| {
            remove_note(&state.notes, note_id).map(|notes| Action::SetNotes { notes })
        });
        if applied.is_none() {
            return not_found("note_delete", note_id);
        }

        let input = DeleteNoteInput {
            id: note_id.to_string(),
        };
        let started_at = Instant::now();
        match self.gateway.delete_note(&input).await {
            Ok(()) => {
                info!(
                    "event=note_delete module=service status=ok note_id={} duration_ms={}",
                    note_id,
                    started_at.elapsed().as_millis()
                );
                ActionResponse::success("Note deleted.", Some(input.id))
            }
            Err(err) => {
                error!(
                    "event=note_delete module=service status=error note_id={} duration_ms={} error={}",
                    note_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                ActionResponse::failure(format!("note_delete failed: {err}"), Some(input.id))
            }
        }
    }

    /// Applies a note announced by the backend's create subscription.
    ///
    /// Returns `true` when the note was added. Notes authored by this
    /// session were already inserted optimistically and are skipped, as are
    /// ids already present.
    pub fn receive_remote_note(&self, note: Note) -> bool {
        if note.is_authored_by(&self.client_id) {
            debug!(
                "event=note_remote_created module=service status=skipped reason=own_client note_id={}",
                note.id
            );
            return false;
        }

        let note_id = note.id.clone();
        let applied = self
            .store
            .dispatch_with(move |state| {
                if state.contains_note(&note.id) {
                    None
                } else {
                    Some(Action::AddNote { note })
                }
            })
            .is_some();

        debug!(
            "event=note_remote_created module=service status={} note_id={}",
            if applied { "ok" } else { "skipped" },
            note_id
        );
        applied
    }
}

fn not_found(event: &'static str, note_id: &str) -> ActionResponse {
    warn!(
        "event={} module=service status=rejected reason=note_not_found note_id={}",
        event, note_id
    );
    ActionResponse::failure(format!("note not found: {note_id}"), None)
}
