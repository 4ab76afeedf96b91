use async_trait::async_trait;
use notes_core::{
    Action, ClientId, DeleteNoteInput, FormField, GatewayError, GatewayResult, Note, NoteForm,
    NoteSession, NotesGateway, UpdateNoteInput,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    List,
    Create(Note),
    Update(UpdateNoteInput),
    Delete(DeleteNoteInput),
}

/// Records every call and answers from a fixed script.
#[derive(Default)]
struct ScriptedGateway {
    listed: Vec<Note>,
    failing: AtomicBool,
    calls: Mutex<Vec<Call>>,
    /// When set, create calls wait for one notification before answering.
    create_gate: Option<Arc<Notify>>,
    /// When set, update calls wait for one notification before answering.
    update_gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    fn listing(notes: Vec<Note>) -> Self {
        Self {
            listed: notes,
            ..Self::default()
        }
    }

    fn failing() -> Self {
        let gateway = Self::default();
        gateway.failing.store(true, Ordering::SeqCst);
        gateway
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> GatewayResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotesGateway for ScriptedGateway {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>> {
        self.record(Call::List)?;
        Ok(self.listed.clone())
    }

    async fn create_note(&self, note: &Note) -> GatewayResult<()> {
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
        self.record(Call::Create(note.clone()))
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> GatewayResult<()> {
        if let Some(gate) = &self.update_gate {
            gate.notified().await;
        }
        self.record(Call::Update(input.clone()))
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> GatewayResult<()> {
        self.record(Call::Delete(input.clone()))
    }
}

fn note(id: &str) -> Note {
    Note {
        id: id.to_string(),
        client_id: "other-client".to_string(),
        name: format!("name {id}"),
        description: format!("description {id}"),
        completed: false,
    }
}

fn ids(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.id.as_str()).collect()
}

async fn loaded_session(notes: Vec<Note>) -> NoteSession<ScriptedGateway> {
    let session = NoteSession::new(ScriptedGateway::listing(notes));
    let response = session.fetch_notes().await;
    assert!(response.ok, "{}", response.message);
    session
}

#[tokio::test]
async fn session_starts_loading_with_empty_state() {
    let session = NoteSession::new(ScriptedGateway::default());
    let state = session.state();
    assert!(state.loading);
    assert!(!state.error);
    assert!(state.notes.is_empty());
    assert_eq!(state.form, NoteForm::default());
    assert!(session.gateway().calls().is_empty());
}

#[tokio::test]
async fn fetch_success_replaces_notes_and_ends_loading() {
    let session = loaded_session(vec![note("a"), note("b")]).await;
    let state = session.state();
    assert!(!state.loading);
    assert!(!state.error);
    assert_eq!(ids(&state.notes), vec!["a", "b"]);
    assert_eq!(session.gateway().calls(), vec![Call::List]);
}

#[tokio::test]
async fn fetch_failure_sets_error_and_leaves_notes_empty() {
    let session = NoteSession::new(ScriptedGateway::failing());
    let response = session.fetch_notes().await;

    assert!(!response.ok);
    assert!(response.message.contains("connection refused"));
    let state = session.state();
    assert!(!state.loading);
    assert!(state.error);
    assert!(state.notes.is_empty());
}

#[tokio::test]
async fn create_prepends_resets_form_and_sends_same_note() {
    let session = loaded_session(vec![note("a")]).await;
    session.set_input(FormField::Name, "Groceries");
    session.set_input(FormField::Description, "eggs, milk");

    let response = session.create_note().await;
    assert!(response.ok, "{}", response.message);
    assert_eq!(response.message, "Note created.");

    let state = session.state();
    assert_eq!(state.notes.len(), 2);
    assert_eq!(state.form, NoteForm::default());
    let created = &state.notes[0];
    assert_eq!(Some(created.id.clone()), response.note_id);
    assert_eq!(created.name, "Groceries");
    assert_eq!(created.description, "eggs, milk");
    assert_eq!(created.client_id, session.client_id().as_str());
    assert!(!created.completed);

    assert_eq!(
        session.gateway().calls(),
        vec![Call::List, Call::Create(created.clone())]
    );
}

#[tokio::test]
async fn create_with_empty_name_does_nothing() {
    let session = loaded_session(vec![note("a")]).await;
    session.set_input(FormField::Description, "no name given");
    let before = session.state();

    let response = session.create_note().await;
    assert!(!response.ok);
    assert!(response.message.contains("name"));
    assert_eq!(session.state(), before);
    assert_eq!(session.gateway().calls(), vec![Call::List]);
}

#[tokio::test]
async fn create_with_blank_description_does_nothing() {
    let session = loaded_session(Vec::new()).await;
    session.set_input(FormField::Name, "title");
    session.set_input(FormField::Description, "   ");
    let before = session.state();

    let response = session.create_note().await;
    assert!(!response.ok);
    assert_eq!(session.state(), before);
    assert_eq!(session.gateway().calls(), vec![Call::List]);
}

#[tokio::test]
async fn create_failure_keeps_optimistic_note_but_reports_failure() {
    let gateway = ScriptedGateway::failing();
    let session = NoteSession::new(gateway);
    session.dispatch(Action::SetNotes { notes: Vec::new() });
    session.set_input(FormField::Name, "n");
    session.set_input(FormField::Description, "d");

    let response = session.create_note().await;
    assert!(!response.ok);
    assert!(response.message.starts_with("note_create failed"));

    let state = session.state();
    assert_eq!(state.notes.len(), 1);
    assert_eq!(Some(state.notes[0].id.clone()), response.note_id);
    assert_eq!(state.form, NoteForm::default());
}

#[tokio::test]
async fn toggle_flips_only_target_and_sends_new_value() {
    let session = loaded_session(vec![note("a"), note("b"), note("c")]).await;

    let response = session.toggle_completed("b").await;
    assert!(response.ok, "{}", response.message);
    assert_eq!(response.note_id.as_deref(), Some("b"));

    let state = session.state();
    assert_eq!(ids(&state.notes), vec!["a", "b", "c"]);
    let flags: Vec<bool> = state.notes.iter().map(|note| note.completed).collect();
    assert_eq!(flags, vec![false, true, false]);
    assert_eq!(
        session.gateway().calls().last(),
        Some(&Call::Update(UpdateNoteInput {
            id: "b".to_string(),
            completed: true,
        }))
    );

    session.toggle_completed("b").await;
    assert!(!session.state().notes[1].completed);
}

#[tokio::test]
async fn delete_removes_target_and_keeps_order() {
    let session = loaded_session(vec![note("a"), note("b"), note("c")]).await;

    let response = session.delete_note("b").await;
    assert!(response.ok, "{}", response.message);
    assert_eq!(ids(&session.state().notes), vec!["a", "c"]);
    assert_eq!(
        session.gateway().calls().last(),
        Some(&Call::Delete(DeleteNoteInput {
            id: "b".to_string(),
        }))
    );
}

#[tokio::test]
async fn mutation_of_unknown_note_touches_nothing() {
    let session = loaded_session(vec![note("a")]).await;
    let before = session.state();

    let toggled = session.toggle_completed("missing").await;
    let deleted = session.delete_note("missing").await;

    assert!(!toggled.ok);
    assert!(!deleted.ok);
    assert!(deleted.message.contains("missing"));
    assert_eq!(session.state(), before);
    assert_eq!(session.gateway().calls(), vec![Call::List]);
}

#[tokio::test]
async fn remote_mutation_failures_are_reported_without_rollback() {
    let session = loaded_session(vec![note("a"), note("b")]).await;
    session.gateway().failing.store(true, Ordering::SeqCst);

    let toggled = session.toggle_completed("a").await;
    assert!(!toggled.ok);
    assert!(toggled.message.starts_with("note_update failed"));
    assert!(session.state().notes[0].completed);

    let deleted = session.delete_note("b").await;
    assert!(!deleted.ok);
    assert!(deleted.message.starts_with("note_delete failed"));
    assert_eq!(ids(&session.state().notes), vec!["a"]);

    assert!(!session.state().error);
}

#[tokio::test]
async fn remote_notes_from_other_clients_are_prepended_once() {
    let session = NoteSession::with_client_id(
        ScriptedGateway::listing(vec![note("a")]),
        ClientId::from("me"),
    );
    session.fetch_notes().await;

    assert!(session.receive_remote_note(note("b")));
    assert!(!session.receive_remote_note(note("b")));
    assert_eq!(ids(&session.state().notes), vec!["b", "a"]);

    let mut own = note("c");
    own.client_id = "me".to_string();
    assert!(!session.receive_remote_note(own));
    assert_eq!(session.state().notes.len(), 2);
}

#[tokio::test]
async fn unknown_json_action_leaves_state_unchanged() {
    let session = loaded_session(vec![note("a")]).await;
    let before = session.state();

    let action: Action = serde_json::from_str(r#"{"type":"SHARE_NOTE","id":"a"}"#).unwrap();
    session.dispatch(action);
    assert_eq!(session.state(), before);
}

#[tokio::test]
async fn toggles_of_one_note_reach_gateway_in_local_order() {
    let gate = Arc::new(Notify::new());
    let gateway = ScriptedGateway {
        listed: vec![note("a")],
        update_gate: Some(Arc::clone(&gate)),
        ..ScriptedGateway::default()
    };
    let session = Arc::new(NoteSession::new(gateway));
    session.fetch_notes().await;

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.toggle_completed("a").await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.toggle_completed("a").await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The second toggle is still queued behind the first one's remote call.
    assert!(session.state().notes[0].completed);

    gate.notify_one();
    assert!(first.await.unwrap().ok);
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.notify_one();
    assert!(second.await.unwrap().ok);

    let updates: Vec<bool> = session
        .gateway()
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Update(input) => Some(input.completed),
            _ => None,
        })
        .collect();
    assert_eq!(updates, vec![true, false]);
    assert!(!session.state().notes[0].completed);
}

#[tokio::test]
async fn delete_of_fresh_note_waits_for_its_create() {
    let gate = Arc::new(Notify::new());
    let gateway = ScriptedGateway {
        create_gate: Some(Arc::clone(&gate)),
        ..ScriptedGateway::default()
    };
    let session = Arc::new(NoteSession::new(gateway));
    session.fetch_notes().await;
    session.set_input(FormField::Name, "trip");
    session.set_input(FormField::Description, "pack bags");

    let create = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.create_note().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let state = session.state();
    assert_eq!(state.notes.len(), 1);
    assert_eq!(state.form, NoteForm::default());
    let note_id = state.notes[0].id.clone();

    let delete = tokio::spawn({
        let session = Arc::clone(&session);
        let note_id = note_id.clone();
        async move { session.delete_note(&note_id).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The delete is queued behind the create's remote call.
    assert_eq!(session.state().notes.len(), 1);
    assert_eq!(session.gateway().calls(), vec![Call::List]);

    gate.notify_one();
    assert!(create.await.unwrap().ok);
    assert!(delete.await.unwrap().ok);

    let calls = session.gateway().calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(&calls[1], Call::Create(created) if created.id == note_id));
    assert_eq!(
        calls[2],
        Call::Delete(DeleteNoteInput {
            id: note_id.clone()
        })
    );
    assert!(session.state().notes.is_empty());
}
