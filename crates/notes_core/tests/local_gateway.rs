use notes_core::{
    ClientId, DeleteNoteInput, FormField, GatewayError, LocalGateway, Note, NoteSession,
    NotesGateway, UpdateNoteInput,
};
use std::sync::Arc;

fn note(client_id: &ClientId, name: &str) -> Note {
    Note::new(client_id, name, format!("{name} description"))
}

#[tokio::test]
async fn create_list_update_delete_roundtrip() {
    let gateway = LocalGateway::open_in_memory().unwrap();
    let client_id = ClientId::generate();
    let first = note(&client_id, "first");
    let second = note(&client_id, "second");

    gateway.create_note(&first).await.unwrap();
    gateway.create_note(&second).await.unwrap();

    let listed = gateway.list_notes().await.unwrap();
    assert_eq!(listed, vec![second.clone(), first.clone()]);

    gateway
        .update_note(&UpdateNoteInput {
            id: first.id.clone(),
            completed: true,
        })
        .await
        .unwrap();
    gateway
        .delete_note(&DeleteNoteInput {
            id: second.id.clone(),
        })
        .await
        .unwrap();

    let listed = gateway.list_notes().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first.id);
    assert!(listed[0].completed);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let gateway = LocalGateway::open_in_memory().unwrap();

    let err = gateway
        .update_note(&UpdateNoteInput {
            id: "ghost".to_string(),
            completed: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(ref id) if id == "ghost"));

    let err = gateway
        .delete_note(&DeleteNoteInput {
            id: "ghost".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_create_is_rejected() {
    let gateway = LocalGateway::open_in_memory().unwrap();
    let created = note(&ClientId::generate(), "only");

    gateway.create_note(&created).await.unwrap();
    let err = gateway.create_note(&created).await.unwrap_err();
    assert!(matches!(err, GatewayError::Storage(_)));
    assert_eq!(gateway.list_notes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn notes_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");
    let created = note(&ClientId::generate(), "kept");

    {
        let gateway = LocalGateway::open(&path).unwrap();
        gateway.create_note(&created).await.unwrap();
    }

    let reopened = LocalGateway::open(&path).unwrap();
    assert_eq!(reopened.list_notes().await.unwrap(), vec![created]);
}

#[tokio::test]
async fn sessions_share_state_through_the_backend() {
    let gateway = Arc::new(LocalGateway::open_in_memory().unwrap());

    let writer = NoteSession::new(Arc::clone(&gateway));
    writer.fetch_notes().await;
    writer.set_input(FormField::Name, "shared");
    writer.set_input(FormField::Description, "visible to the next session");
    let created = writer.create_note().await;
    assert!(created.ok, "{}", created.message);
    let note_id = created.note_id.expect("created note id");
    assert!(writer.toggle_completed(&note_id).await.ok);

    let reader = NoteSession::new(Arc::clone(&gateway));
    assert!(reader.state().loading);
    reader.fetch_notes().await;
    let state = reader.state();
    assert!(!state.loading);
    assert_eq!(state.notes.len(), 1);
    assert_eq!(state.notes[0].id, note_id);
    assert!(state.notes[0].completed);
    assert_eq!(state.notes[0].client_id, writer.client_id().as_str());

    assert!(reader.delete_note(&note_id).await.ok);
    assert!(gateway.list_notes().await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_delete_failure_keeps_local_removal() {
    let gateway = Arc::new(LocalGateway::open_in_memory().unwrap());
    let session = NoteSession::new(Arc::clone(&gateway));
    session.fetch_notes().await;

    // A note announced by another client but never stored in this backend.
    let foreign = note(&ClientId::from("elsewhere"), "phantom");
    assert!(session.receive_remote_note(foreign.clone()));

    let response = session.delete_note(&foreign.id).await;
    assert!(!response.ok);
    assert!(response.message.contains("not found"));
    assert!(session.state().notes.is_empty());
}
