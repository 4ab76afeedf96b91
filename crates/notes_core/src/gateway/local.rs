//! SQLite-backed stand-in for the managed notes backend.
//!
//! # Responsibility
//! - Serve the four gateway operations from a local database file, for
//!   offline development and integration tests.
//!
//! # Invariants
//! - `list_notes` is ordered by creation time, newest first.
//! - Update/delete of an unknown id fails with `GatewayError::NotFound`.
//! - Creating an id that already exists is rejected by the primary key.

use super::{DeleteNoteInput, GatewayError, GatewayResult, NotesGateway, UpdateNoteInput};
use crate::db::{open_db, open_db_in_memory};
use crate::model::note::Note;
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    client_id,
    name,
    description,
    completed
FROM notes";

pub struct LocalGateway {
    conn: Mutex<Connection>,
}

impl LocalGateway {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a throwaway in-memory database.
    pub fn open_in_memory() -> GatewayResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NotesGateway for LocalGateway {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        debug!(
            "event=gateway_request module=gateway status=ok operation=listNotes backend=local count={}",
            notes.len()
        );
        Ok(notes)
    }

    async fn create_note(&self, note: &Note) -> GatewayResult<()> {
        let now = now_epoch_ms();
        self.conn().execute(
            "INSERT INTO notes (
                id,
                client_id,
                name,
                description,
                completed,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                note.id.as_str(),
                note.client_id.as_str(),
                note.name.as_str(),
                note.description.as_str(),
                bool_to_int(note.completed),
                now,
            ],
        )?;

        debug!(
            "event=gateway_request module=gateway status=ok operation=createNote backend=local note_id={}",
            note.id
        );
        Ok(())
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> GatewayResult<()> {
        let changed = self.conn().execute(
            "UPDATE notes
             SET
                completed = ?2,
                updated_at = ?3
             WHERE id = ?1;",
            params![
                input.id.as_str(),
                bool_to_int(input.completed),
                now_epoch_ms()
            ],
        )?;

        if changed == 0 {
            return Err(GatewayError::NotFound(input.id.clone()));
        }
        Ok(())
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> GatewayResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM notes WHERE id = ?1;", [input.id.as_str()])?;

        if changed == 0 {
            return Err(GatewayError::NotFound(input.id.clone()));
        }
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> GatewayResult<Note> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(GatewayError::InvalidResponse(format!(
                "invalid completed value `{other}` in notes.completed"
            )));
        }
    };

    Ok(Note {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        completed,
    })
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
