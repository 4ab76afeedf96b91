//! Remote notes API boundary.
//!
//! # Responsibility
//! - Define the four operations the client issues against the notes backend.
//! - Keep transport, auth and schema checks on the backend side of the seam.
//!
//! # Invariants
//! - Gateways never mutate client state; workflows reconcile results.
//! - Workflows display `list_notes` results in the order the backend returns.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod graphql;
pub mod local;

pub use graphql::GraphqlGateway;
pub use local::LocalGateway;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Payload of `updateNote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteInput {
    pub id: NoteId,
    pub completed: bool,
}

/// Payload of `deleteNote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteNoteInput {
    pub id: NoteId,
}

/// Failure of one remote call.
#[derive(Debug)]
pub enum GatewayError {
    /// Request never produced an HTTP response.
    Transport(String),
    /// Backend answered with a non-success HTTP status.
    Status { status: u16, body: String },
    /// Backend answered with a GraphQL `errors` array.
    Graphql(Vec<String>),
    /// Response body did not match the expected shape.
    InvalidResponse(String),
    /// Target note does not exist on the backend.
    NotFound(NoteId),
    /// Local backend storage failure.
    Storage(DbError),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Status { status, body } => write!(f, "http status {status}: {body}"),
            Self::Graphql(messages) => write!(f, "graphql error: {}", messages.join("; ")),
            Self::InvalidResponse(message) => write!(f, "invalid response: {message}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

/// Notes backend operations.
#[async_trait]
pub trait NotesGateway: Send + Sync {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>>;
    async fn create_note(&self, note: &Note) -> GatewayResult<()>;
    async fn update_note(&self, input: &UpdateNoteInput) -> GatewayResult<()>;
    async fn delete_note(&self, input: &DeleteNoteInput) -> GatewayResult<()>;
}

#[async_trait]
impl<G: NotesGateway + ?Sized> NotesGateway for Arc<G> {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>> {
        (**self).list_notes().await
    }

    async fn create_note(&self, note: &Note) -> GatewayResult<()> {
        (**self).create_note(note).await
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> GatewayResult<()> {
        (**self).update_note(input).await
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> GatewayResult<()> {
        (**self).delete_note(input).await
    }
}
