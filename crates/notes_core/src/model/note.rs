//! Note domain model.
//!
//! # Responsibility
//! - Define the note record exchanged with the remote notes API.
//! - Define the pending create-form values and their submission check.
//!
//! # Invariants
//! - `id` is generated client-side at creation time and never reused.
//! - `client_id` tags the session that authored the note.
//! - `name` and `description` are non-blank at creation; enforced by
//!   `NoteForm::validate()` before submission, not by `Note` itself.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of one note.
///
/// Kept as text because the remote API treats ids as opaque strings.
pub type NoteId = String;

/// Originator tag for one application session.
///
/// Generated once when a session starts and attached to every note the
/// session creates, so subscription echoes of our own writes can be told
/// apart from notes created elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generates a fresh random session tag.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns a fresh, never-reused note id.
pub fn generate_note_id() -> NoteId {
    Uuid::new_v4().to_string()
}

/// One user-created note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Serialized as `clientId` to match the remote schema.
    pub client_id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Note {
    /// Creates a not-yet-completed note with a generated id.
    pub fn new(
        client_id: &ClientId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::with_id(generate_note_id(), client_id, name, description)
    }

    /// Creates a not-yet-completed note with a caller-provided id.
    ///
    /// Used when the id must be known before the note exists, e.g. to lock it.
    pub fn with_id(
        id: NoteId,
        client_id: &ClientId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            client_id: client_id.as_str().to_string(),
            name: name.into(),
            description: description.into(),
            completed: false,
        }
    }

    /// Returns whether this note was authored by the given session.
    pub fn is_authored_by(&self, client_id: &ClientId) -> bool {
        self.client_id == client_id.as_str()
    }
}

/// Form field addressed by `SET_INPUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Description,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
        }
    }
}

/// Error returned when a view layer addresses a field the form lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldError(pub String);

impl Display for FormFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown form field `{}`; expected name|description",
            self.0
        )
    }
}

impl Error for FormFieldError {}

impl FromStr for FormField {
    type Err = FormFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            other => Err(FormFieldError(other.to_string())),
        }
    }
}

/// Pending values of the create-note form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteForm {
    pub name: String,
    pub description: String,
}

/// Submission check failures for the create-note form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyName,
    EmptyDescription,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "note name cannot be empty"),
            Self::EmptyDescription => write!(f, "note description cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

impl NoteForm {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => self.name.as_str(),
            FormField::Description => self.description.as_str(),
        }
    }

    pub fn set_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Description => self.description = value,
        }
    }

    /// Checks that both fields carry non-whitespace text.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.name.trim().is_empty() {
            return Err(NoteValidationError::EmptyName);
        }
        if self.description.trim().is_empty() {
            return Err(NoteValidationError::EmptyDescription);
        }
        Ok(())
    }
}
