//! Domain model for notes and the create-note form.
//!
//! # Responsibility
//! - Define the record shape shared with the remote notes API.
//! - Keep the session originator tag an explicit value, not a global.
//!
//! # Invariants
//! - Every note is identified by a client-generated `NoteId`.

pub mod note;
