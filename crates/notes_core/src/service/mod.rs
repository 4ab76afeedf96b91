//! Note workflows over the state container and the notes gateway.
//!
//! # Responsibility
//! - Orchestrate optimistic local changes and remote calls.
//! - Keep view layers decoupled from gateway details.

mod note_locks;
pub mod note_session;
