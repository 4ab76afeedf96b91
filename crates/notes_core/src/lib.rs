//! Client core for the notes application.
//! Holds the application state, its reducer, and the workflows that keep it
//! in step with the remote notes API.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod service;
pub mod state;

pub use config::{ApiConfig, ConfigError, NotesConfig};
pub use gateway::{
    DeleteNoteInput, GatewayError, GatewayResult, GraphqlGateway, LocalGateway, NotesGateway,
    UpdateNoteInput,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{
    ClientId, FormField, FormFieldError, Note, NoteForm, NoteId, NoteValidationError,
};
pub use service::note_session::{ActionResponse, NoteSession};
pub use state::app_state::ApplicationState;
pub use state::reducer::{reduce, Action};
pub use state::store::NoteStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
