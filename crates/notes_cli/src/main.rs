//! Text-mode view layer over `notes_core`.
//!
//! # Responsibility
//! - Translate command-line intents into note workflows.
//! - Render the resulting state and acknowledgment.
//!
//! Usage: `notes_cli [ping|list|add <name> <description>|toggle <id>|delete <id>]`

use clap::{Parser, Subcommand};
use log::info;
use notes_core::{
    init_logging, ActionResponse, ApplicationState, FormField, GraphqlGateway, LocalGateway,
    NoteSession, NotesConfig, NotesGateway,
};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "notes_cli", about = "Notes client", version)]
struct Cli {
    /// Defaults to `list`.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core liveness and version, without touching a backend.
    Ping,
    /// Show all notes.
    List,
    /// Create a note.
    Add { name: String, description: String },
    /// Flip the completion flag of one note.
    Toggle { id: String },
    /// Remove one note.
    Delete { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let command = Cli::parse().command.unwrap_or(Command::List);

    if let Command::Ping = command {
        println!("notes_core ping={}", notes_core::ping());
        println!("notes_core version={}", notes_core::core_version());
        return ExitCode::SUCCESS;
    }

    let config = match NotesConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let gateway: Arc<dyn NotesGateway> = match open_gateway(&config) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("backend unavailable: {err}");
            return ExitCode::FAILURE;
        }
    };

    let session = NoteSession::new(gateway);
    let fetched = session.fetch_notes().await;
    if session.state().error {
        eprintln!("Could not load notes: {}", fetched.message);
        return ExitCode::FAILURE;
    }

    let response = match command {
        Command::Ping | Command::List => None,
        Command::Add { name, description } => {
            session.set_input(FormField::Name, name);
            session.set_input(FormField::Description, description);
            Some(session.create_note().await)
        }
        Command::Toggle { id } => Some(session.toggle_completed(&id).await),
        Command::Delete { id } => Some(session.delete_note(&id).await),
    };

    if let Some(response) = &response {
        print_acknowledgment(response);
    }
    print_notes(&session.state());

    match response {
        Some(response) if !response.ok => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn open_gateway(config: &NotesConfig) -> Result<Arc<dyn NotesGateway>, String> {
    match &config.api {
        Some(api) => {
            info!(
                "event=backend_select module=cli status=ok backend=graphql endpoint={}",
                api.url
            );
            let gateway = GraphqlGateway::new(api).map_err(|err| err.to_string())?;
            Ok(Arc::new(gateway))
        }
        None => {
            info!(
                "event=backend_select module=cli status=ok backend=local db_path={}",
                config.db_path.display()
            );
            let gateway = LocalGateway::open(&config.db_path).map_err(|err| err.to_string())?;
            Ok(Arc::new(gateway))
        }
    }
}

fn print_acknowledgment(response: &ActionResponse) {
    if response.ok {
        println!("{}", response.message);
    } else {
        eprintln!("{}", response.message);
    }
}

fn print_notes(state: &ApplicationState) {
    if state.notes.is_empty() {
        println!("No notes.");
        return;
    }
    for note in &state.notes {
        let mark = if note.completed { "x" } else { " " };
        println!("[{mark}] {}  {}: {}", note.id, note.name, note.description);
    }
}
