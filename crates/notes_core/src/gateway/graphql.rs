//! GraphQL-over-HTTP notes gateway.
//!
//! # Responsibility
//! - Encode the four note operations as GraphQL documents with `input`
//!   variables and POST them to the configured endpoint.
//! - Decode `data`/`errors` envelopes into `GatewayResult`s.
//!
//! # Invariants
//! - A non-empty `errors` array is a failure even when `data` is present.
//! - `listNotes` pages are followed via `nextToken` until exhausted. A token
//!   seen before ends paging instead of looping.

use super::{DeleteNoteInput, GatewayError, GatewayResult, NotesGateway, UpdateNoteInput};
use crate::config::ApiConfig;
use crate::model::note::Note;
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Instant;

const API_KEY_HEADER: &str = "x-api-key";

pub const LIST_NOTES: &str = "query ListNotes($nextToken: String) {
  listNotes(nextToken: $nextToken) {
    items { id clientId name description completed }
    nextToken
  }
}";

pub const CREATE_NOTE: &str = "mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) { id clientId name description completed }
}";

pub const UPDATE_NOTE: &str = "mutation UpdateNote($input: UpdateNoteInput!) {
  updateNote(input: $input) { id clientId name description completed }
}";

pub const DELETE_NOTE: &str = "mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) { id clientId name description completed }
}";

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    data: Option<Value>,
    // Some servers send `"errors": null` on success.
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

/// One page of `listNotes`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteConnection {
    pub items: Vec<Note>,
    pub next_token: Option<String>,
}

/// Gateway talking to a managed GraphQL notes API.
pub struct GraphqlGateway {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GraphqlGateway {
    /// Builds an HTTP client for the configured endpoint.
    ///
    /// No request timeout is applied unless `config.timeout` is set.
    pub fn new(config: &ApiConfig) -> GatewayResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| {
            GatewayError::Transport(format!("failed to create HTTP client: {err}"))
        })?;

        Ok(Self {
            endpoint: config.url.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        document: &'static str,
        variables: Value,
    ) -> GatewayResult<T> {
        let started_at = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body(document, variables))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "event=gateway_request module=gateway status=error operation={} http_status={} duration_ms={}",
                operation,
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let decoded = decode_response(body, operation);
        debug!(
            "event=gateway_request module=gateway status={} operation={} duration_ms={}",
            if decoded.is_ok() { "ok" } else { "error" },
            operation,
            started_at.elapsed().as_millis()
        );
        decoded
    }
}

#[async_trait]
impl NotesGateway for GraphqlGateway {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>> {
        let mut notes = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        loop {
            let page: NoteConnection = self
                .execute("listNotes", LIST_NOTES, json!({ "nextToken": next_token }))
                .await?;
            notes.extend(page.items);
            match page.next_token.filter(|token| !token.is_empty()) {
                None => return Ok(notes),
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    warn!(
                        "event=notes_list module=gateway status=stopped reason=repeated_next_token pages={} count={}",
                        seen_tokens.len() + 1,
                        notes.len()
                    );
                    return Ok(notes);
                }
                Some(token) => next_token = Some(token),
            }
        }
    }

    async fn create_note(&self, note: &Note) -> GatewayResult<()> {
        let created: Option<Note> = self
            .execute("createNote", CREATE_NOTE, json!({ "input": note }))
            .await?;
        created.map(|_| ()).ok_or_else(|| {
            GatewayError::InvalidResponse("createNote returned null".to_string())
        })
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> GatewayResult<()> {
        let updated: Option<Note> = self
            .execute("updateNote", UPDATE_NOTE, json!({ "input": input }))
            .await?;
        updated
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound(input.id.clone()))
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> GatewayResult<()> {
        let deleted: Option<Note> = self
            .execute("deleteNote", DELETE_NOTE, json!({ "input": input }))
            .await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound(input.id.clone()))
    }
}

/// Builds the POST body for one GraphQL operation.
pub fn request_body(document: &str, variables: Value) -> Value {
    json!({
        "query": document,
        "variables": variables,
    })
}

/// Extracts `data.<field>` from a GraphQL response body.
pub fn decode_response<T: DeserializeOwned>(body: Value, field: &str) -> GatewayResult<T> {
    let envelope: GraphqlEnvelope = serde_json::from_value(body)
        .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;

    let errors = envelope.errors.unwrap_or_default();
    if !errors.is_empty() {
        return Err(GatewayError::Graphql(
            errors.into_iter().map(|entry| entry.message).collect(),
        ));
    }

    let mut data = match envelope.data {
        Some(Value::Object(data)) => data,
        _ => {
            return Err(GatewayError::InvalidResponse(
                "response has no data object".to_string(),
            ))
        }
    };
    let value = data.remove(field).ok_or_else(|| {
        GatewayError::InvalidResponse(format!("response data has no `{field}` field"))
    })?;
    serde_json::from_value(value)
        .map_err(|err| GatewayError::InvalidResponse(format!("`{field}`: {err}")))
}
