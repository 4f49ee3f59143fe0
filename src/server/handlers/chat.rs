//! The chat turn handler — the session controller's state machine.
//!
//! One request is one submission: append the user turn (overflow check
//! included), run the chain, fall back to the fixed apology on any chain
//! failure, rewrite source paths to public docs URLs, append the assistant
//! turn, respond.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::chain::SourceDocument;
use crate::config::{LOCAL_DOCS_PREFIX, PUBLIC_DOCS_PREFIX};
use crate::errors::ApiError;
use crate::state::AppState;

/// Shown verbatim whenever the chain fails, for any reason.
pub const FALLBACK_ANSWER: &str = "I'm sorry I'm not unable to respond to your question 😔";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SourceLink {
    pub title: String,
    pub url: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let session_id = payload
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let session = state.sessions.get_or_create(&session_id).await;

    // Held for the whole turn: one submission per session at a time.
    let mut transcript = session.transcript.lock().await;
    transcript.push_user(payload.message.clone());

    let outcome = match state.chain_for(&session).await {
        Ok(chain) => chain.run(&payload.message, &transcript).await,
        Err(err) => Err(err),
    };

    let (answer, sources) = match outcome {
        Ok(result) => {
            let links = result.source_documents.map(|docs| {
                docs.iter().map(source_link).collect::<Vec<_>>()
            });
            (result.answer, links)
        }
        Err(err) => {
            tracing::error!("chain run failed for session {}: {}", session_id, err);
            (FALLBACK_ANSWER.to_string(), None)
        }
    };

    transcript.push_assistant(answer.clone());

    Ok(Json(json!({
        "session_id": session_id,
        "answer": answer,
        "sources": sources,
    })))
}

fn source_link(doc: &SourceDocument) -> SourceLink {
    SourceLink {
        title: doc.metadata.title.clone(),
        url: rewrite_source_url(&doc.metadata.source),
    }
}

/// Rewrites the fixed local indexing prefix to the public docs prefix.
///
/// Plain string substitution; anything that does not start with the local
/// prefix passes through unchanged.
pub fn rewrite_source_url(source: &str) -> String {
    match source.strip_prefix(LOCAL_DOCS_PREFIX) {
        Some(rest) => format!("{}{}", PUBLIC_DOCS_PREFIX, rest),
        None => source.to_string(),
    }
}
