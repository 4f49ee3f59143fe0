use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::state::AppState;

/// Ordered transcript for a session. An unknown id is just an empty
/// transcript, not an error — sessions come into being lazily.
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let messages: Vec<Value> = match state.sessions.get(&session_id).await {
        Some(session) => {
            let transcript = session.transcript.lock().await;
            transcript
                .turns()
                .iter()
                .map(|turn| json!({"role": turn.role, "content": turn.content}))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(Json(json!({ "messages": messages })))
}

/// The Clear History control: resets the transcript to empty immediately,
/// independent of the overflow policy.
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(session) = state.sessions.get(&session_id).await {
        session.transcript.lock().await.clear();
    }
    Ok(Json(json!({ "cleared": true })))
}
