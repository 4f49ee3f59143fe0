//! Session-scoped chat state.
//!
//! A session owns one bounded transcript and one lazily-built retrieval
//! chain. Nothing here is persisted; history is gone when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::chain::RetrievalChain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the transcript. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Ordered chat history with a configured length bound.
///
/// Overflow policy is reset, not truncation: the length check runs exactly
/// once per submission, right after the user turn is appended, and clears
/// the whole transcript when the length equals the bound. The assistant
/// turn is appended later without a check, so the transcript can sit above
/// the bound (or at odd length) until the next submission. Known quirk,
/// kept deliberately.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
    max_len: usize,
}

impl Transcript {
    pub fn new(max_len: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_len,
        }
    }

    /// Appends a user turn, then applies the overflow-reset check.
    pub fn push_user(&mut self, content: String) {
        self.turns.push(ChatTurn {
            role: Role::User,
            content,
        });
        if self.turns.len() == self.max_len {
            tracing::info!("transcript reached bound {}, resetting", self.max_len);
            self.turns.clear();
        }
    }

    /// Appends an assistant turn. No overflow check here.
    pub fn push_assistant(&mut self, content: String) {
        self.turns.push(ChatTurn {
            role: Role::Assistant,
            content,
        });
    }

    /// Explicit reset, independent of the overflow policy.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Per-user conversational state.
///
/// The transcript mutex is held across a whole turn, so one submission is
/// fully processed before the next one for the same session is accepted.
pub struct Session {
    pub transcript: Mutex<Transcript>,
    pub chain: OnceCell<Arc<RetrievalChain>>,
}

impl Session {
    pub fn new(max_history_length: usize) -> Self {
        Self {
            transcript: Mutex::new(Transcript::new(max_history_length)),
            chain: OnceCell::new(),
        }
    }
}

/// In-memory registry of live sessions, keyed by session id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    max_history_length: usize,
}

impl SessionStore {
    pub fn new(max_history_length: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_history_length,
        }
    }

    pub async fn get_or_create(&self, session_id: &str) -> Arc<Session> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(session_id) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Session::new(self.max_history_length)))
            .clone()
    }

    /// Looks up a session without creating it.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(session_id).cloned()
    }
}
