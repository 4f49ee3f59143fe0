//! DocIndex trait — abstract interface for similarity search backends.
//!
//! The index is built offline; this process only queries it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// A document stored in the index, with origin metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// The text content that was embedded.
    pub content: String,
    /// Origin path or URL of the document.
    pub source: String,
    /// Human-readable title.
    pub title: String,
}

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct DocMatch {
    pub document: IndexedDocument,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Nearest-neighbor retrieval over embedded documents.
#[async_trait]
pub trait DocIndex: Send + Sync {
    /// Return the top-k documents closest to the query embedding,
    /// best match first.
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<DocMatch>, ApiError>;
}
