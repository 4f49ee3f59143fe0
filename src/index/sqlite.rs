//! SQLite-backed document index.
//!
//! Loads a pre-built database from a fixed path and answers queries with
//! brute-force cosine similarity. The file is opened read-only; a missing
//! index is a hard error surfaced at chain-build time.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::store::{DocIndex, DocMatch, IndexedDocument};
use crate::errors::ApiError;

pub struct SqliteDocIndex {
    pool: SqlitePool,
}

impl SqliteDocIndex {
    pub async fn open(db_path: &Path) -> Result<Self, ApiError> {
        if !db_path.exists() {
            return Err(ApiError::ServiceUnavailable(format!(
                "similarity index not found at {}",
                db_path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(false)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        Ok(Self { pool })
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }
}

#[async_trait]
impl DocIndex for SqliteDocIndex {
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<DocMatch>, ApiError> {
        let rows = sqlx::query("SELECT content, source, title, embedding FROM documents")
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        let mut scored: Vec<DocMatch> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let embedding = Self::deserialize_embedding(&blob);
                DocMatch {
                    document: IndexedDocument {
                        content: row.get("content"),
                        source: row.get("source"),
                        title: row.get("title"),
                    },
                    score: Self::cosine_similarity(query_embedding, &embedding),
                }
            })
            .collect();

        scored.sort_by(|left, right| {
            right
                .score
                .partial_cmp(&left.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }
}
