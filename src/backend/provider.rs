use async_trait::async_trait;

use crate::errors::ApiError;

/// Maps text to a fixed-size numeric vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}

/// Produces a continuation for a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: i64,
    pub max_tokens: i64,
    pub num_return: i64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            top_p: 0.9,
            top_k: 10,
            max_tokens: 4000,
            num_return: 1,
        }
    }
}
