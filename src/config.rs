//! Process configuration, read once at startup.
//!
//! Required variables fail fast with a descriptive error; the index path,
//! retrieval depth and docs-URL prefixes are fixed properties of the
//! deployment, not runtime knobs.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Number of documents retrieved per question.
pub const RETRIEVAL_K: usize = 2;

/// Local prefix under which docs were indexed.
pub const LOCAL_DOCS_PREFIX: &str = "./aws_docs/sagemaker/";

/// Public prefix the local one is rewritten to when citing sources.
pub const PUBLIC_DOCS_PREFIX: &str = "https://docs.aws.amazon.com/sagemaker/latest/dg/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Identifier of the sentence-embedding model.
    pub embedding_model: String,
    /// Identifier of the text-generation model.
    pub generation_model: String,
    /// Transcript length bound; reaching it resets the transcript.
    pub max_history_length: usize,
    /// Base URL of the OpenAI-compatible inference server.
    pub inference_api_base: String,
    /// Pre-built similarity index, loaded read-only at chain build.
    pub index_path: PathBuf,
    /// Listen port (0 = ephemeral).
    pub port: u16,
}

impl AppConfig {
    /// Reads configuration from the environment (after `dotenvy` has run).
    pub fn from_env() -> Result<Self, ConfigError> {
        let embedding_model = require("EMBEDDING_MODEL")?;
        let generation_model = require("GENERATION_MODEL")?;

        let raw_max = require("MAX_HISTORY_LENGTH")?;
        let max_history_length =
            raw_max
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid {
                    name: "MAX_HISTORY_LENGTH",
                    value: raw_max,
                })?;

        let inference_api_base = env::var("INFERENCE_API_BASE")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let port = env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(0);

        Ok(AppConfig {
            embedding_model,
            generation_model,
            max_history_length,
            inference_api_base,
            index_path: PathBuf::from("./doc_index/index.db"),
            port,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(ConfigError::Missing(name)),
    }
}
