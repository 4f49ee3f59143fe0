//! Conversational retrieval chain.
//!
//! `ChainBuilder` composes the embedding backend, the persisted similarity
//! index and the generation backend into a `RetrievalChain`. Built at most
//! once per session; a turn runs condensation, retrieval and answering in
//! sequence and never mutates shared state.

mod condense;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{Embedder, Generator, OpenAiEmbedder, OpenAiGenerator, SamplingParams};
use crate::config::{AppConfig, RETRIEVAL_K};
use crate::errors::ApiError;
use crate::index::{DocIndex, SqliteDocIndex};
use crate::session::Transcript;

/// A cited document returned alongside the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    pub metadata: SourceMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub source: String,
    pub title: String,
}

/// Outcome of one chain run. `source_documents` is absent when retrieval
/// produced nothing to cite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResult {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_documents: Option<Vec<SourceDocument>>,
}

/// Builds chains from process-wide configuration.
#[derive(Clone)]
pub struct ChainBuilder {
    config: AppConfig,
}

impl ChainBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Composes a chain: embedder + index + generator + prompts.
    ///
    /// Loads the similarity index from its fixed path; a missing or
    /// unreadable index fails the build.
    pub async fn build(&self) -> Result<RetrievalChain, ApiError> {
        let index = SqliteDocIndex::open(&self.config.index_path).await?;
        tracing::info!(
            "chain built: embedding={} generation={} index={}",
            self.config.embedding_model,
            self.config.generation_model,
            self.config.index_path.display()
        );

        Ok(RetrievalChain {
            embedder: Arc::new(OpenAiEmbedder::new(
                &self.config.inference_api_base,
                &self.config.embedding_model,
            )),
            index: Arc::new(index),
            generator: Arc::new(OpenAiGenerator::new(
                &self.config.inference_api_base,
                &self.config.generation_model,
            )),
            params: SamplingParams::default(),
            k: RETRIEVAL_K,
        })
    }
}

/// The composed retrieval+generation callable. Read-only after build.
pub struct RetrievalChain {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn DocIndex>,
    generator: Arc<dyn Generator>,
    params: SamplingParams,
    k: usize,
}

impl RetrievalChain {
    /// Runs one conversational turn.
    ///
    /// Any backend failure propagates uncaught; the caller decides what to
    /// show the user.
    pub async fn run(
        &self,
        question: &str,
        history: &Transcript,
    ) -> Result<ChainResult, ApiError> {
        let standalone = self.condense(question, history).await?;

        let query_embedding = self.embedder.embed(&standalone).await?;
        let matches = self.index.search(&query_embedding, self.k).await?;

        let context = matches
            .iter()
            .map(|m| m.document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = condense::qa_prompt(&context, &standalone);
        let answer = self.generator.generate(&prompt, &self.params).await?;

        let source_documents = if matches.is_empty() {
            None
        } else {
            Some(
                matches
                    .into_iter()
                    .map(|m| SourceDocument {
                        content: m.document.content,
                        metadata: SourceMetadata {
                            source: m.document.source,
                            title: m.document.title,
                        },
                    })
                    .collect(),
            )
        };

        Ok(ChainResult {
            answer: answer.trim().to_string(),
            source_documents,
        })
    }

    /// Rewrites a follow-up into a standalone question.
    ///
    /// With no completed history the question already stands alone and the
    /// extra generation call is skipped.
    async fn condense(&self, question: &str, history: &Transcript) -> Result<String, ApiError> {
        let rendered = condense::render_chat_history(history.turns());
        if rendered.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = condense::condense_prompt(&rendered, question);
        let standalone = self.generator.generate(&prompt, &self.params).await?;
        let standalone = standalone.trim();

        if standalone.is_empty() {
            tracing::warn!("condensation returned nothing, using original question");
            Ok(question.to_string())
        } else {
            Ok(standalone.to_string())
        }
    }
}
