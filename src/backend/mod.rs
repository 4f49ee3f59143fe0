//! External inference capabilities.
//!
//! The chain only ever talks to these trait objects, so session and chain
//! logic stays testable without a running model server.

mod openai;
mod provider;

pub use openai::{OpenAiEmbedder, OpenAiGenerator};
pub use provider::{Embedder, Generator, SamplingParams};
