//! Embedding provider adapters.

mod failover_embedder;
mod gemini_embedder;
mod http;
mod mock_embedder;
mod openai_embedder;

pub use failover_embedder::FailoverEmbeddingProvider;
pub use gemini_embedder::{GeminiEmbeddingConfig, GeminiEmbeddingProvider};
pub use mock_embedder::{MockEmbeddingProvider, MOCK_DIMENSIONS};
pub use openai_embedder::{OpenAIEmbeddingConfig, OpenAIEmbeddingProvider};
