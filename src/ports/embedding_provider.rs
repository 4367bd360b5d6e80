//! Embedding Provider Port - Interface for text embedding services.
//!
//! Abstracts the remote model that turns text into vectors, so the knowledge
//! store and the retriever never couple to a specific vendor API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::retry::Retryable;

/// Port for embedding model interactions.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds one text. Empty text is rejected with `InvalidRequest`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> EmbeddingProviderInfo;

    /// Embeds one text and names the provider that produced the vector.
    ///
    /// Providers that delegate to others (failover) override this so callers
    /// can tell which vector space the result lives in.
    async fn embed_tagged(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let vector = self.embed(text).await?;
        Ok(Embedding {
            vector,
            space: self.provider_info(),
        })
    }
}

/// A vector together with the provider and model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub space: EmbeddingProviderInfo,
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingProviderInfo {
    /// Provider name (e.g., "openai", "gemini").
    pub name: String,
    /// Model identifier.
    pub model: String,
    /// Vector length, when known up front.
    pub dimensions: Option<usize>,
}

impl EmbeddingProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Vectors are only comparable when provider and model both match.
    pub fn same_space(&self, other: &EmbeddingProviderInfo) -> bool {
        self.name == other.name && self.model == other.model
    }
}

impl fmt::Display for EmbeddingProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.model)
    }
}

/// Embedding provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbeddingError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request (empty text, unsupported model).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl EmbeddingError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbeddingError::RateLimited { .. }
                | EmbeddingError::Unavailable { .. }
                | EmbeddingError::Network(_)
                | EmbeddingError::Timeout { .. }
        )
    }
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        EmbeddingError::is_retryable(self)
    }
}
