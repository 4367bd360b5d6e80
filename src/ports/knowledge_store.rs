//! Knowledge Store Port - the three-method contract the retriever depends on.
//!
//! Any index technology works as long as it can embed a query, return the
//! nearest documents to a vector, and list every document with metadata.

use async_trait::async_trait;

use super::embedding_provider::EmbeddingError;
use super::retry::Retryable;
use crate::domain::recommendation::KnowledgeDocument;

/// Port for the recommendation knowledge base.
///
/// # Contract
///
/// - `similarity_search` returns at most `k` documents, most similar first.
/// - `get_all` returns every document in a stable order.
/// - Implementations are read-only from the engine's point of view and safe
///   to share across concurrently scored participants.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Embeds query text with the store's embedding model.
    ///
    /// Fails with `ForeignEmbeddingSpace` rather than return a vector that
    /// cannot be compared with the indexed ones.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeStoreError>;

    /// Nearest documents to `vector`, most similar first.
    async fn similarity_search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError>;

    /// Every document with its metadata.
    async fn get_all(&self) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError>;
}

/// Knowledge store errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KnowledgeStoreError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The query was embedded by a different provider or model than the index.
    #[error("query embedded with {query}, index built with {index}")]
    ForeignEmbeddingSpace { index: String, query: String },

    #[error("knowledge store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to load knowledge base from {path}: {reason}")]
    Load { path: String, reason: String },
}

impl KnowledgeStoreError {
    pub fn load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            KnowledgeStoreError::Embedding(e) => e.is_retryable(),
            KnowledgeStoreError::Unavailable(_) => true,
            KnowledgeStoreError::DimensionMismatch { .. }
            | KnowledgeStoreError::ForeignEmbeddingSpace { .. }
            | KnowledgeStoreError::Load { .. } => false,
        }
    }
}

impl Retryable for KnowledgeStoreError {
    fn is_retryable(&self) -> bool {
        KnowledgeStoreError::is_retryable(self)
    }
}
