//! In-memory knowledge store with cosine-similarity search.
//!
//! Documents are loaded once and never mutated afterwards, so a single store
//! can be shared behind an `Arc` by every participant's retriever.
//!
//! The index lives in the embedder's own space (its `provider_info`). Vectors
//! produced by any other provider, e.g. a failover fallback, are never stored
//! and never used as queries.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::recommendation::KnowledgeDocument;
use crate::ports::{
    retry_with_backoff, Embedding, EmbeddingError, EmbeddingProvider, EmbeddingProviderInfo,
    KnowledgeStore, KnowledgeStoreError, RetryPolicy,
};

struct IndexedDocument {
    document: KnowledgeDocument,
    vector: Option<Vec<f32>>,
}

pub struct InMemoryKnowledgeStore {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    space: Option<EmbeddingProviderInfo>,
    entries: Vec<IndexedDocument>,
}

impl InMemoryKnowledgeStore {
    /// Precomputed vectors handed to `insert` are taken to be in `embedder`'s space.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            space: Some(embedder.provider_info()),
            embedder: Some(embedder),
            entries: Vec::new(),
        }
    }

    /// A store that can only list documents; `embed` always fails.
    pub fn without_embedder() -> Self {
        Self {
            embedder: None,
            space: None,
            entries: Vec::new(),
        }
    }

    /// Adds a document with an optional precomputed vector.
    pub fn with_document(mut self, document: KnowledgeDocument, vector: Option<Vec<f32>>) -> Self {
        self.insert(document, vector);
        self
    }

    pub fn insert(&mut self, document: KnowledgeDocument, vector: Option<Vec<f32>>) {
        self.entries.push(IndexedDocument {
            document,
            vector: vector.filter(|v| !v.is_empty()),
        });
    }

    pub fn extend(&mut self, documents: impl IntoIterator<Item = (KnowledgeDocument, Option<Vec<f32>>)>) {
        for (document, vector) in documents {
            self.insert(document, vector);
        }
    }

    /// Embeds every document that has no vector yet.
    ///
    /// Documents whose embedding still fails after retries, or comes back
    /// from another vector space, stay listed by `get_all` but never appear
    /// in similarity results. Returns how many documents were indexed.
    pub async fn index_missing(&mut self, policy: &RetryPolicy) -> usize {
        let (Some(embedder), Some(space)) = (self.embedder.as_ref(), self.space.as_ref()) else {
            tracing::warn!("No embedding provider, knowledge documents left unindexed");
            return 0;
        };

        let mut indexed = 0;
        for entry in self.entries.iter_mut().filter(|e| e.vector.is_none()) {
            let text = entry.document.content.clone();
            match retry_with_backoff(policy, "index_document", || embedder.embed_tagged(&text)).await {
                Ok(Embedding { space: produced, .. }) if !produced.same_space(space) => {
                    tracing::warn!(
                        document_id = %entry.document.id,
                        index_space = %space,
                        produced_by = %produced,
                        "Document embedded outside the index space, left unindexed"
                    );
                }
                Ok(embedding) => {
                    entry.vector = Some(embedding.vector);
                    indexed += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        document_id = %entry.document.id,
                        error = %error,
                        "Failed to index knowledge document"
                    );
                }
            }
        }
        indexed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of documents that can take part in similarity search.
    pub fn indexed_len(&self) -> usize {
        self.entries.iter().filter(|e| e.vector.is_some()).count()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeStoreError> {
        let (Some(embedder), Some(space)) = (&self.embedder, &self.space) else {
            return Err(EmbeddingError::unavailable("no embedding provider configured").into());
        };

        let embedding = embedder.embed_tagged(text).await?;
        if !embedding.space.same_space(space) {
            return Err(KnowledgeStoreError::ForeignEmbeddingSpace {
                index: space.to_string(),
                query: embedding.space.to_string(),
            });
        }
        Ok(embedding.vector)
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError> {
        let mut scored: Vec<(f64, &KnowledgeDocument)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let stored = entry.vector.as_deref()?;
                cosine_similarity(vector, stored).map(|score| (score, &entry.document))
            })
            .collect();

        if scored.is_empty() && self.indexed_len() > 0 {
            let expected = self
                .entries
                .iter()
                .find_map(|e| e.vector.as_ref().map(Vec::len))
                .unwrap_or_default();
            if expected != vector.len() {
                return Err(KnowledgeStoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, d)| d.clone()).collect())
    }

    async fn get_all(&self) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError> {
        Ok(self.entries.iter().map(|e| e.document.clone()).collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot / denom)
}
