//! Mock Embedding Provider for testing.
//!
//! # Features
//!
//! - Fixed vectors per text
//! - Deterministic keyword vectors for any other text, so that texts sharing
//!   words are similar
//! - Error injection (queued, consumed in order)
//! - Configurable provider/model, to stand in for a second vector space
//! - Call tracking for verification

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::text::canonicalize;
use crate::ports::{EmbeddingError, EmbeddingProvider, EmbeddingProviderInfo};

/// Length of generated keyword vectors.
pub const MOCK_DIMENSIONS: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct MockEmbeddingProvider {
    vectors: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    errors: Arc<Mutex<VecDeque<EmbeddingError>>>,
    calls: Arc<Mutex<Vec<String>>>,
    space: Option<EmbeddingProviderInfo>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `vector` whenever exactly `text` is embedded.
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        lock(&self.vectors).insert(text.into(), vector);
        self
    }

    /// Reports `space` from `provider_info` instead of the default mock model.
    pub fn with_space(mut self, space: EmbeddingProviderInfo) -> Self {
        self.space = Some(space);
        self
    }

    /// Queues an error for the next call.
    pub fn with_error(self, error: EmbeddingError) -> Self {
        lock(&self.errors).push_back(error);
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn get_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Bag-of-words vector: each canonical token increments one bucket.
    pub fn keyword_vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; MOCK_DIMENSIONS];
        for token in canonicalize(text).split_whitespace() {
            let bucket = token
                .bytes()
                .fold(2166136261u32, |hash, b| (hash ^ u32::from(b)).wrapping_mul(16777619));
            vector[bucket as usize % MOCK_DIMENSIONS] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        lock(&self.calls).push(text.to_string());

        if let Some(error) = lock(&self.errors).pop_front() {
            return Err(error);
        }
        if text.trim().is_empty() {
            return Err(EmbeddingError::invalid_request("cannot embed empty text"));
        }
        if let Some(vector) = lock(&self.vectors).get(text) {
            return Ok(vector.clone());
        }
        Ok(Self::keyword_vector(text))
    }

    fn provider_info(&self) -> EmbeddingProviderInfo {
        self.space
            .clone()
            .unwrap_or_else(|| EmbeddingProviderInfo::new("mock", "mock-keywords").with_dimensions(MOCK_DIMENSIONS))
    }
}
