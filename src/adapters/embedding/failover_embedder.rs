//! Failover Embedding Provider - primary provider with an optional fallback.
//!
//! When the primary fails with a retryable error (rate limit, unavailable,
//! network, timeout), the same text is embedded with the fallback. Permanent
//! errors are returned as is.
//!
//! A fallback vector usually lives in another space than the primary's, so
//! [`EmbeddingProvider::embed_tagged`] reports which provider answered and
//! consumers that compare vectors must check it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{Embedding, EmbeddingError, EmbeddingProvider, EmbeddingProviderInfo};

pub struct FailoverEmbeddingProvider {
    primary: Arc<dyn EmbeddingProvider>,
    fallback: Option<Arc<dyn EmbeddingProvider>>,
}

impl FailoverEmbeddingProvider {
    pub fn new(primary: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn EmbeddingProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for FailoverEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_tagged(text).await?.vector)
    }

    fn provider_info(&self) -> EmbeddingProviderInfo {
        self.primary.provider_info()
    }

    async fn embed_tagged(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        match self.primary.embed_tagged(text).await {
            Ok(embedding) => Ok(embedding),
            Err(error) if error.is_retryable() => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(
                        primary = %self.primary.provider_info(),
                        fallback = %fallback.provider_info(),
                        error = %error,
                        "Primary embedding provider failed, using fallback"
                    );
                    fallback.embed_tagged(text).await
                }
                None => Err(error),
            },
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::embedding::MockEmbeddingProvider;

    fn fallback_space() -> EmbeddingProviderInfo {
        EmbeddingProviderInfo::new("mock", "fallback-model")
    }

    #[tokio::test]
    async fn falls_back_on_retryable_error() {
        let primary = Arc::new(MockEmbeddingProvider::new().with_error(EmbeddingError::unavailable("503")));
        let fallback = Arc::new(MockEmbeddingProvider::new().with_vector("mfa", vec![1.0, 0.0]));

        let provider = FailoverEmbeddingProvider::new(primary.clone()).with_fallback(fallback.clone());

        assert_eq!(provider.embed("mfa").await.unwrap(), vec![1.0, 0.0]);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 1);
    }

    #[tokio::test]
    async fn tagged_embedding_names_the_provider_that_answered() {
        let primary = Arc::new(MockEmbeddingProvider::new().with_error(EmbeddingError::network("reset")));
        let fallback = Arc::new(MockEmbeddingProvider::new().with_space(fallback_space()));
        let provider = FailoverEmbeddingProvider::new(primary.clone()).with_fallback(fallback);

        let rescued = provider.embed_tagged("mfa").await.unwrap();
        let normal = provider.embed_tagged("mfa").await.unwrap();

        assert_eq!(rescued.space, fallback_space());
        assert!(normal.space.same_space(&primary.provider_info()));
        assert!(provider.provider_info().same_space(&primary.provider_info()));
    }

    #[tokio::test]
    async fn permanent_error_does_not_fall_back() {
        let primary = Arc::new(MockEmbeddingProvider::new().with_error(EmbeddingError::AuthenticationFailed));
        let fallback = Arc::new(MockEmbeddingProvider::new());

        let provider = FailoverEmbeddingProvider::new(primary).with_fallback(fallback.clone());

        assert_eq!(provider.embed("mfa").await, Err(EmbeddingError::AuthenticationFailed));
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn without_fallback_returns_primary_error() {
        let primary = Arc::new(MockEmbeddingProvider::new().with_error(EmbeddingError::network("reset")));
        let provider = FailoverEmbeddingProvider::new(primary);

        assert!(matches!(provider.embed("mfa").await, Err(EmbeddingError::Network(_))));
    }
}
