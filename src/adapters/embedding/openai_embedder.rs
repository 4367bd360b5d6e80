//! OpenAI Embedding Provider - `/embeddings` endpoint.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIEmbeddingConfig::new(api_key)
//!     .with_model("text-embedding-3-small")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAIEmbeddingProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::http::{build_client, check_status, map_send_error};
use crate::ports::{EmbeddingError, EmbeddingProvider, EmbeddingProviderInfo};

/// Configuration for the OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Embedding model.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAIEmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI embeddings over HTTP.
pub struct OpenAIEmbeddingProvider {
    config: OpenAIEmbeddingConfig,
    client: Client,
}

impl OpenAIEmbeddingProvider {
    pub fn new(config: OpenAIEmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::invalid_request("cannot embed empty text"));
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: text,
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.config.timeout))?;
        let response = check_status(response).await?;

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::parse(format!("Failed to parse response: {}", e)))?;

        body.into_vector()
    }

    fn provider_info(&self) -> EmbeddingProviderInfo {
        let info = EmbeddingProviderInfo::new("openai", &self.config.model);
        match self.config.model.as_str() {
            "text-embedding-3-small" | "text-embedding-ada-002" => info.with_dimensions(1536),
            "text-embedding-3-large" => info.with_dimensions(3072),
            _ => info,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// OpenAI API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_vector(self) -> Result<Vec<f32>, EmbeddingError> {
        self.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EmbeddingError::parse("No embedding in response"))
    }
}
