//! Embedding provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Embedding provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Primary provider
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    /// Provider tried when the primary fails with a retryable error
    pub fallback_provider: Option<EmbeddingProviderKind>,

    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    /// Gemini API key
    pub gemini_api_key: Option<Secret<String>>,

    /// Model override for the primary provider
    pub model: Option<String>,

    /// Base URL override for the primary provider
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Embedding provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    #[default]
    OpenAI,
    Gemini,
}

impl EmbeddingConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key for a provider, if configured and non-empty
    pub fn api_key(&self, kind: EmbeddingProviderKind) -> Option<&str> {
        let key = match kind {
            EmbeddingProviderKind::OpenAI => self.openai_api_key.as_ref(),
            EmbeddingProviderKind::Gemini => self.gemini_api_key.as_ref(),
        };
        key.map(|k| k.expose_secret().as_str()).filter(|k| !k.is_empty())
    }

    /// Validate embedding configuration
    ///
    /// Keys are only required when queries are embedded.
    pub fn validate(&self, semantic_seeds: bool) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("embedding.timeout_secs"));
        }
        if !semantic_seeds {
            return Ok(());
        }

        if self.api_key(self.provider).is_none() {
            return Err(ValidationError::MissingRequired(key_name(self.provider)));
        }
        if let Some(fallback) = self.fallback_provider {
            if self.api_key(fallback).is_none() {
                return Err(ValidationError::MissingRequired(key_name(fallback)));
            }
        }

        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            fallback_provider: None,
            openai_api_key: None,
            gemini_api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn key_name(kind: EmbeddingProviderKind) -> &'static str {
    match kind {
        EmbeddingProviderKind::OpenAI => "OPENAI_API_KEY",
        EmbeddingProviderKind::Gemini => "GEMINI_API_KEY",
    }
}

fn default_timeout() -> u64 {
    30
}
