//! Recommendation retrieval configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::RetryPolicy;

/// Caps, query sizes, retry and scheduling for recommendation retrieval
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Distinct recommendations per critical dimension
    #[serde(default = "default_dimension_cap")]
    pub dimension_cap: usize,

    /// Distinct recommendations per critical item
    #[serde(default = "default_item_cap")]
    pub item_cap: usize,

    /// Documents requested per item query
    #[serde(default = "default_item_query_depth")]
    pub item_query_depth: usize,

    /// Nearest neighbours fetched before metadata filtering
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    /// Embed dimension names and item descriptions as query seeds
    #[serde(default = "default_true")]
    pub use_semantic_seed: bool,

    /// Attempts per knowledge-store call
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Participants processed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl RetrievalConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let counts = [
            ("retrieval.dimension_cap", self.dimension_cap),
            ("retrieval.item_cap", self.item_cap),
            ("retrieval.item_query_depth", self.item_query_depth),
            ("retrieval.candidate_pool", self.candidate_pool),
            ("retrieval.concurrency", self.concurrency),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, value)| *value == 0) {
            return Err(ValidationError::MustBePositive(name));
        }
        if self.retry_attempts == 0 {
            return Err(ValidationError::MustBePositive("retrieval.retry_attempts"));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dimension_cap: default_dimension_cap(),
            item_cap: default_item_cap(),
            item_query_depth: default_item_query_depth(),
            candidate_pool: default_candidate_pool(),
            use_semantic_seed: true,
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_dimension_cap() -> usize {
    10
}

fn default_item_cap() -> usize {
    5
}

fn default_item_query_depth() -> usize {
    10
}

fn default_candidate_pool() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_retry_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_concurrency() -> usize {
    4
}
