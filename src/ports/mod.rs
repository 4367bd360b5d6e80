//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Ingestion
//!
//! - `SurveySource` - Item catalog and participant submissions
//!
//! ## Retrieval
//!
//! - `EmbeddingProvider` - Text to vector
//! - `KnowledgeStore` - Embed, similarity search, list all documents
//! - `retry_with_backoff` - Bounded retry shared by remote calls
//!
//! ## Output
//!
//! - `ReportWriter` - Per-participant records, baseline, run summary

mod embedding_provider;
mod knowledge_store;
mod report_writer;
mod retry;
mod survey_source;

pub use embedding_provider::{Embedding, EmbeddingError, EmbeddingProvider, EmbeddingProviderInfo};
pub use knowledge_store::{KnowledgeStore, KnowledgeStoreError};
pub use report_writer::{ReportWriteError, ReportWriter};
pub use retry::{retry_with_backoff, RetryError, RetryPolicy, Retryable};
pub use survey_source::{SurveySource, SurveySourceError};
