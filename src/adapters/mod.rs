//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `embedding` - Embedding providers (OpenAI, Gemini, failover, mock)
//! - `knowledge` - Knowledge-base loading and the in-memory vector store
//! - `report` - JSON output files
//! - `survey` - JSON survey ingestion

pub mod embedding;
pub mod knowledge;
pub mod report;
pub mod survey;

pub use embedding::{
    FailoverEmbeddingProvider, GeminiEmbeddingConfig, GeminiEmbeddingProvider, MockEmbeddingProvider,
    OpenAIEmbeddingConfig, OpenAIEmbeddingProvider,
};
pub use knowledge::{InMemoryKnowledgeStore, JsonKnowledgeBaseLoader};
pub use report::JsonReportWriter;
pub use survey::JsonSurveySource;
