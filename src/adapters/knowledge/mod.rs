//! Knowledge-base adapters.

mod in_memory_store;
mod json_loader;

pub use in_memory_store::InMemoryKnowledgeStore;
pub use json_loader::{JsonKnowledgeBaseLoader, LoadedDocument};
