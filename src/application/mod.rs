//! Application layer - Handlers orchestrating domain logic over ports.
//!
//! Handlers hold their collaborators as `Arc<dyn Port>` and never touch
//! files or networks directly.

pub mod handlers;

pub use handlers::{
    AssessmentError, AssessmentSettings, RecommendationRetriever, RetrievalSettings, RunAssessmentHandler,
};
