//! Assessment handlers - cohort scoring and recommendation retrieval.

mod error;
mod recommendation_retriever;
mod run_assessment;

pub use error::AssessmentError;
pub use recommendation_retriever::{RecommendationRetriever, RetrievalSettings};
pub use run_assessment::{AssessmentSettings, RunAssessmentHandler};
