//! Application handlers.

pub mod assessment;

pub use assessment::{
    AssessmentError, AssessmentSettings, RecommendationRetriever, RetrievalSettings, RunAssessmentHandler,
};
