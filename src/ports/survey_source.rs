//! Survey Source Port - supplies the item catalog and raw submissions.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::domain::survey::{SurveyCatalog, SurveySubmission};

/// Port for survey ingestion, loaded once before any scoring.
#[async_trait]
pub trait SurveySource: Send + Sync {
    /// Loads the immutable item catalog.
    async fn load_catalog(&self) -> Result<SurveyCatalog, SurveySourceError>;

    /// Loads every participant's submission, resolved against the catalog.
    ///
    /// Invalid answers are kept as absent; answers to unknown items are
    /// dropped. Participant ids are unique across the returned submissions.
    async fn load_submissions(
        &self,
        catalog: &SurveyCatalog,
    ) -> Result<Vec<SurveySubmission>, SurveySourceError>;
}

/// Errors from survey ingestion. All are fatal for the run.
#[derive(Debug, Error)]
pub enum SurveySourceError {
    #[error("survey file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed survey data in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("invalid survey data: {0}")]
    Invalid(#[from] ValidationError),
}

impl SurveySourceError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
