//! Whole-run failures of an assessment.
//!
//! Anything scoped to one participant or one query is recovered locally and
//! never surfaces here.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ParticipantId};
use crate::ports::{ReportWriteError, SurveySourceError};

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("survey catalog unavailable: {0}")]
    Catalog(#[source] SurveySourceError),

    #[error("survey responses unavailable: {0}")]
    Responses(#[source] SurveySourceError),

    #[error("participant {0} has more than one submission")]
    DuplicateParticipant(ParticipantId),

    #[error("survey catalog has no items")]
    EmptyCatalog,

    #[error("no survey answers to build a baseline from")]
    NoResponses,

    #[error("failed to write run summary: {0}")]
    Summary(#[from] ReportWriteError),
}

impl AssessmentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AssessmentError::Catalog(_) | AssessmentError::EmptyCatalog => ErrorCode::CatalogUnavailable,
            AssessmentError::Responses(_) => ErrorCode::ResponsesUnavailable,
            AssessmentError::DuplicateParticipant(_) => ErrorCode::ValidationFailed,
            AssessmentError::NoResponses => ErrorCode::MissingData,
            AssessmentError::Summary(_) => ErrorCode::StorageError,
        }
    }
}

impl From<AssessmentError> for DomainError {
    fn from(err: AssessmentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
