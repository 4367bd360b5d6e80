//! Report Writer Port - persists assembled records for downstream reporting.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::assessment::{AssessmentSummary, ParticipantRecord};
use crate::domain::scoring::Baseline;

/// Port for persisting run output.
///
/// # Contract
///
/// Writes must be atomic: a reader never observes a partially written file.
/// A failed write for one participant must not affect later writes.
#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Writes one participant's record, returning where it landed.
    async fn write_participant(&self, record: &ParticipantRecord) -> Result<PathBuf, ReportWriteError>;

    /// Writes the cohort baseline snapshot used by the run.
    async fn write_baseline(&self, baseline: &Baseline) -> Result<PathBuf, ReportWriteError>;

    /// Writes the run summary.
    async fn write_summary(&self, summary: &AssessmentSummary) -> Result<PathBuf, ReportWriteError>;
}

#[derive(Debug, Error)]
pub enum ReportWriteError {
    #[error("I/O error writing {path}: {message}")]
    Io { path: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ReportWriteError {
    pub fn io(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ReportWriteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
