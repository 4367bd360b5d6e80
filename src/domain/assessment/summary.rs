//! Run summary persisted beside the per-participant records.

use serde::{Deserialize, Serialize};

use super::record::ParticipantRecord;
use crate::domain::foundation::{RunId, Timestamp};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub run_id: RunId,
    pub generated_at: Timestamp,
    pub participants: usize,
    pub participants_with_findings: usize,
    pub records_written: usize,
    pub write_failures: usize,
    pub retrieval_failures: usize,
    pub records: Vec<ParticipantRecord>,
}

impl AssessmentSummary {
    /// Summarizes a finished run. Write counts start at zero.
    pub fn new(run_id: RunId, records: Vec<ParticipantRecord>) -> Self {
        Self {
            run_id,
            generated_at: Timestamp::now(),
            participants: records.len(),
            participants_with_findings: records.iter().filter(|r| r.profile.has_findings()).count(),
            records_written: 0,
            write_failures: 0,
            retrieval_failures: records.iter().map(|r| r.recommendations.failures().len()).sum(),
            records,
        }
    }

    pub fn with_write_counts(mut self, written: usize, failed: usize) -> Self {
        self.records_written = written;
        self.write_failures = failed;
        self
    }
}
