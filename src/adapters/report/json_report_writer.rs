//! JSON Report Writer - persists run output as pretty-printed JSON files.
//!
//! # Directory Structure
//!
//! ```text
//! {output_dir}/
//! ├── baseline.json
//! ├── participant_17.json
//! ├── participant_18.json
//! └── summary.json
//! ```
//!
//! Every file is written to `{name}.tmp`, synced, then renamed into place.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::assessment::{AssessmentSummary, ParticipantRecord};
use crate::domain::scoring::Baseline;
use crate::ports::{ReportWriteError, ReportWriter};

#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    output_dir: PathBuf,
}

impl JsonReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for a participant record.
    ///
    /// Lowercase ASCII letters, digits and `-` are kept; every other byte,
    /// `_` included, becomes `_XX` (hex). Distinct ids therefore never share
    /// a file, even on case-insensitive file systems.
    pub fn participant_file_name(participant: &str) -> String {
        let mut safe = String::with_capacity(participant.len());
        for byte in participant.bytes() {
            match byte {
                b'a'..=b'z' | b'0'..=b'9' | b'-' => safe.push(char::from(byte)),
                other => safe.push_str(&format!("_{:02X}", other)),
            }
        }
        format!("participant_{}.json", safe)
    }

    async fn write_json<T: Serialize + Sync>(&self, file_name: &str, value: &T) -> Result<PathBuf, ReportWriteError> {
        let content = serde_json::to_vec_pretty(value)?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ReportWriteError::io(self.output_dir.display().to_string(), e))?;

        let final_path = self.output_dir.join(file_name);
        let temp_path = self.output_dir.join(format!("{}.tmp", file_name));

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| ReportWriteError::io(temp_path.display().to_string(), e))?;
        file.write_all(&content)
            .await
            .map_err(|e| ReportWriteError::io(temp_path.display().to_string(), e))?;
        file.sync_all()
            .await
            .map_err(|e| ReportWriteError::io(temp_path.display().to_string(), e))?;

        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| ReportWriteError::io(final_path.display().to_string(), e))?;

        tracing::debug!(path = %final_path.display(), bytes = content.len(), "Wrote report file");
        Ok(final_path)
    }
}

#[async_trait]
impl ReportWriter for JsonReportWriter {
    async fn write_participant(&self, record: &ParticipantRecord) -> Result<PathBuf, ReportWriteError> {
        let name = Self::participant_file_name(record.profile.participant.as_str());
        self.write_json(&name, record).await
    }

    async fn write_baseline(&self, baseline: &Baseline) -> Result<PathBuf, ReportWriteError> {
        self.write_json("baseline.json", baseline).await
    }

    async fn write_summary(&self, summary: &AssessmentSummary) -> Result<PathBuf, ReportWriteError> {
        self.write_json("summary.json", summary).await
    }
}
