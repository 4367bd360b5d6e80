//! Input and output locations

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ValidationError;

/// Where survey data and the knowledge base are read from, and where
/// results are written.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Survey item catalog (JSON)
    pub catalog_path: PathBuf,

    /// Participant submissions (JSON)
    pub responses_path: PathBuf,

    /// Knowledge-base file or directory of JSON files
    pub knowledge_base_path: PathBuf,

    /// Output directory, created on demand
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl DataConfig {
    /// Validate that every input exists
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_exists("catalog_path", &self.catalog_path)?;
        require_exists("responses_path", &self.responses_path)?;
        require_exists("knowledge_base_path", &self.knowledge_base_path)?;
        Ok(())
    }
}

fn require_exists(field: &'static str, path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::MissingRequired(field));
    }
    if !path.exists() {
        return Err(ValidationError::PathNotFound {
            field,
            path: path.display().to_string(),
        });
    }
    Ok(())
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
