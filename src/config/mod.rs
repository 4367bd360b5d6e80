//! Runtime settings for an assessment run.
//!
//! Everything is read from `HYGIENE_ADVISOR__*` environment variables (a
//! local `.env` is honoured), one section per struct below:
//!
//! ```no_run
//! use cyberhygiene_advisor::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//! println!("reports go to {}", config.data.output_dir.display());
//! # Ok(())
//! # }
//! ```

mod data;
mod embedding;
mod error;
mod logging;
mod retrieval;
mod scoring;

pub use data::DataConfig;
pub use embedding::{EmbeddingConfig, EmbeddingProviderKind};
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use retrieval::RetrievalConfig;
pub use scoring::ScoringConfig;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads the environment, e.g. `HYGIENE_ADVISOR__RETRIEVAL__DIMENSION_CAP=10`
    /// sets `retrieval.dimension_cap`. Only the `data` section is mandatory.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HYGIENE_ADVISOR")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Cross-section checks; embedding keys are only demanded when
    /// semantic seeds are on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.data.validate()?;
        self.retrieval.validate()?;
        self.scoring.validate()?;
        self.logging.validate()?;
        self.embedding.validate(self.retrieval.use_semantic_seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Environment variables are process-wide.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "HYGIENE_ADVISOR__DATA__CATALOG_PATH",
        "HYGIENE_ADVISOR__DATA__RESPONSES_PATH",
        "HYGIENE_ADVISOR__DATA__KNOWLEDGE_BASE_PATH",
        "HYGIENE_ADVISOR__EMBEDDING__PROVIDER",
        "HYGIENE_ADVISOR__EMBEDDING__GEMINI_API_KEY",
        "HYGIENE_ADVISOR__RETRIEVAL__DIMENSION_CAP",
        "HYGIENE_ADVISOR__RETRIEVAL__USE_SEMANTIC_SEED",
        "HYGIENE_ADVISOR__SCORING__MAX_CRITICAL_ITEMS",
    ];

    fn set_minimal_env(dir: &std::path::Path) {
        env::set_var("HYGIENE_ADVISOR__DATA__CATALOG_PATH", dir.join("items.json"));
        env::set_var("HYGIENE_ADVISOR__DATA__RESPONSES_PATH", dir.join("responses.json"));
        env::set_var("HYGIENE_ADVISOR__DATA__KNOWLEDGE_BASE_PATH", dir);
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn minimal_environment_fills_in_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        set_minimal_env(dir.path());
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.data.catalog_path, dir.path().join("items.json"));
        assert_eq!(config.data.output_dir, std::path::PathBuf::from("output"));
        assert_eq!(config.retrieval.dimension_cap, 10);
        assert_eq!(config.scoring.percentile_rank, 0.35);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn section_values_override_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        set_minimal_env(dir.path());
        env::set_var("HYGIENE_ADVISOR__EMBEDDING__PROVIDER", "gemini");
        env::set_var("HYGIENE_ADVISOR__RETRIEVAL__DIMENSION_CAP", "7");
        env::set_var("HYGIENE_ADVISOR__SCORING__MAX_CRITICAL_ITEMS", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Gemini);
        assert_eq!(config.retrieval.dimension_cap, 7);
        assert_eq!(config.scoring.max_critical_items, Some(3));
    }

    #[test]
    fn missing_data_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn semantic_seeds_require_the_provider_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("items.json"), "[]").unwrap();
        std::fs::write(dir.path().join("responses.json"), "[]").unwrap();
        set_minimal_env(dir.path());
        let without_key = AppConfig::load();
        env::set_var("HYGIENE_ADVISOR__EMBEDDING__PROVIDER", "gemini");
        env::set_var("HYGIENE_ADVISOR__EMBEDDING__GEMINI_API_KEY", "AIza-test");
        let with_key = AppConfig::load();
        clear_env();

        assert_eq!(
            without_key.unwrap().validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        );
        assert!(with_key.unwrap().validate().is_ok());
    }
}
