//! JSON Survey Source - reads the item catalog and submissions from disk.
//!
//! # File Layout
//!
//! Catalog (`items.json`):
//!
//! ```json
//! [{"code": "i01", "dimension": "AUC", "indicates_risk": "Sí",
//!   "statement": "I reuse passwords", "measures": "password reuse", "weight": 5}]
//! ```
//!
//! Submissions (`responses.json`):
//!
//! ```json
//! [{"participant": 17, "demographics": {"Responsabilidad": "Jefatura"},
//!   "expertise_level": "basic", "answers": {"i01": 4, "i02": null}}]
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::foundation::{
    text::{fold_accents, normalize_key},
    Dimension, ExpertiseLevel, ItemCode, LikertAnswer, ParticipantId,
};
use crate::domain::survey::{Demographics, SurveyCatalog, SurveyItem, SurveySubmission};
use crate::ports::{SurveySource, SurveySourceError};

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(alias = "codigo")]
    code: String,
    #[serde(alias = "dimension_code")]
    dimension: String,
    #[serde(default, alias = "invertida", alias = "risk")]
    indicates_risk: Value,
    #[serde(default, alias = "enunciado")]
    statement: String,
    #[serde(default, alias = "que_mide")]
    measures: String,
    #[serde(default)]
    weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    #[serde(alias = "participante")]
    participant: Value,
    #[serde(default)]
    demographics: BTreeMap<String, Value>,
    #[serde(default)]
    expertise_level: Option<String>,
    #[serde(default)]
    answers: BTreeMap<String, Value>,
}

/// Reads survey data from two JSON files.
#[derive(Debug, Clone)]
pub struct JsonSurveySource {
    catalog_path: PathBuf,
    responses_path: PathBuf,
}

impl JsonSurveySource {
    pub fn new(catalog_path: impl Into<PathBuf>, responses_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            responses_path: responses_path.into(),
        }
    }

    async fn read(path: &Path) -> Result<String, SurveySourceError> {
        tokio::fs::read_to_string(path).await.map_err(|e| {
            let path = path.display().to_string();
            if e.kind() == std::io::ErrorKind::NotFound {
                SurveySourceError::NotFound { path }
            } else {
                SurveySourceError::Io {
                    path,
                    message: e.to_string(),
                }
            }
        })
    }

    /// Parses catalog content.
    pub fn parse_catalog(content: &str, path: &str) -> Result<SurveyCatalog, SurveySourceError> {
        let raw: Vec<RawItem> =
            serde_json::from_str(content).map_err(|e| SurveySourceError::malformed(path, e.to_string()))?;

        let mut items = Vec::with_capacity(raw.len());
        for r in raw {
            let indicates_risk = parse_flag(&r.indicates_risk).ok_or_else(|| {
                SurveySourceError::malformed(
                    path,
                    format!("item {}: unrecognised risk flag {}", r.code, r.indicates_risk),
                )
            })?;
            let mut item = SurveyItem::new(
                ItemCode::new(r.code)?,
                Dimension::parse(&r.dimension)?,
                indicates_risk,
                r.statement,
                r.measures,
            );
            if let Some(weight) = r.weight {
                item = item.with_weight(weight);
            }
            items.push(item);
        }

        Ok(SurveyCatalog::new(items)?)
    }

    /// Parses submissions content, resolving answers against the catalog.
    ///
    /// A participant id that appears twice makes the whole file malformed.
    pub fn parse_submissions(
        content: &str,
        path: &str,
        catalog: &SurveyCatalog,
    ) -> Result<Vec<SurveySubmission>, SurveySourceError> {
        let raw: Vec<RawSubmission> =
            serde_json::from_str(content).map_err(|e| SurveySourceError::malformed(path, e.to_string()))?;

        let mut submissions = Vec::with_capacity(raw.len());
        let mut seen = HashSet::with_capacity(raw.len());
        for r in raw {
            let participant = ParticipantId::new(value_to_text(&r.participant))?;
            if !seen.insert(participant.clone()) {
                return Err(SurveySourceError::malformed(
                    path,
                    format!("participant {} appears more than once", participant),
                ));
            }

            let demographics = r
                .demographics
                .iter()
                .fold(Demographics::new(), |d, (k, v)| d.with(k.clone(), value_to_text(v)));

            let mut submission = SurveySubmission::new(participant.clone(), demographics);

            if let Some(level) = r.expertise_level.as_deref().filter(|l| !l.trim().is_empty()) {
                match ExpertiseLevel::parse(level) {
                    Ok(level) => submission = submission.with_level(level),
                    Err(_) => tracing::warn!(
                        participant = %participant,
                        level = %level,
                        "Unknown expertise level, inferring from demographics"
                    ),
                }
            }

            let mut answers: BTreeMap<ItemCode, Option<LikertAnswer>> = BTreeMap::new();
            for (code, value) in &r.answers {
                let Some(item) = ItemCode::new(code.clone()).ok().and_then(|c| catalog.get(&c)) else {
                    tracing::warn!(participant = %participant, item = %code, "Answer for unknown item ignored");
                    continue;
                };
                let answer = parse_answer(value);
                if answer.is_none() && !value.is_null() {
                    tracing::debug!(
                        participant = %participant,
                        item = %item.code,
                        value = %value,
                        "Invalid answer treated as missing"
                    );
                }
                answers.insert(item.code.clone(), answer);
            }

            // Survey order, every catalog item present.
            for item in catalog.iter() {
                let answer = answers.remove(&item.code).flatten();
                submission = submission.with_answer(item.code.clone(), answer);
            }

            submissions.push(submission);
        }

        Ok(submissions)
    }
}

#[async_trait]
impl SurveySource for JsonSurveySource {
    async fn load_catalog(&self) -> Result<SurveyCatalog, SurveySourceError> {
        let content = Self::read(&self.catalog_path).await?;
        let catalog = Self::parse_catalog(&content, &self.catalog_path.display().to_string())?;
        tracing::info!(items = catalog.len(), path = %self.catalog_path.display(), "Loaded survey catalog");
        Ok(catalog)
    }

    async fn load_submissions(
        &self,
        catalog: &SurveyCatalog,
    ) -> Result<Vec<SurveySubmission>, SurveySourceError> {
        let content = Self::read(&self.responses_path).await?;
        let submissions =
            Self::parse_submissions(&content, &self.responses_path.display().to_string(), catalog)?;
        tracing::info!(
            participants = submissions.len(),
            path = %self.responses_path.display(),
            "Loaded survey submissions"
        );
        Ok(submissions)
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => Some(false),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match fold_accents(&normalize_key(s)).as_str() {
            "si" | "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_answer(value: &Value) -> Option<LikertAnswer> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    LikertAnswer::try_from_f64(number).ok()
}
