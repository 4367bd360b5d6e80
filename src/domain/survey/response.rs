//! Survey responses, participant submissions, and demographics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{
    text::{fold_accents, normalize_key},
    ExpertiseLevel, ItemCode, LikertAnswer, ParticipantId,
};

/// One participant's answer to one item. Absent answers stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub participant: ParticipantId,
    pub item: ItemCode,
    pub answer: Option<LikertAnswer>,
}

impl Response {
    pub fn new(participant: ParticipantId, item: ItemCode, answer: Option<LikertAnswer>) -> Self {
        Self {
            participant,
            item,
            answer,
        }
    }
}

/// Free-form demographic attributes keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Demographics(BTreeMap<String, String>);

/// Attribute names holding the participant's responsibility level.
const RESPONSIBILITY_KEYS: &[&str] = &["responsibility", "responsabilidad", "nivel de responsabilidad"];

/// Attribute names holding whether the participant had security training.
const TRAINING_KEYS: &[&str] = &[
    "security_training",
    "posee_capacitacion",
    "capacitacion en seguridad/ciberseguridad",
];

impl Demographics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up an attribute by any of the given names (case and accent insensitive).
    pub fn find(&self, keys: &[&str]) -> Option<&str> {
        self.0.iter().find_map(|(k, v)| {
            let k = fold_accents(&normalize_key(k));
            keys.iter()
                .any(|wanted| k == fold_accents(&normalize_key(wanted)))
                .then_some(v.as_str())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Infers the expertise level from responsibility and training answers.
    ///
    /// Directors map to administrator, trained staff to technical, team
    /// leads to average, everyone else to basic.
    pub fn infer_expertise_level(&self) -> ExpertiseLevel {
        let responsibility = self
            .find(RESPONSIBILITY_KEYS)
            .map(|v| fold_accents(&normalize_key(v)))
            .unwrap_or_default();
        let trained = self
            .find(TRAINING_KEYS)
            .map(|v| matches!(fold_accents(&normalize_key(v)).as_str(), "si" | "yes" | "true"))
            .unwrap_or(false);

        if responsibility.contains("direccion") || responsibility.contains("direction") {
            ExpertiseLevel::Administrator
        } else if trained {
            ExpertiseLevel::Technical
        } else if ["jefatura", "lead", "manager"]
            .iter()
            .any(|k| responsibility.contains(k))
        {
            ExpertiseLevel::Average
        } else {
            ExpertiseLevel::Basic
        }
    }
}

/// Everything one participant submitted, in survey order.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveySubmission {
    pub participant: ParticipantId,
    pub demographics: Demographics,
    /// Level stated in the submission, overriding inference.
    pub declared_level: Option<ExpertiseLevel>,
    pub responses: Vec<Response>,
}

impl SurveySubmission {
    pub fn new(participant: ParticipantId, demographics: Demographics) -> Self {
        Self {
            participant,
            demographics,
            declared_level: None,
            responses: Vec::new(),
        }
    }

    /// Records an answer (or an absent one) for an item.
    pub fn with_answer(mut self, item: ItemCode, answer: Option<LikertAnswer>) -> Self {
        self.responses
            .push(Response::new(self.participant.clone(), item, answer));
        self
    }

    /// Sets the declared expertise level.
    pub fn with_level(mut self, level: ExpertiseLevel) -> Self {
        self.declared_level = Some(level);
        self
    }

    /// The assigned expertise level: declared if present, inferred otherwise.
    pub fn expertise_level(&self) -> ExpertiseLevel {
        self.declared_level
            .unwrap_or_else(|| self.demographics.infer_expertise_level())
    }
}
