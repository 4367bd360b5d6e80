//! ExpertiseLevel enum with per-level recommendation fallback order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::text::{fold_accents, normalize_key};
use super::ValidationError;

/// A participant's proficiency tier, from least to most advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    #[default]
    Basic,
    Average,
    Technical,
    Administrator,
}

impl ExpertiseLevel {
    /// Returns all levels in ascending order.
    pub fn all() -> &'static [ExpertiseLevel] {
        &[
            ExpertiseLevel::Basic,
            ExpertiseLevel::Average,
            ExpertiseLevel::Technical,
            ExpertiseLevel::Administrator,
        ]
    }

    /// Returns the canonical label stored in knowledge-base metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Basic => "basic",
            ExpertiseLevel::Average => "average",
            ExpertiseLevel::Technical => "technical",
            ExpertiseLevel::Administrator => "administrator",
        }
    }

    /// Returns the label used by the original Spanish knowledge base.
    pub fn survey_label(&self) -> &'static str {
        match self {
            ExpertiseLevel::Basic => "básico",
            ExpertiseLevel::Average => "promedio",
            ExpertiseLevel::Technical => "técnico",
            ExpertiseLevel::Administrator => "administrador",
        }
    }

    /// Labels a knowledge-base document may use for this level.
    pub fn accepted_labels(&self) -> [&'static str; 2] {
        [self.as_str(), self.survey_label()]
    }

    /// Levels to query for recommendations, starting with this one.
    ///
    /// Every level has its own precedence; higher tiers fall back towards
    /// the technical end, lower tiers towards the basic end.
    pub fn fallback_chain(&self) -> [ExpertiseLevel; 4] {
        use ExpertiseLevel::*;
        match self {
            Administrator => [Administrator, Technical, Average, Basic],
            Technical => [Technical, Administrator, Average, Basic],
            Average => [Average, Basic, Technical, Administrator],
            Basic => [Basic, Average, Technical, Administrator],
        }
    }

    /// Parses an English or Spanish label (case and accent insensitive).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let wanted = fold_accents(&normalize_key(value));
        Self::all()
            .iter()
            .copied()
            .find(|level| {
                wanted == level.as_str() || wanted == fold_accents(level.survey_label())
            })
            .ok_or_else(|| ValidationError::unknown_variant("expertise level", value))
    }
}

impl fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExpertiseLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
