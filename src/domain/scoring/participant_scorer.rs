//! Participant Scorer - per-item, per-dimension, and overall scores.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::baseline::Baseline;
use super::statistics::mean;
use crate::domain::foundation::{Dimension, ItemCode, LikertAnswer, ParticipantId};
use crate::domain::survey::{SurveyCatalog, SurveySubmission};

/// Score of one answered item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    pub item: ItemCode,
    pub dimension: Dimension,
    pub indicates_risk: bool,
    pub answer: LikertAnswer,
    /// Polarity-corrected value on 1..=5, higher = healthier.
    pub normalized: f64,
    /// `(6 - normalized) * weight`, higher = riskier.
    pub weighted_risk: f64,
}

/// Aggregate score of one dimension with at least one answered item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Mean of the normalized values of the answered items.
    pub score: f64,
    pub answered_items: usize,
    /// Score relative to the cohort dimension mean, in percent.
    pub relative_to_baseline_pct: Option<f64>,
}

/// All scores for one participant, computed once and carried forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantScores {
    pub participant: ParticipantId,
    /// Answered items in survey order.
    pub items: Vec<ItemScore>,
    /// Only dimensions with answered items appear.
    pub dimensions: BTreeMap<Dimension, DimensionScore>,
    /// Mean of the dimension scores.
    pub overall: Option<f64>,
    pub overall_relative_to_baseline_pct: Option<f64>,
}

impl ParticipantScores {
    pub fn dimension_score(&self, dimension: Dimension) -> Option<f64> {
        self.dimensions.get(&dimension).map(|d| d.score)
    }
}

/// Computes a participant's scores against the catalog and baseline.
pub struct ParticipantScorer;

impl ParticipantScorer {
    /// Scores one submission.
    ///
    /// # Edge Cases
    /// - Unanswered items are excluded, never imputed.
    /// - A dimension with no answered item is absent from `dimensions`.
    /// - When an item is answered more than once, the first non-null answer counts.
    pub fn score(
        submission: &SurveySubmission,
        catalog: &SurveyCatalog,
        baseline: &Baseline,
    ) -> ParticipantScores {
        let mut answers: HashMap<&ItemCode, LikertAnswer> = HashMap::new();
        for response in &submission.responses {
            if let Some(answer) = response.answer {
                answers.entry(&response.item).or_insert(answer);
            }
        }

        let items: Vec<ItemScore> = catalog
            .iter()
            .filter_map(|item| {
                let answer = *answers.get(&item.code)?;
                let normalized = answer.normalized(item.indicates_risk);
                Some(ItemScore {
                    item: item.code.clone(),
                    dimension: item.dimension,
                    indicates_risk: item.indicates_risk,
                    answer,
                    normalized,
                    weighted_risk: (6.0 - normalized) * item.weight,
                })
            })
            .collect();

        let mut dimensions = BTreeMap::new();
        for &dimension in Dimension::all() {
            let values: Vec<f64> = items
                .iter()
                .filter(|s| s.dimension == dimension)
                .map(|s| s.normalized)
                .collect();
            if let Some(score) = mean(&values) {
                let relative = baseline
                    .dimension(dimension)
                    .and_then(|b| relative_pct(score, b.mean));
                dimensions.insert(
                    dimension,
                    DimensionScore {
                        dimension,
                        score,
                        answered_items: values.len(),
                        relative_to_baseline_pct: relative,
                    },
                );
            }
        }

        let dimension_scores: Vec<f64> = dimensions.values().map(|d| d.score).collect();
        let overall = mean(&dimension_scores);
        let overall_relative = overall
            .zip(baseline.global_mean())
            .and_then(|(score, reference)| relative_pct(score, reference));

        ParticipantScores {
            participant: submission.participant.clone(),
            items,
            dimensions,
            overall,
            overall_relative_to_baseline_pct: overall_relative,
        }
    }
}

fn relative_pct(score: f64, reference: f64) -> Option<f64> {
    (reference > 0.0).then(|| score / reference * 100.0)
}
