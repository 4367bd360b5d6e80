//! Criticality Classifier - flags items and dimensions needing recommendations.
//!
//! Two independent criteria are evaluated against the same participant:
//!
//! - **Self-referential extremes**: the raw answer itself signals risk
//!   (risk item answered 4 or 5, protective item answered 1 or 2).
//! - **Cohort-relative deficit**: the normalized value is at or below the
//!   item's cohort percentile.
//!
//! A dimension is critical when it holds the (tied) maximum number of
//! self-referential extremes, or when its score is below the cohort global
//! mean. The two signals are combined by union.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::baseline::Baseline;
use super::participant_scorer::{ItemScore, ParticipantScores};
use crate::domain::foundation::{Dimension, ItemCode, LikertAnswer};
use crate::domain::survey::SurveyCatalog;

/// A flagged item with the context retrieval and reports need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalItem {
    pub item: ItemCode,
    pub dimension: Dimension,
    pub indicates_risk: bool,
    pub statement: String,
    pub measures: String,
    pub answer: LikertAnswer,
    pub normalized: f64,
    pub weighted_risk: f64,
    /// Cohort percentile the item was compared against, when available.
    pub cohort_percentile: Option<f64>,
}

/// Why a dimension was flagged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFlags {
    pub extreme_items: usize,
    pub most_extremes: bool,
    pub below_global_mean: bool,
}

impl DimensionFlags {
    pub fn is_critical(&self) -> bool {
        self.most_extremes || self.below_global_mean
    }
}

/// Classification result for one participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalityReport {
    /// Union of both dimension criteria, in canonical dimension order.
    pub critical_dimensions: Vec<Dimension>,
    pub self_referential: Vec<CriticalItem>,
    pub percentile_based: Vec<CriticalItem>,
    pub dimension_flags: BTreeMap<Dimension, DimensionFlags>,
}

/// Returns true if the raw answer signals risk regardless of the cohort.
pub fn is_self_referential_extreme(indicates_risk: bool, answer: LikertAnswer) -> bool {
    if indicates_risk {
        answer.value() >= 4
    } else {
        answer.value() <= 2
    }
}

/// Classifies items and dimensions as critical.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalityClassifier {
    /// Keep only the top N items per list, plus items tied with the N-th.
    max_items: Option<usize>,
}

impl CriticalityClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits each critical-item list to its top N (ties kept).
    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }

    /// Classifies one participant.
    ///
    /// # Edge Cases
    /// - Dimensions without a score take part in neither criterion.
    /// - Items without a cohort baseline are never percentile-critical.
    /// - A dimension only wins the extremes criterion with a count above zero.
    pub fn classify(
        &self,
        scores: &ParticipantScores,
        catalog: &SurveyCatalog,
        baseline: &Baseline,
    ) -> CriticalityReport {
        let mut self_referential = Vec::new();
        let mut percentile_based = Vec::new();

        for score in &scores.items {
            if !scores.dimensions.contains_key(&score.dimension) {
                continue;
            }
            let cohort_percentile = baseline.item(&score.item).map(|b| b.percentile);

            if is_self_referential_extreme(score.indicates_risk, score.answer) {
                self_referential.push(Self::critical_item(score, catalog, cohort_percentile));
            }
            if cohort_percentile.is_some_and(|p| score.normalized <= p) {
                percentile_based.push(Self::critical_item(score, catalog, cohort_percentile));
            }
        }

        let dimension_flags = Self::dimension_flags(scores, baseline, &self_referential);
        let critical_dimensions = dimension_flags
            .iter()
            .filter(|(_, flags)| flags.is_critical())
            .map(|(d, _)| *d)
            .collect();

        CriticalityReport {
            critical_dimensions,
            self_referential: self.rank(self_referential, catalog),
            percentile_based: self.rank(percentile_based, catalog),
            dimension_flags,
        }
    }

    fn dimension_flags(
        scores: &ParticipantScores,
        baseline: &Baseline,
        self_referential: &[CriticalItem],
    ) -> BTreeMap<Dimension, DimensionFlags> {
        let mut flags: BTreeMap<Dimension, DimensionFlags> = scores
            .dimensions
            .keys()
            .map(|d| (*d, DimensionFlags::default()))
            .collect();

        for item in self_referential {
            if let Some(f) = flags.get_mut(&item.dimension) {
                f.extreme_items += 1;
            }
        }

        let max_extremes = flags.values().map(|f| f.extreme_items).max().unwrap_or(0);
        let global_mean = baseline.global_mean();

        for (dimension, f) in flags.iter_mut() {
            f.most_extremes = max_extremes > 0 && f.extreme_items == max_extremes;
            f.below_global_mean = match (scores.dimension_score(*dimension), global_mean) {
                (Some(score), Some(global)) => score < global,
                _ => false,
            };
        }

        flags
    }

    fn critical_item(
        score: &ItemScore,
        catalog: &SurveyCatalog,
        cohort_percentile: Option<f64>,
    ) -> CriticalItem {
        let (statement, measures) = catalog
            .get(&score.item)
            .map(|i| (i.statement.clone(), i.measures.clone()))
            .unwrap_or_default();
        CriticalItem {
            item: score.item.clone(),
            dimension: score.dimension,
            indicates_risk: score.indicates_risk,
            statement,
            measures,
            answer: score.answer,
            normalized: score.normalized,
            weighted_risk: score.weighted_risk,
            cohort_percentile,
        }
    }

    /// Orders by weighted risk (highest first, survey order on ties) and applies the limit.
    fn rank(&self, mut items: Vec<CriticalItem>, catalog: &SurveyCatalog) -> Vec<CriticalItem> {
        items.sort_by(|a, b| {
            b.weighted_risk
                .total_cmp(&a.weighted_risk)
                .then_with(|| catalog.position(&a.item).cmp(&catalog.position(&b.item)))
        });

        if let Some(limit) = self.max_items {
            if items.len() > limit && limit > 0 {
                let threshold = items[limit - 1].weighted_risk;
                items.retain(|i| i.weighted_risk >= threshold);
            }
        }
        items
    }
}
