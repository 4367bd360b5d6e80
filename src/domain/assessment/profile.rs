//! Participant profile - the immutable snapshot that feeds retrieval.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::domain::foundation::{Dimension, ExpertiseLevel, ItemCode, ParticipantId};
use crate::domain::scoring::{
    Baseline, CriticalItem, CriticalityClassifier, DimensionFlags, DimensionScore, ItemScore,
    ParticipantScorer,
};
use crate::domain::survey::{Demographics, SurveyCatalog, SurveySubmission};

/// Critical items, one list per criterion. An item may appear in both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalItems {
    pub self_referential: Vec<CriticalItem>,
    pub percentile_based: Vec<CriticalItem>,
}

impl CriticalItems {
    /// Both lists combined, first occurrence of each item code kept.
    pub fn distinct(&self) -> Vec<&CriticalItem> {
        let mut seen: HashSet<ItemCode> = HashSet::new();
        self.self_referential
            .iter()
            .chain(self.percentile_based.iter())
            .filter(|item| seen.insert(item.item.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.self_referential.is_empty() && self.percentile_based.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub participant: ParticipantId,
    pub demographics: Demographics,
    pub expertise_level: ExpertiseLevel,
    pub item_scores: Vec<ItemScore>,
    pub dimension_scores: BTreeMap<Dimension, DimensionScore>,
    pub overall_score: Option<f64>,
    pub overall_relative_to_baseline_pct: Option<f64>,
    pub critical_dimensions: Vec<Dimension>,
    pub critical_items: CriticalItems,
    pub dimension_flags: BTreeMap<Dimension, DimensionFlags>,
}

impl ParticipantProfile {
    /// Scores and classifies one submission against the shared baseline.
    pub fn build(
        submission: &SurveySubmission,
        catalog: &SurveyCatalog,
        baseline: &Baseline,
        classifier: &CriticalityClassifier,
    ) -> Self {
        let scores = ParticipantScorer::score(submission, catalog, baseline);
        let report = classifier.classify(&scores, catalog, baseline);

        Self {
            participant: scores.participant,
            demographics: submission.demographics.clone(),
            expertise_level: submission.expertise_level(),
            item_scores: scores.items,
            dimension_scores: scores.dimensions,
            overall_score: scores.overall,
            overall_relative_to_baseline_pct: scores.overall_relative_to_baseline_pct,
            critical_dimensions: report.critical_dimensions,
            critical_items: CriticalItems {
                self_referential: report.self_referential,
                percentile_based: report.percentile_based,
            },
            dimension_flags: report.dimension_flags,
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.critical_dimensions.is_empty() || !self.critical_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::LikertAnswer;
    use crate::domain::scoring::{BaselineCalculator, DEFAULT_PERCENTILE_RANK};
    use crate::domain::survey::SurveyItem;

    fn code(s: &str) -> ItemCode {
        ItemCode::new(s).unwrap()
    }

    fn catalog() -> SurveyCatalog {
        SurveyCatalog::new(vec![
            SurveyItem::new(code("i01"), Dimension::Authentication, true, "Reuses passwords", "password reuse"),
            SurveyItem::new(code("i02"), Dimension::Messaging, false, "Checks senders", "phishing"),
        ])
        .unwrap()
    }

    fn submission(id: &str, i01: u8, i02: u8) -> SurveySubmission {
        SurveySubmission::new(
            ParticipantId::new(id).unwrap(),
            Demographics::new().with("responsabilidad", "Jefatura"),
        )
        .with_answer(code("i01"), Some(LikertAnswer::try_new(i01).unwrap()))
        .with_answer(code("i02"), Some(LikertAnswer::try_new(i02).unwrap()))
    }

    #[test]
    fn build_carries_scores_level_and_findings() {
        let cohort = vec![submission("a", 5, 1), submission("b", 1, 5), submission("c", 3, 3)];
        let catalog = catalog();
        let baseline = BaselineCalculator::compute(
            &catalog,
            cohort.iter().flat_map(|s| s.responses.iter()),
            DEFAULT_PERCENTILE_RANK,
        );

        let profile = ParticipantProfile::build(&cohort[0], &catalog, &baseline, &CriticalityClassifier::new());

        assert_eq!(profile.expertise_level, ExpertiseLevel::Average);
        assert_eq!(profile.item_scores.len(), 2);
        assert_eq!(profile.critical_items.self_referential.len(), 2);
        assert_eq!(
            profile.critical_dimensions,
            vec![Dimension::Authentication, Dimension::Messaging]
        );
        assert!(profile.has_findings());
    }

    #[test]
    fn distinct_critical_items_merge_both_lists() {
        let cohort = vec![submission("a", 5, 1), submission("b", 1, 5), submission("c", 3, 3)];
        let catalog = catalog();
        let baseline = BaselineCalculator::compute(
            &catalog,
            cohort.iter().flat_map(|s| s.responses.iter()),
            DEFAULT_PERCENTILE_RANK,
        );

        let profile = ParticipantProfile::build(&cohort[0], &catalog, &baseline, &CriticalityClassifier::new());

        // both items are in both lists; each is queried once
        assert_eq!(profile.critical_items.percentile_based.len(), 2);
        let distinct: Vec<_> = profile.critical_items.distinct().into_iter().map(|i| i.item.as_str()).collect();
        assert_eq!(distinct, vec!["i01", "i02"]);
    }
}
