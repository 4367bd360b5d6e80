//! Baseline Calculator - cohort-wide reference scores per item and dimension.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::statistics::{mean, percentile};
use crate::domain::foundation::{Dimension, ItemCode};
use crate::domain::survey::{Response, SurveyCatalog};

/// Cohort percentile used for the deficit criterion unless configured otherwise.
pub const DEFAULT_PERCENTILE_RANK: f64 = 0.35;

/// Cohort reference values for one item (higher = healthier).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemBaseline {
    pub mean: f64,
    pub percentile: f64,
    /// Number of non-null answers the values were computed from.
    pub respondents: usize,
}

/// Cohort reference values for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionBaseline {
    /// Mean of the dimension's item means.
    pub mean: f64,
    /// Percentile over every answer given to the dimension's items.
    pub percentile: f64,
    /// Items that contributed (those with at least one answer).
    pub items: usize,
    pub responses: usize,
}

/// Immutable cohort snapshot shared read-only by every participant's scoring.
///
/// Items and dimensions without any observed answer are absent, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    percentile_rank: f64,
    items: BTreeMap<ItemCode, ItemBaseline>,
    dimensions: BTreeMap<Dimension, DimensionBaseline>,
    /// Mean of the per-dimension means.
    global_mean: Option<f64>,
}

impl Baseline {
    pub fn percentile_rank(&self) -> f64 {
        self.percentile_rank
    }

    pub fn item(&self, code: &ItemCode) -> Option<&ItemBaseline> {
        self.items.get(code)
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionBaseline> {
        self.dimensions.get(&dimension)
    }

    pub fn global_mean(&self) -> Option<f64> {
        self.global_mean
    }

    pub fn items(&self) -> &BTreeMap<ItemCode, ItemBaseline> {
        &self.items
    }

    pub fn dimensions(&self) -> &BTreeMap<Dimension, DimensionBaseline> {
        &self.dimensions
    }

    /// True when no answer at all was observed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Computes the cohort baseline from every participant's responses.
pub struct BaselineCalculator;

impl BaselineCalculator {
    /// Builds the baseline.
    ///
    /// # Algorithm
    /// 1. Per item: polarity-correct every non-null answer (`6 - answer` for
    ///    risk items), then take the mean and the percentile.
    /// 2. Per dimension: mean of its item means; percentile over the pooled
    ///    corrected answers of its items.
    /// 3. Global: mean of the dimension means.
    ///
    /// # Edge Cases
    /// - Responses for items missing from the catalog are ignored.
    /// - Items with zero answers are excluded from every aggregate.
    pub fn compute<'a>(
        catalog: &SurveyCatalog,
        responses: impl IntoIterator<Item = &'a Response>,
        percentile_rank: f64,
    ) -> Baseline {
        let mut per_item: BTreeMap<ItemCode, Vec<f64>> = BTreeMap::new();

        for response in responses {
            let (Some(answer), Some(item)) = (response.answer, catalog.get(&response.item)) else {
                continue;
            };
            per_item
                .entry(item.code.clone())
                .or_default()
                .push(answer.normalized(item.indicates_risk));
        }

        let mut items = BTreeMap::new();
        for (code, values) in &per_item {
            if let (Some(m), Some(p)) = (mean(values), percentile(values, percentile_rank)) {
                items.insert(
                    code.clone(),
                    ItemBaseline {
                        mean: m,
                        percentile: p,
                        respondents: values.len(),
                    },
                );
            }
        }

        let mut dimensions = BTreeMap::new();
        for &dimension in Dimension::all() {
            let mut item_means = Vec::new();
            let mut pooled = Vec::new();
            for item in catalog.items_in(dimension) {
                if let (Some(baseline), Some(values)) =
                    (items.get(&item.code), per_item.get(&item.code))
                {
                    item_means.push(baseline.mean);
                    pooled.extend_from_slice(values);
                }
            }
            if let (Some(m), Some(p)) = (mean(&item_means), percentile(&pooled, percentile_rank)) {
                dimensions.insert(
                    dimension,
                    DimensionBaseline {
                        mean: m,
                        percentile: p,
                        items: item_means.len(),
                        responses: pooled.len(),
                    },
                );
            }
        }

        let dimension_means: Vec<f64> = dimensions.values().map(|d| d.mean).collect();

        Baseline {
            percentile_rank,
            items,
            dimensions,
            global_mean: mean(&dimension_means),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{LikertAnswer, ParticipantId};
    use crate::domain::survey::SurveyItem;

    fn code(s: &str) -> ItemCode {
        ItemCode::new(s).unwrap()
    }

    fn response(participant: &str, item: &str, answer: Option<u8>) -> Response {
        Response::new(
            ParticipantId::new(participant).unwrap(),
            code(item),
            answer.map(|a| LikertAnswer::try_new(a).unwrap()),
        )
    }

    fn catalog() -> SurveyCatalog {
        SurveyCatalog::new(vec![
            SurveyItem::new(code("i01"), Dimension::Authentication, true, "Reuses passwords", "password reuse"),
            SurveyItem::new(code("i02"), Dimension::Authentication, false, "Uses MFA", "mfa"),
            SurveyItem::new(code("i03"), Dimension::Messaging, false, "Checks senders", "phishing"),
            SurveyItem::new(code("i04"), Dimension::SocialMedia, false, "Private profile", "privacy"),
        ])
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn risk_items_are_inverted_before_aggregation() {
        let responses = vec![
            response("1", "i01", Some(5)),
            response("2", "i01", Some(3)),
            response("3", "i01", Some(1)),
        ];

        let baseline = BaselineCalculator::compute(&catalog(), &responses, DEFAULT_PERCENTILE_RANK);
        let item = baseline.item(&code("i01")).unwrap();

        assert!(approx(item.mean, 3.0));
        assert!(approx(item.percentile, 2.4));
        assert_eq!(item.respondents, 3);
    }

    #[test]
    fn null_answers_are_excluded_not_zeroed() {
        let responses = vec![
            response("1", "i02", Some(4)),
            response("2", "i02", None),
            response("3", "i02", Some(2)),
        ];

        let baseline = BaselineCalculator::compute(&catalog(), &responses, DEFAULT_PERCENTILE_RANK);
        let item = baseline.item(&code("i02")).unwrap();

        assert!(approx(item.mean, 3.0));
        assert_eq!(item.respondents, 2);
    }

    #[test]
    fn items_and_dimensions_without_answers_are_absent() {
        let responses = vec![response("1", "i02", Some(4)), response("1", "i04", None)];

        let baseline = BaselineCalculator::compute(&catalog(), &responses, DEFAULT_PERCENTILE_RANK);

        assert!(baseline.item(&code("i01")).is_none());
        assert!(baseline.item(&code("i04")).is_none());
        assert!(baseline.dimension(Dimension::SocialMedia).is_none());
        assert!(baseline.dimension(Dimension::Messaging).is_none());
        assert!(baseline.dimension(Dimension::Authentication).is_some());
    }

    #[test]
    fn dimension_mean_is_mean_of_item_means() {
        // i01 corrected: [1, 1, 1] -> mean 1; i02: [5] -> mean 5
        // raw pooled mean would be 2, two-level mean is 3
        let responses = vec![
            response("1", "i01", Some(5)),
            response("2", "i01", Some(5)),
            response("3", "i01", Some(5)),
            response("1", "i02", Some(5)),
        ];

        let baseline = BaselineCalculator::compute(&catalog(), &responses, DEFAULT_PERCENTILE_RANK);
        let dim = baseline.dimension(Dimension::Authentication).unwrap();

        assert!(approx(dim.mean, 3.0));
        assert_eq!(dim.items, 2);
        assert_eq!(dim.responses, 4);
    }

    #[test]
    fn global_mean_is_mean_of_dimension_means() {
        let responses = vec![
            response("1", "i02", Some(4)),
            response("1", "i03", Some(2)),
        ];

        let baseline = BaselineCalculator::compute(&catalog(), &responses, DEFAULT_PERCENTILE_RANK);
        assert!(approx(baseline.global_mean().unwrap(), 3.0));
    }

    #[test]
    fn unknown_items_are_ignored() {
        let responses = vec![response("1", "i99", Some(4))];
        let baseline = BaselineCalculator::compute(&catalog(), &responses, DEFAULT_PERCENTILE_RANK);
        assert!(baseline.is_empty());
        assert!(baseline.global_mean().is_none());
    }

    #[test]
    fn baseline_serializes_with_codes_as_keys() {
        let responses = vec![response("1", "i02", Some(4))];
        let baseline = BaselineCalculator::compute(&catalog(), &responses, DEFAULT_PERCENTILE_RANK);
        let json = serde_json::to_value(&baseline).unwrap();
        assert!(json["items"]["i02"].is_object());
        assert!(json["dimensions"]["AUC"].is_object());
    }
}
