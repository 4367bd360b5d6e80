//! Per-participant recommendation bundle with canonical-text deduplication.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::document::Recommendation;
use crate::domain::foundation::{Dimension, ExpertiseLevel, ItemCode};

/// A recommendation retrieved for a critical dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRecommendation {
    pub dimension: Dimension,
    /// Fallback level whose query produced it.
    pub level: ExpertiseLevel,
    pub recommendation: Recommendation,
}

/// A recommendation retrieved for a critical item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecommendation {
    pub item: ItemCode,
    pub dimension: Dimension,
    pub level: ExpertiseLevel,
    pub recommendation: Recommendation,
}

/// What a failed query was looking for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum QueryTarget {
    Dimension(Dimension),
    Item(ItemCode),
}

impl fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTarget::Dimension(d) => write!(f, "dimension {}", d),
            QueryTarget::Item(i) => write!(f, "item {}", i),
        }
    }
}

/// A knowledge-store query that failed after its retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalFailure {
    pub target: QueryTarget,
    pub level: ExpertiseLevel,
    pub message: String,
}

/// Two ordered recommendation sequences, each free of canonical duplicates.
///
/// The sets of seen canonical texts are kept per sequence: the same text may
/// appear once among dimension recommendations and once among item ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationBundle {
    by_dimension: Vec<DimensionRecommendation>,
    by_item: Vec<ItemRecommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    failures: Vec<RetrievalFailure>,
    #[serde(skip)]
    seen_dimension: HashSet<String>,
    #[serde(skip)]
    seen_item: HashSet<String>,
}

impl RecommendationBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a dimension recommendation unless its canonical text was seen.
    pub fn push_for_dimension(
        &mut self,
        dimension: Dimension,
        level: ExpertiseLevel,
        recommendation: Recommendation,
    ) -> bool {
        if !self.seen_dimension.insert(recommendation.canonical_key()) {
            return false;
        }
        self.by_dimension.push(DimensionRecommendation {
            dimension,
            level,
            recommendation,
        });
        true
    }

    /// Appends an item recommendation unless its canonical text was seen.
    pub fn push_for_item(
        &mut self,
        item: ItemCode,
        dimension: Dimension,
        level: ExpertiseLevel,
        recommendation: Recommendation,
    ) -> bool {
        if !self.seen_item.insert(recommendation.canonical_key()) {
            return false;
        }
        self.by_item.push(ItemRecommendation {
            item,
            dimension,
            level,
            recommendation,
        });
        true
    }

    pub fn record_failure(&mut self, target: QueryTarget, level: ExpertiseLevel, message: impl Into<String>) {
        self.failures.push(RetrievalFailure {
            target,
            level,
            message: message.into(),
        });
    }

    pub fn by_dimension(&self) -> &[DimensionRecommendation] {
        &self.by_dimension
    }

    pub fn by_item(&self) -> &[ItemRecommendation] {
        &self.by_item
    }

    pub fn failures(&self) -> &[RetrievalFailure] {
        &self.failures
    }

    pub fn count_for_dimension(&self, dimension: Dimension) -> usize {
        self.by_dimension.iter().filter(|r| r.dimension == dimension).count()
    }

    pub fn count_for_item(&self, item: &ItemCode) -> usize {
        self.by_item.iter().filter(|r| &r.item == item).count()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dimension.is_empty() && self.by_item.is_empty()
    }
}
