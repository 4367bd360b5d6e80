//! Survey items and the immutable item catalog.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{Dimension, ItemCode, ValidationError};

/// One survey question, loaded once as reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyItem {
    pub code: ItemCode,
    pub dimension: Dimension,
    /// A high raw answer indicates risky behaviour.
    pub indicates_risk: bool,
    pub statement: String,
    /// What aspect of the latent variable the item measures.
    pub measures: String,
    /// Relative risk weight used to rank critical items.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl SurveyItem {
    /// Creates an item with weight 1.
    pub fn new(
        code: ItemCode,
        dimension: Dimension,
        indicates_risk: bool,
        statement: impl Into<String>,
        measures: impl Into<String>,
    ) -> Self {
        Self {
            code,
            dimension,
            indicates_risk,
            statement: statement.into(),
            measures: measures.into(),
            weight: default_weight(),
        }
    }

    /// Sets the risk weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Semantic seed for item-level recommendation lookup.
    ///
    /// Falls back to the statement when the "measures" tag is blank.
    pub fn semantic_seed(&self) -> &str {
        if self.measures.trim().is_empty() {
            &self.statement
        } else {
            &self.measures
        }
    }
}

/// The static item catalog, in survey order.
#[derive(Debug, Clone, Default)]
pub struct SurveyCatalog {
    items: Vec<SurveyItem>,
    index: HashMap<ItemCode, usize>,
}

impl SurveyCatalog {
    /// Builds a catalog, rejecting duplicate codes and non-positive weights.
    pub fn new(items: Vec<SurveyItem>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if !(item.weight.is_finite() && item.weight > 0.0) {
                return Err(ValidationError::invalid_format(
                    "weight",
                    format!("item {} must have a positive weight", item.code),
                ));
            }
            if index.insert(item.code.clone(), position).is_some() {
                return Err(ValidationError::invalid_format(
                    "item_code",
                    format!("duplicate item code {}", item.code),
                ));
            }
        }
        Ok(Self { items, index })
    }

    /// Looks up an item by code.
    pub fn get(&self, code: &ItemCode) -> Option<&SurveyItem> {
        self.index.get(code).map(|&i| &self.items[i])
    }

    /// Returns the survey position of an item.
    pub fn position(&self, code: &ItemCode) -> Option<usize> {
        self.index.get(code).copied()
    }

    /// Iterates items in survey order.
    pub fn iter(&self) -> impl Iterator<Item = &SurveyItem> {
        self.items.iter()
    }

    /// Items belonging to one dimension, in survey order.
    pub fn items_in(&self, dimension: Dimension) -> impl Iterator<Item = &SurveyItem> {
        self.items.iter().filter(move |i| i.dimension == dimension)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
