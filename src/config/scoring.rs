//! Scoring configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::scoring::DEFAULT_PERCENTILE_RANK;

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Cohort percentile for the deficit criterion
    #[serde(default = "default_percentile_rank")]
    pub percentile_rank: f64,

    /// Keep the top N critical items per list, plus ties with the N-th
    pub max_critical_items: Option<usize>,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.percentile_rank > 0.0 && self.percentile_rank < 1.0) {
            return Err(ValidationError::InvalidPercentile(self.percentile_rank));
        }
        if self.max_critical_items == Some(0) {
            return Err(ValidationError::MustBePositive("scoring.max_critical_items"));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            percentile_rank: default_percentile_rank(),
            max_critical_items: None,
        }
    }
}

fn default_percentile_rank() -> f64 {
    DEFAULT_PERCENTILE_RANK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_p35_without_limit() {
        let config = ScoringConfig::default();
        assert_eq!(config.percentile_rank, 0.35);
        assert!(config.max_critical_items.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_percentile_bounds_are_exclusive() {
        for rank in [0.0, 1.0, -0.2, f64::NAN] {
            let config = ScoringConfig {
                percentile_rank: rank,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "rank {} accepted", rank);
        }
    }

    #[test]
    fn test_zero_item_limit_is_rejected() {
        let config = ScoringConfig {
            max_critical_items: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
