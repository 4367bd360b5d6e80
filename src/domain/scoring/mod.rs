//! Scoring - cohort baseline, participant scores, and criticality.
//!
//! All values are polarity-corrected first, so that higher always means
//! healthier on the 1..=5 scale. The baseline is computed once over the full
//! cohort and shared read-only by every participant's scoring.

mod baseline;
mod criticality;
mod participant_scorer;
pub mod statistics;

pub use baseline::{
    Baseline, BaselineCalculator, DimensionBaseline, ItemBaseline, DEFAULT_PERCENTILE_RANK,
};
pub use criticality::{
    is_self_referential_extreme, CriticalItem, CriticalityClassifier, CriticalityReport,
    DimensionFlags,
};
pub use participant_scorer::{DimensionScore, ItemScore, ParticipantScorer, ParticipantScores};
