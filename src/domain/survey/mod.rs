//! Survey reference data and raw submissions.
//!
//! The catalog is immutable reference data loaded once; submissions are
//! created once per participant and never mutated by the scoring pipeline.

mod item;
mod response;

pub use item::{SurveyCatalog, SurveyItem};
pub use response::{Demographics, Response, SurveySubmission};
