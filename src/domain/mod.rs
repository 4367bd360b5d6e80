//! Domain layer containing the scoring and recommendation logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (dimensions, levels, IDs, answers, errors)
//! - `survey` - Item catalog and participant submissions
//! - `scoring` - Cohort baseline, participant scores, criticality
//! - `recommendation` - Knowledge documents, metadata filters, bundles
//! - `assessment` - Participant profiles and assembled output records

pub mod assessment;
pub mod foundation;
pub mod recommendation;
pub mod scoring;
pub mod survey;
