//! Assessment domain - participant profiles and assembled output records.

mod profile;
mod record;
mod summary;

pub use profile::{CriticalItems, ParticipantProfile};
pub use record::{Assembler, ParticipantRecord};
pub use summary::AssessmentSummary;
