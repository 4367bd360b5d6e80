//! Assembler - merges a profile with its recommendations.

use serde::{Deserialize, Serialize};

use super::profile::ParticipantProfile;
use crate::domain::recommendation::RecommendationBundle;

/// The self-contained output record for one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    #[serde(flatten)]
    pub profile: ParticipantProfile,
    pub recommendations: RecommendationBundle,
}

pub struct Assembler;

impl Assembler {
    /// Attaches the retrieved bundle to the profile; nothing is recomputed.
    pub fn assemble(profile: ParticipantProfile, recommendations: RecommendationBundle) -> ParticipantRecord {
        ParticipantRecord {
            profile,
            recommendations,
        }
    }
}
