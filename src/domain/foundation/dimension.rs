//! Dimension enum representing the five cyber-hygiene categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::text::{fold_accents, normalize_key};
use super::ValidationError;

/// The five cyber-hygiene dimensions measured by the survey.
///
/// Serialized as the short survey code (`DAI`, `TRI`, ...), which is also the
/// value knowledge-base documents carry in their `dimension` metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "DAI")]
    DeviceHygiene,
    #[serde(rename = "TRI")]
    InformationTransmission,
    #[serde(rename = "CRS")]
    SocialMedia,
    #[serde(rename = "AUC")]
    Authentication,
    #[serde(rename = "MCE")]
    Messaging,
}

impl Dimension {
    /// Returns all dimensions in canonical order.
    pub fn all() -> &'static [Dimension] {
        &[
            Dimension::DeviceHygiene,
            Dimension::InformationTransmission,
            Dimension::SocialMedia,
            Dimension::Authentication,
            Dimension::Messaging,
        ]
    }

    /// Returns the survey code.
    pub fn code(&self) -> &'static str {
        match self {
            Dimension::DeviceHygiene => "DAI",
            Dimension::InformationTransmission => "TRI",
            Dimension::SocialMedia => "CRS",
            Dimension::Authentication => "AUC",
            Dimension::Messaging => "MCE",
        }
    }

    /// Returns the display name, also used as the semantic seed for retrieval.
    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::DeviceHygiene => "Device hygiene and information storage",
            Dimension::InformationTransmission => "Information transmission",
            Dimension::SocialMedia => "Social media behavior",
            Dimension::Authentication => "Authentication and credential use",
            Dimension::Messaging => "Messaging and email",
        }
    }

    /// Returns the label used by the original survey instrument.
    pub fn survey_label(&self) -> &'static str {
        match self {
            Dimension::DeviceHygiene => "Dispositivos y almacenamiento de información",
            Dimension::InformationTransmission => "Transmisión de la información",
            Dimension::SocialMedia => "Comportamiento en las redes sociales",
            Dimension::Authentication => "Autenticación y uso de credenciales",
            Dimension::Messaging => "Mensajería y correo electrónico",
        }
    }

    /// Parses a code, display name, or survey label (case and accent insensitive).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let wanted = fold_accents(&normalize_key(value));
        Self::all()
            .iter()
            .copied()
            .find(|d| {
                wanted == d.code().to_lowercase()
                    || wanted == normalize_key(d.display_name())
                    || wanted == fold_accents(&normalize_key(d.survey_label()))
            })
            .ok_or_else(|| ValidationError::unknown_variant("dimension", value))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Dimension {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
